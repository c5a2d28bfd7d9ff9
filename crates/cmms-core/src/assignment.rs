//! 範本指派模型
//!
//! 將保養範本綁定到一個設備節點並附上週期，是較舊的
//! 預防工單產生路徑，與工單自帶週期的機制並存。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::equipment::EquipmentRef;
use crate::work_order::Recurrence;

/// 範本對設備的指派
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineAssignment {
    /// 指派ID
    pub id: u64,

    /// 範本ID
    pub routine_id: u64,

    /// 目標設備
    pub equipment: EquipmentRef,

    /// 週期規則
    pub recurrence: Recurrence,

    /// 上次執行日
    pub last_run: Option<NaiveDate>,

    /// 下次執行日
    pub next_run: Option<NaiveDate>,

    /// 是否啟用
    pub active: bool,

    /// 指派日期
    pub assigned_on: NaiveDate,
}

impl RoutineAssignment {
    /// 創建新的指派
    pub fn new(
        routine_id: u64,
        equipment: EquipmentRef,
        recurrence: Recurrence,
        assigned_on: NaiveDate,
    ) -> Self {
        Self {
            id: 0,
            routine_id,
            equipment,
            recurrence,
            last_run: None,
            next_run: None,
            active: true,
            assigned_on,
        }
    }

    /// 依週期重算下次執行日
    ///
    /// 尚未執行過的指派，下次執行日即為今天。
    pub fn compute_next_run(&mut self, today: NaiveDate) {
        self.next_run = match self.last_run {
            None => Some(today),
            Some(last) => Some(self.recurrence.next_date(last)),
        };
    }

    /// 檢查是否已到期
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.active && self.next_run.map(|d| d <= today).unwrap_or(false)
    }
}
