//! 工單模型

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::equipment::EquipmentRef;
use crate::{CmmsError, Result};

/// 故障維修工單類別代碼
pub const KIND_CORRECTIVE: &str = "corrective";
/// 預防保養工單類別代碼
pub const KIND_PREVENTIVE: &str = "preventive";

/// 工單狀態（狀態機，見 `cmms-engine`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    /// 待處理
    Pending,
    /// 已指派
    Assigned,
    /// 進行中
    InProgress,
    /// 部分結案（技師完工，待主管確認）
    PartiallyClosed,
    /// 已結案
    Closed,
    /// 已取消
    Cancelled,
}

impl WorkOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderStatus::Pending => "pending",
            WorkOrderStatus::Assigned => "assigned",
            WorkOrderStatus::InProgress => "in_progress",
            WorkOrderStatus::PartiallyClosed => "partially_closed",
            WorkOrderStatus::Closed => "closed",
            WorkOrderStatus::Cancelled => "cancelled",
        }
    }

    /// 檢查是否為終止狀態
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkOrderStatus::Closed | WorkOrderStatus::Cancelled)
    }
}

/// 工單優先級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// 緊急
    Urgent,
    /// 高
    High,
    /// 中
    Medium,
    /// 低
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// 週期單位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceUnit {
    /// 天
    Days,
    /// 週
    Weeks,
    /// 月（固定以 30 天折算）
    Months,
}

/// 保養週期規則
///
/// 月份固定以 30 天折算，不做日曆月運算。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    /// 週期單位
    pub unit: RecurrenceUnit,

    /// 週期數值
    pub every: u32,
}

impl Recurrence {
    pub fn new(unit: RecurrenceUnit, every: u32) -> Self {
        Self { unit, every }
    }

    /// 週期折算的天數
    pub fn interval_days(&self) -> i64 {
        match self.unit {
            RecurrenceUnit::Days => i64::from(self.every),
            RecurrenceUnit::Weeks => i64::from(self.every) * 7,
            RecurrenceUnit::Months => i64::from(self.every) * 30,
        }
    }

    /// 自某日起算的下次執行日
    pub fn next_date(&self, from: NaiveDate) -> NaiveDate {
        from + chrono::Duration::days(self.interval_days())
    }
}

/// 外部工廠維修費用項目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalCost {
    /// 外包廠商
    pub vendor: String,

    /// 費用說明
    pub description: String,

    /// 金額
    pub cost: Decimal,
}

/// 工單
///
/// 預防保養工單自帶保養範本引用與週期規則，
/// 結案時的自動再生不依賴排程資料仍存在。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    /// 工單ID（由資料存放層於寫入時配號）
    pub id: u64,

    /// 工單號碼，格式 YYNNNNN（2 位年份 + 5 位年度流水號）
    pub number: String,

    /// 工單類別（開放集合，由類別目錄定義；引擎只解讀
    /// `corrective` 與 `preventive` 兩種）
    pub kind: String,

    /// 優先級
    pub priority: Priority,

    /// 狀態
    pub status: WorkOrderStatus,

    /// 標題
    pub title: String,

    /// 問題描述
    pub problem: String,

    /// 處理方式描述
    pub solution: Option<String>,

    /// 備註
    pub observations: Option<String>,

    /// 目標設備（標記式引用，建立時必填）
    pub equipment: EquipmentRef,

    /// 指派技師姓名（自由文字）
    pub technician: Option<String>,

    /// 預估工時（小時）
    pub estimated_hours: Option<Decimal>,

    /// 實際工時（小時；有工時紀錄時由紀錄加總推算）
    pub actual_hours: Option<Decimal>,

    /// 停機時數（小時）
    pub downtime_hours: Option<Decimal>,

    /// 外部工廠費用明細
    pub external_costs: Vec<ExternalCost>,

    /// 外部工廠費用合計（快取值，隨明細重算）
    pub external_cost_total: Decimal,

    /// 建立時間
    pub created_at: NaiveDateTime,

    /// 排定執行時間
    pub scheduled_for: Option<NaiveDateTime>,

    /// 開工時間
    pub started_at: Option<NaiveDateTime>,

    /// 完工時間
    pub finished_at: Option<NaiveDateTime>,

    /// 建立者
    pub created_by: String,

    /// 結案者
    pub closed_by: Option<String>,

    /// 保養範本引用（預防保養工單）
    pub routine_id: Option<u64>,

    /// 週期規則（預防保養工單）
    pub recurrence: Option<Recurrence>,
}

impl WorkOrder {
    /// 創建新的工單（狀態為待處理）
    pub fn new(
        number: String,
        kind: String,
        title: String,
        equipment: EquipmentRef,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: 0,
            number,
            kind,
            priority: Priority::default(),
            status: WorkOrderStatus::Pending,
            title,
            problem: String::new(),
            solution: None,
            observations: None,
            equipment,
            technician: None,
            estimated_hours: None,
            actual_hours: None,
            downtime_hours: None,
            external_costs: Vec::new(),
            external_cost_total: Decimal::ZERO,
            created_at,
            scheduled_for: None,
            started_at: None,
            finished_at: None,
            created_by: "system".to_string(),
            closed_by: None,
            routine_id: None,
            recurrence: None,
        }
    }

    /// 建構器模式：設置優先級
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// 建構器模式：設置問題描述
    pub fn with_problem(mut self, problem: String) -> Self {
        self.problem = problem;
        self
    }

    /// 建構器模式：設置指派技師
    pub fn with_technician(mut self, technician: String) -> Self {
        self.technician = Some(technician);
        self
    }

    /// 建構器模式：設置預估工時
    pub fn with_estimated_hours(mut self, hours: Decimal) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    /// 建構器模式：設置排定執行時間
    pub fn with_scheduled_for(mut self, scheduled: NaiveDateTime) -> Self {
        self.scheduled_for = Some(scheduled);
        self
    }

    /// 建構器模式：設置建立者
    pub fn with_created_by(mut self, created_by: String) -> Self {
        self.created_by = created_by;
        self
    }

    /// 建構器模式：設置保養範本與週期
    pub fn with_routine(mut self, routine_id: Option<u64>, recurrence: Option<Recurrence>) -> Self {
        self.routine_id = routine_id;
        self.recurrence = recurrence;
        self
    }

    /// 檢查是否為預防保養工單
    pub fn is_preventive(&self) -> bool {
        self.kind == KIND_PREVENTIVE
    }

    /// 檢查是否為故障維修工單
    pub fn is_corrective(&self) -> bool {
        self.kind == KIND_CORRECTIVE
    }

    /// 檢查技師欄位是否有效（非空白）
    pub fn has_technician(&self) -> bool {
        self.technician
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    }

    /// 新增外部工廠費用項目並重算合計
    pub fn add_external_cost(&mut self, vendor: String, description: String, cost: Decimal) {
        self.external_costs.push(ExternalCost {
            vendor,
            description,
            cost: cost.round_dp(2),
        });
        self.recompute_external_total();
    }

    /// 依索引移除外部工廠費用項目並重算合計
    pub fn remove_external_cost(&mut self, index: usize) -> Result<()> {
        if index >= self.external_costs.len() {
            return Err(CmmsError::Validation(format!(
                "外部費用索引無效: {index}"
            )));
        }
        self.external_costs.remove(index);
        self.recompute_external_total();
        Ok(())
    }

    fn recompute_external_total(&mut self) {
        self.external_cost_total = self
            .external_costs
            .iter()
            .map(|c| c.cost)
            .sum::<Decimal>()
            .round_dp(2);
    }
}

/// 建立工單的輸入
#[derive(Debug, Clone)]
pub struct NewWorkOrder {
    pub kind: String,
    pub title: String,
    pub equipment: EquipmentRef,
    pub priority: Priority,
    pub problem: String,
    pub technician: Option<String>,
    pub estimated_hours: Option<Decimal>,
    pub scheduled_for: Option<NaiveDateTime>,
    pub routine_id: Option<u64>,
    pub recurrence: Option<Recurrence>,
    pub created_by: String,
}

impl NewWorkOrder {
    pub fn new(kind: String, title: String, equipment: EquipmentRef) -> Self {
        Self {
            kind,
            title,
            equipment,
            priority: Priority::default(),
            problem: String::new(),
            technician: None,
            estimated_hours: None,
            scheduled_for: None,
            routine_id: None,
            recurrence: None,
            created_by: "system".to_string(),
        }
    }

    /// 建構器模式：設置優先級
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// 建構器模式：設置問題描述
    pub fn with_problem(mut self, problem: String) -> Self {
        self.problem = problem;
        self
    }

    /// 建構器模式：設置指派技師
    pub fn with_technician(mut self, technician: String) -> Self {
        self.technician = Some(technician);
        self
    }

    /// 建構器模式：設置預估工時
    pub fn with_estimated_hours(mut self, hours: Decimal) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    /// 建構器模式：設置排定執行時間
    pub fn with_scheduled_for(mut self, scheduled: NaiveDateTime) -> Self {
        self.scheduled_for = Some(scheduled);
        self
    }

    /// 建構器模式：設置保養範本與週期
    pub fn with_routine(mut self, routine_id: u64, recurrence: Recurrence) -> Self {
        self.routine_id = Some(routine_id);
        self.recurrence = Some(recurrence);
        self
    }

    /// 建構器模式：設置建立者
    pub fn with_created_by(mut self, created_by: String) -> Self {
        self.created_by = created_by;
        self
    }
}

/// 工單欄位補丁
///
/// 以具名選填欄位表達部分更新，逐欄驗證後套用；
/// `scheduled_for` 為雙層 Option，`Some(None)` 表示清除排定時間。
#[derive(Debug, Clone, Default)]
pub struct WorkOrderPatch {
    pub kind: Option<String>,
    pub priority: Option<Priority>,
    pub title: Option<String>,
    pub problem: Option<String>,
    pub solution: Option<String>,
    pub observations: Option<String>,
    pub technician: Option<String>,
    pub estimated_hours: Option<Decimal>,
    pub actual_hours: Option<Decimal>,
    pub downtime_hours: Option<Decimal>,
    pub routine_id: Option<u64>,
    pub recurrence: Option<Recurrence>,
    pub scheduled_for: Option<Option<NaiveDateTime>>,
}

impl WorkOrderPatch {
    /// 逐欄驗證並套用到工單
    pub fn apply(&self, order: &mut WorkOrder) -> Result<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(CmmsError::Validation("工單標題不可為空".to_string()));
            }
        }
        for hours in [&self.estimated_hours, &self.actual_hours, &self.downtime_hours]
            .into_iter()
            .flatten()
        {
            if hours.is_sign_negative() {
                return Err(CmmsError::Validation("工時不可為負值".to_string()));
            }
        }

        if let Some(kind) = &self.kind {
            order.kind = kind.clone();
        }
        if let Some(priority) = self.priority {
            order.priority = priority;
        }
        if let Some(title) = &self.title {
            order.title = title.clone();
        }
        if let Some(problem) = &self.problem {
            order.problem = problem.clone();
        }
        if let Some(solution) = &self.solution {
            order.solution = Some(solution.clone());
        }
        if let Some(observations) = &self.observations {
            order.observations = Some(observations.clone());
        }
        if let Some(technician) = &self.technician {
            order.technician = Some(technician.clone());
        }
        if let Some(hours) = self.estimated_hours {
            order.estimated_hours = Some(hours);
        }
        if let Some(hours) = self.actual_hours {
            order.actual_hours = Some(hours);
        }
        if let Some(hours) = self.downtime_hours {
            order.downtime_hours = Some(hours);
        }
        if let Some(routine_id) = self.routine_id {
            order.routine_id = Some(routine_id);
        }
        if let Some(recurrence) = self.recurrence {
            order.recurrence = Some(recurrence);
        }
        if let Some(scheduled) = self.scheduled_for {
            order.scheduled_for = scheduled;
        }
        Ok(())
    }
}
