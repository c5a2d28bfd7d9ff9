//! 保養範本模型（Gama）
//!
//! 範本定義「做什麼」而不定義「何時做」：工作項目、所需備件、
//! 檢查項目皆由範本獨佔；多張工單可共用同一範本（唯讀引用）。

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 範本類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineKind {
    /// 預防保養
    Preventive,
    /// 法規檢驗
    Regulatory,
}

/// 保養範本
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceRoutine {
    /// 範本ID
    pub id: u64,

    /// 範本代碼（PR-NNNN / TL-NNNN）
    pub code: String,

    /// 名稱
    pub name: String,

    /// 說明
    pub description: Option<String>,

    /// 類別
    pub kind: RoutineKind,

    /// 預估總時間（分鐘）
    pub estimated_minutes: Option<u32>,

    /// 是否啟用
    pub active: bool,

    /// 建檔日期
    pub created_on: NaiveDate,

    /// 工作項目（依 position 排序）
    pub tasks: Vec<RoutineTask>,

    /// 所需備件
    pub required_parts: Vec<RoutinePart>,

    /// 檢查項目（依 position 排序）
    pub checklist: Vec<ChecklistItem>,
}

impl MaintenanceRoutine {
    /// 創建新的保養範本
    pub fn new(code: String, name: String, kind: RoutineKind, created_on: NaiveDate) -> Self {
        Self {
            id: 0,
            code,
            name,
            description: None,
            kind,
            estimated_minutes: None,
            active: true,
            created_on,
            tasks: Vec::new(),
            required_parts: Vec::new(),
            checklist: Vec::new(),
        }
    }

    /// 建構器模式：設置說明
    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    /// 建構器模式：設置預估總時間（分鐘）
    pub fn with_estimated_minutes(mut self, minutes: u32) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    /// 建構器模式：加入工作項目
    pub fn with_task(mut self, task: RoutineTask) -> Self {
        self.tasks.push(task);
        self
    }

    /// 建構器模式：加入所需備件
    pub fn with_required_part(mut self, part: RoutinePart) -> Self {
        self.required_parts.push(part);
        self
    }

    /// 建構器模式：加入檢查項目
    pub fn with_checklist_item(mut self, item: ChecklistItem) -> Self {
        self.checklist.push(item);
        self
    }

    /// 預估總時間換算為小時
    pub fn estimated_hours(&self) -> Option<Decimal> {
        self.estimated_minutes
            .map(|m| (Decimal::from(m) / Decimal::from(60)).round_dp(2))
    }
}

/// 範本內的工作項目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineTask {
    /// 項目ID
    pub id: u64,

    /// 工作描述
    pub description: String,

    /// 排序
    pub position: u32,

    /// 預估時間（分鐘）
    pub estimated_minutes: Option<u32>,

    /// 所需工具
    pub tools: Option<String>,

    /// 作業指引
    pub instructions: Option<String>,
}

impl RoutineTask {
    pub fn new(description: String, position: u32) -> Self {
        Self {
            id: 0,
            description,
            position,
            estimated_minutes: None,
            tools: None,
            instructions: None,
        }
    }
}

/// 範本所需備件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutinePart {
    /// 項目ID
    pub id: u64,

    /// 備件ID
    pub part_id: u64,

    /// 數量
    pub quantity: Decimal,

    /// 備註
    pub notes: Option<String>,
}

impl RoutinePart {
    pub fn new(part_id: u64, quantity: Decimal) -> Self {
        Self {
            id: 0,
            part_id,
            quantity,
            notes: None,
        }
    }
}

/// 檢查項目回覆型態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// OK / NOK 勾選
    OkNok,
    /// 量測值
    Value,
    /// 自由文字
    Text,
}

/// 範本內的檢查項目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// 項目ID
    pub id: u64,

    /// 檢查描述
    pub description: String,

    /// 排序
    pub position: u32,

    /// 回覆型態
    pub response_kind: ResponseKind,

    /// 量測單位（回覆型態為量測值時）
    pub unit: Option<String>,

    /// 回覆 NOK 時是否自動產生故障維修工單
    pub generates_corrective: bool,
}

impl ChecklistItem {
    pub fn new(description: String, position: u32) -> Self {
        Self {
            id: 0,
            description,
            position,
            response_kind: ResponseKind::OkNok,
            unit: None,
            generates_corrective: true,
        }
    }

    /// 建構器模式：設置是否產生故障維修工單
    pub fn with_generates_corrective(mut self, generates: bool) -> Self {
        self.generates_corrective = generates;
        self
    }
}
