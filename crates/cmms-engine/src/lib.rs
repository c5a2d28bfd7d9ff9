//! # CMMS Lifecycle Engine
//!
//! 工單生命週期引擎：狀態機、工時對帳、預防工單再生、
//! 檢查表衍生工單與備件耗用。

pub mod checklist;
pub mod lifecycle;
pub mod numbering;
pub mod recurrence;
pub mod scheduling;
pub mod stock;
pub mod time_tracking;

// Re-export 主要類型
pub use checklist::{AnswerInput, ChecklistService};
pub use lifecycle::LifecycleEngine;
pub use numbering::{OrderNumberGenerator, RoutineCodeGenerator};
pub use recurrence::RecurrenceGenerator;
pub use scheduling::AssignmentScheduler;
pub use stock::{MovementRequest, StockService};
pub use time_tracking::SessionTracker;

use cmms_core::WorkOrderStatus;
use rust_decimal::Decimal;

/// 狀態變更結果
///
/// 自動產生的工單號碼是附帶資訊，不代表變更成敗；
/// 衍生步驟失敗時主變更仍回報成功。
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    /// 變更後狀態
    pub status: WorkOrderStatus,

    /// 自動產生的下一張預防工單號碼
    pub generated_preventive: Option<String>,

    /// 由檢查項目衍生的故障維修工單號碼
    pub spawned_correctives: Vec<String>,

    /// 安全網強制結束的工時紀錄筆數
    pub reconciled_sessions: usize,
}

/// 建立工單的結果
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    /// 工單ID
    pub id: u64,

    /// 工單號碼
    pub number: String,
}

/// 開始工作的結果
#[derive(Debug, Clone)]
pub struct StartedWork {
    /// 新建的工時紀錄ID
    pub session_id: u64,

    /// 工單是否因此進入進行中狀態
    pub promoted: bool,
}

/// 暫停工作的結果
#[derive(Debug, Clone)]
pub struct PausedWork {
    /// 本次區段工時（小時）
    pub session_hours: Decimal,

    /// 工單累計實際工時（小時）
    pub total_hours: Decimal,
}

/// 備件領用結果
#[derive(Debug, Clone)]
pub struct ConsumptionReceipt {
    /// 耗用紀錄ID
    pub consumption_id: u64,

    /// 領用後庫存
    pub stock_after: Decimal,

    /// 此筆領用成本
    pub line_cost: Decimal,
}

/// 庫存異動登錄結果
#[derive(Debug, Clone)]
pub struct MovementReceipt {
    /// 異動紀錄ID
    pub movement_id: u64,

    /// 異動後庫存
    pub stock_after: Decimal,

    /// 異動後單價
    pub unit_price: Decimal,
}
