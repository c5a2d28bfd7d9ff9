//! # CMMS Core
//!
//! 核心資料模型與類型定義

pub mod assignment;
pub mod catalog;
pub mod checklist;
pub mod config;
pub mod consumption;
pub mod equipment;
pub mod routine;
pub mod spare_part;
pub mod time_session;
pub mod work_order;

// Re-export 主要類型
pub use assignment::RoutineAssignment;
pub use catalog::InterventionType;
pub use checklist::{ChecklistAnswer, RESPONSE_NOK, RESPONSE_OK};
pub use config::{Actor, EngineConfig, Role};
pub use consumption::PartConsumption;
pub use equipment::{
    Company, Criticality, Element, EquipmentInfo, EquipmentKind, EquipmentRef, Line, Machine,
    MachineStatus, Plant, Zone,
};
pub use routine::{ChecklistItem, MaintenanceRoutine, ResponseKind, RoutineKind, RoutinePart, RoutineTask};
pub use spare_part::{MovementKind, SparePart, StockMovement};
pub use time_session::TimeSession;
pub use work_order::{
    ExternalCost, NewWorkOrder, Priority, Recurrence, RecurrenceUnit, WorkOrder, WorkOrderPatch,
    WorkOrderStatus, KIND_CORRECTIVE, KIND_PREVENTIVE,
};

/// CMMS 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum CmmsError {
    #[error("驗證失敗: {0}")]
    Validation(String),

    #[error("操作衝突: {0}")]
    Conflict(String),

    #[error("找不到資料: {0}")]
    NotFound(String),

    #[error("庫存不足: 可用 {available}, 需求 {requested}")]
    InsufficientStock {
        available: rust_decimal::Decimal,
        requested: rust_decimal::Decimal,
    },

    #[error("無效的日期: {0}")]
    InvalidDate(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CmmsError>;
