//! # CMMS
//!
//! 工廠維護管理系統的核心引擎：設備階層、工單生命週期、
//! 備件庫存、預防保養排程與 KPI 檢視。
//!
//! 本 crate 為門面，重新輸出各子 crate 的主要類型；
//! 請求層（HTTP / UI）以行程內呼叫使用這些操作。

// Re-export 主要類型
pub use cmms_core::{
    Actor, ChecklistAnswer, ChecklistItem, CmmsError, Company, Criticality, Element, EngineConfig,
    EquipmentInfo, EquipmentKind, EquipmentRef, ExternalCost, InterventionType, Line, Machine,
    MachineStatus, MaintenanceRoutine, MovementKind, NewWorkOrder, PartConsumption, Plant,
    Priority, Recurrence, RecurrenceUnit, ResponseKind, Result, Role, RoutineAssignment,
    RoutineKind, RoutinePart, RoutineTask, SparePart, StockMovement, TimeSession, WorkOrder,
    WorkOrderPatch, WorkOrderStatus, Zone, KIND_CORRECTIVE, KIND_PREVENTIVE, RESPONSE_NOK,
    RESPONSE_OK,
};
pub use cmms_engine::{
    AnswerInput, AssignmentScheduler, ChecklistService, ConsumptionReceipt, CreatedOrder,
    LifecycleEngine, MovementReceipt, MovementRequest, OrderNumberGenerator, PausedWork,
    RecurrenceGenerator, RoutineCodeGenerator, SessionTracker, StartedWork, StockService,
    TransitionOutcome,
};
pub use cmms_report::{scheduled_orders, DashboardStats, OrderDetailView, ScheduledOrderRow};
pub use cmms_store::{seed_defaults, MaintenanceStore};
