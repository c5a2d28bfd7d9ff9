//! # CMMS Report
//!
//! 唯讀的 KPI 與檢視層：只讀取存放層的歷史狀態，不回寫。

pub mod dashboard;
pub mod order_view;

// Re-export 主要類型
pub use dashboard::DashboardStats;
pub use order_view::{scheduled_orders, OrderDetailView, ScheduledOrderRow};
