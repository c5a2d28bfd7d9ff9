//! # CMMS Store
//!
//! 記憶體資料存放層與部署初始化

pub mod seed;
pub mod store;

// Re-export 主要類型
pub use seed::seed_defaults;
pub use store::MaintenanceStore;
