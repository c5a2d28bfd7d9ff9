//! 引擎組態與操作者身份
//!
//! 組態旗標由請求層解析一次後顯式傳入引擎，不經全域狀態。

use serde::{Deserialize, Serialize};

/// 引擎組態
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 技師是否可自行做最終結案（不需主管）
    pub technician_can_close: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            technician_can_close: false,
        }
    }
}

/// 使用者角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// 技師
    Technician,
    /// 主管
    Supervisor,
    /// 管理員
    Admin,
}

/// 發起操作的使用者
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// 姓名
    pub name: String,

    /// 角色
    pub role: Role,
}

impl Actor {
    pub fn new(name: String, role: Role) -> Self {
        Self { name, role }
    }

    /// 主管身份（測試與部署工具常用）
    pub fn supervisor(name: &str) -> Self {
        Self::new(name.to_string(), Role::Supervisor)
    }

    /// 技師身份
    pub fn technician(name: &str) -> Self {
        Self::new(name.to_string(), Role::Technician)
    }
}
