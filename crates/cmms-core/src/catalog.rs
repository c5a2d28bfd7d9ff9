//! 工單類別目錄
//!
//! 工單類別為開放集合，由目錄定義；引擎僅解讀
//! `corrective` 與 `preventive` 兩種內建類別。

use serde::{Deserialize, Serialize};

/// 工單類別定義
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterventionType {
    /// 類別代碼（如 `corrective`、`preventive`）
    pub code: String,

    /// 顯示名稱
    pub name: String,

    /// 說明
    pub description: Option<String>,

    /// 圖示（FontAwesome class）
    pub icon: String,

    /// 標籤顏色
    pub color: String,

    /// 是否啟用
    pub active: bool,

    /// 列表排序
    pub position: u32,
}

impl InterventionType {
    pub fn new(code: String, name: String, icon: String, position: u32) -> Self {
        Self {
            code,
            name,
            description: None,
            icon,
            color: "#1976d2".to_string(),
            active: true,
            position,
        }
    }

    /// 建構器模式：設置標籤顏色
    pub fn with_color(mut self, color: String) -> Self {
        self.color = color;
        self
    }
}
