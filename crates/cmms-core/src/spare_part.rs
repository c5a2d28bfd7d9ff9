//! 備件與庫存異動模型

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 備件（倉庫料件）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparePart {
    /// 備件ID
    pub id: u64,

    /// 料號
    pub code: String,

    /// 名稱
    pub name: String,

    /// 說明
    pub description: Option<String>,

    /// 分類
    pub category: Option<String>,

    /// 現有庫存
    pub stock: Decimal,

    /// 最低庫存
    pub min_stock: Decimal,

    /// 最高庫存
    pub max_stock: Decimal,

    /// 儲位
    pub location: Option<String>,

    /// 供應商
    pub vendor: Option<String>,

    /// 供應商料號
    pub vendor_code: Option<String>,

    /// 單價
    pub unit_price: Decimal,

    /// 計量單位
    pub unit: String,

    /// 建檔日期
    pub registered_on: NaiveDate,

    /// 是否啟用
    pub active: bool,
}

impl SparePart {
    /// 創建新的備件
    pub fn new(code: String, name: String, registered_on: NaiveDate) -> Self {
        Self {
            id: 0,
            code,
            name,
            description: None,
            category: None,
            stock: Decimal::ZERO,
            min_stock: Decimal::ZERO,
            max_stock: Decimal::from(100),
            location: None,
            vendor: None,
            vendor_code: None,
            unit_price: Decimal::ZERO,
            unit: "unit".to_string(),
            registered_on,
            active: true,
        }
    }

    /// 建構器模式：設置庫存水位
    pub fn with_stock_levels(mut self, stock: Decimal, min_stock: Decimal, max_stock: Decimal) -> Self {
        self.stock = stock;
        self.min_stock = min_stock;
        self.max_stock = max_stock;
        self
    }

    /// 建構器模式：設置單價
    pub fn with_unit_price(mut self, unit_price: Decimal) -> Self {
        self.unit_price = unit_price;
        self
    }

    /// 建構器模式：設置供應商
    pub fn with_vendor(mut self, vendor: String) -> Self {
        self.vendor = Some(vendor);
        self
    }

    /// 檢查庫存是否低於最低水位
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

/// 庫存異動方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// 入庫
    Inbound,
    /// 出庫
    Outbound,
    /// 盤點調整
    Adjustment,
}

/// 庫存異動紀錄（只增不改的流水帳）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    /// 異動ID
    pub id: u64,

    /// 備件ID
    pub part_id: u64,

    /// 異動方向
    pub kind: MovementKind,

    /// 細分類（採購、工單耗用、退庫等）
    pub sub_kind: Option<String>,

    /// 異動數量（調整時為差額）
    pub quantity: Decimal,

    /// 異動前庫存
    pub stock_before: Decimal,

    /// 異動後庫存
    pub stock_after: Decimal,

    /// 異動時間
    pub recorded_at: NaiveDateTime,

    /// 異動原因
    pub reason: String,

    /// 參考單據（工單號、進貨單號等）
    pub ref_document: Option<String>,

    /// 操作人員
    pub user: Option<String>,
}

impl StockMovement {
    pub fn new(
        part_id: u64,
        kind: MovementKind,
        quantity: Decimal,
        stock_before: Decimal,
        stock_after: Decimal,
        recorded_at: NaiveDateTime,
        reason: String,
    ) -> Self {
        Self {
            id: 0,
            part_id,
            kind,
            sub_kind: None,
            quantity,
            stock_before,
            stock_after,
            recorded_at,
            reason,
            ref_document: None,
            user: None,
        }
    }

    /// 建構器模式：設置細分類
    pub fn with_sub_kind(mut self, sub_kind: String) -> Self {
        self.sub_kind = Some(sub_kind);
        self
    }

    /// 建構器模式：設置參考單據
    pub fn with_ref_document(mut self, ref_document: String) -> Self {
        self.ref_document = Some(ref_document);
        self
    }

    /// 建構器模式：設置操作人員
    pub fn with_user(mut self, user: String) -> Self {
        self.user = Some(user);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_stock() {
        let part = SparePart::new(
            "BRG-6204".to_string(),
            "Bearing 6204".to_string(),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        )
        .with_stock_levels(Decimal::from(5), Decimal::from(5), Decimal::from(50));

        // 等於最低水位也算低庫存
        assert!(part.is_low_stock());

        let healthy = SparePart::new(
            "FLT-001".to_string(),
            "Oil filter".to_string(),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        )
        .with_stock_levels(Decimal::from(20), Decimal::from(5), Decimal::from(50));
        assert!(!healthy.is_low_stock());
    }
}
