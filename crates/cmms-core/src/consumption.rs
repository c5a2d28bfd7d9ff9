//! 備件耗用模型

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 工單上的一筆備件領用
///
/// 單價於耗用當下快取，之後備件調價不影響歷史成本。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartConsumption {
    /// 耗用ID
    pub id: u64,

    /// 工單ID
    pub order_id: u64,

    /// 備件ID
    pub part_id: u64,

    /// 數量
    pub quantity: Decimal,

    /// 單價（耗用當下的快取值）
    pub unit_price: Decimal,

    /// 耗用時間
    pub recorded_at: NaiveDateTime,
}

impl PartConsumption {
    pub fn new(
        order_id: u64,
        part_id: u64,
        quantity: Decimal,
        unit_price: Decimal,
        recorded_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: 0,
            order_id,
            part_id,
            quantity,
            unit_price,
            recorded_at,
        }
    }

    /// 此筆耗用的成本
    pub fn line_cost(&self) -> Decimal {
        (self.quantity * self.unit_price).round_dp(2)
    }
}
