//! 備件庫存操作
//!
//! 工單領用為一次完整寫入：耗用紀錄、扣庫、流水帳三筆一體，
//! 檢核不過就整筆拒絕。

use chrono::NaiveDateTime;

use cmms_core::{CmmsError, MovementKind, PartConsumption, Result, StockMovement};
use cmms_store::MaintenanceStore;

use crate::{ConsumptionReceipt, MovementReceipt};

/// 直接登錄庫存異動的輸入
#[derive(Debug, Clone)]
pub struct MovementRequest {
    /// 異動方向
    pub kind: MovementKind,

    /// 細分類（purchase、return_unused、inventory_adjustment 等）
    pub sub_kind: Option<String>,

    /// 數量；盤點調整時為盤點後的絕對庫存
    pub quantity: rust_decimal::Decimal,

    /// 異動原因（未填時以細分類代替）
    pub reason: Option<String>,

    /// 參考單據
    pub ref_document: Option<String>,

    /// 操作人員
    pub user: Option<String>,

    /// 新單價（採購入庫時可同步調價）
    pub new_unit_price: Option<rust_decimal::Decimal>,
}

impl MovementRequest {
    pub fn new(kind: MovementKind, quantity: rust_decimal::Decimal) -> Self {
        Self {
            kind,
            sub_kind: None,
            quantity,
            reason: None,
            ref_document: None,
            user: None,
            new_unit_price: None,
        }
    }

    /// 建構器模式：設置細分類
    pub fn with_sub_kind(mut self, sub_kind: String) -> Self {
        self.sub_kind = Some(sub_kind);
        self
    }

    /// 建構器模式：設置新單價
    pub fn with_new_unit_price(mut self, price: rust_decimal::Decimal) -> Self {
        self.new_unit_price = Some(price);
        self
    }
}

/// 備件庫存服務
pub struct StockService;

impl StockService {
    /// 工單領用備件
    ///
    /// 快取領用當下的單價；庫存不足時整筆拒絕，不留耗用紀錄。
    pub fn consume_for_order(
        store: &mut MaintenanceStore,
        order_id: u64,
        part_id: u64,
        quantity: rust_decimal::Decimal,
        now: NaiveDateTime,
    ) -> Result<ConsumptionReceipt> {
        let number = store
            .order(order_id)
            .ok_or_else(|| CmmsError::NotFound(format!("工單不存在: {order_id}")))?
            .number
            .clone();
        if quantity <= rust_decimal::Decimal::ZERO {
            return Err(CmmsError::Validation("領用數量必須大於零".to_string()));
        }
        let (stock_before, unit_price) = {
            let part = store
                .part(part_id)
                .ok_or_else(|| CmmsError::NotFound(format!("備件不存在: {part_id}")))?;
            (part.stock, part.unit_price)
        };
        if stock_before < quantity {
            return Err(CmmsError::InsufficientStock {
                available: stock_before,
                requested: quantity,
            });
        }

        // 檢核全數通過，以下三筆寫入視為一體
        let consumption_id = store.insert_consumption(PartConsumption::new(
            order_id, part_id, quantity, unit_price, now,
        ));
        let stock_after = {
            let part = store
                .part_mut(part_id)
                .ok_or_else(|| CmmsError::NotFound(format!("備件不存在: {part_id}")))?;
            part.stock -= quantity;
            part.stock
        };
        store.record_movement(
            StockMovement::new(
                part_id,
                MovementKind::Outbound,
                quantity,
                stock_before,
                stock_after,
                now,
                format!("Consumption on work order {number}"),
            )
            .with_sub_kind("work_order_consumption".to_string())
            .with_ref_document(number.clone()),
        );

        tracing::info!("工單 {number} 領用備件 {part_id} × {quantity}");
        Ok(ConsumptionReceipt {
            consumption_id,
            stock_after,
            line_cost: (quantity * unit_price).round_dp(2),
        })
    }

    /// 直接登錄庫存異動（採購入庫、退庫、盤點調整）
    pub fn register_movement(
        store: &mut MaintenanceStore,
        part_id: u64,
        request: MovementRequest,
        now: NaiveDateTime,
    ) -> Result<MovementReceipt> {
        let (stock_before, mut unit_price) = {
            let part = store
                .part(part_id)
                .ok_or_else(|| CmmsError::NotFound(format!("備件不存在: {part_id}")))?;
            (part.stock, part.unit_price)
        };

        let (stock_after, recorded_quantity) = match request.kind {
            MovementKind::Inbound => (stock_before + request.quantity, request.quantity),
            MovementKind::Outbound => {
                if stock_before < request.quantity {
                    return Err(CmmsError::InsufficientStock {
                        available: stock_before,
                        requested: request.quantity,
                    });
                }
                (stock_before - request.quantity, request.quantity)
            }
            // 盤點調整：輸入為絕對庫存，流水帳記差額
            MovementKind::Adjustment => (request.quantity, request.quantity - stock_before),
        };

        // 採購入庫可同步調價
        if request.kind == MovementKind::Inbound
            && request.sub_kind.as_deref() == Some("purchase")
        {
            if let Some(price) = request.new_unit_price {
                unit_price = price;
            }
        }

        {
            let part = store
                .part_mut(part_id)
                .ok_or_else(|| CmmsError::NotFound(format!("備件不存在: {part_id}")))?;
            part.stock = stock_after;
            part.unit_price = unit_price;
        }

        let reason = request
            .reason
            .or_else(|| request.sub_kind.clone())
            .unwrap_or_default();
        let mut movement = StockMovement::new(
            part_id,
            request.kind,
            recorded_quantity,
            stock_before,
            stock_after,
            now,
            reason,
        );
        if let Some(sub_kind) = request.sub_kind {
            movement = movement.with_sub_kind(sub_kind);
        }
        if let Some(ref_document) = request.ref_document {
            movement = movement.with_ref_document(ref_document);
        }
        if let Some(user) = request.user {
            movement = movement.with_user(user);
        }
        let movement_id = store.record_movement(movement);

        Ok(MovementReceipt {
            movement_id,
            stock_after,
            unit_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cmms_core::{EquipmentKind, EquipmentRef, SparePart, WorkOrder};
    use rust_decimal::Decimal;

    fn at_ten() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn fixture(store: &mut MaintenanceStore, stock: i64) -> (u64, u64) {
        let order_id = store.insert_order(WorkOrder::new(
            "2500001".to_string(),
            "corrective".to_string(),
            "Fix".to_string(),
            EquipmentRef::new(EquipmentKind::Machine, 1),
            at_ten(),
        ));
        let part = SparePart::new(
            "BRG-6204".to_string(),
            "Bearing 6204".to_string(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
        .with_stock_levels(Decimal::from(stock), Decimal::from(2), Decimal::from(50))
        .with_unit_price(Decimal::new(1250, 2));
        let part_id = store.insert_part(part);
        (order_id, part_id)
    }

    #[test]
    fn test_consume_writes_all_three_records() {
        let mut store = MaintenanceStore::new();
        let (order_id, part_id) = fixture(&mut store, 10);

        let receipt =
            StockService::consume_for_order(&mut store, order_id, part_id, Decimal::from(4), at_ten())
                .unwrap();

        assert_eq!(receipt.stock_after, Decimal::from(6));
        assert_eq!(receipt.line_cost, Decimal::from(50));
        assert_eq!(store.part(part_id).unwrap().stock, Decimal::from(6));

        let consumptions = store.consumptions_for_order(order_id);
        assert_eq!(consumptions.len(), 1);
        // 單價於耗用當下快取
        assert_eq!(consumptions[0].unit_price, Decimal::new(1250, 2));

        let movements = store.movements_for_part(part_id);
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].kind, MovementKind::Outbound);
        assert_eq!(movements[0].ref_document.as_deref(), Some("2500001"));
    }

    #[test]
    fn test_insufficient_stock_rejects_whole_operation() {
        let mut store = MaintenanceStore::new();
        let (order_id, part_id) = fixture(&mut store, 5);

        let err =
            StockService::consume_for_order(&mut store, order_id, part_id, Decimal::from(6), at_ten())
                .unwrap_err();
        assert!(matches!(err, CmmsError::InsufficientStock { .. }));

        // 整筆拒絕：庫存不變、無耗用紀錄、無流水帳
        assert_eq!(store.part(part_id).unwrap().stock, Decimal::from(5));
        assert!(store.consumptions_for_order(order_id).is_empty());
        assert!(store.movements_for_part(part_id).is_empty());
    }

    #[test]
    fn test_purchase_inbound_updates_price() {
        let mut store = MaintenanceStore::new();
        let (_, part_id) = fixture(&mut store, 5);

        let receipt = StockService::register_movement(
            &mut store,
            part_id,
            MovementRequest::new(MovementKind::Inbound, Decimal::from(20))
                .with_sub_kind("purchase".to_string())
                .with_new_unit_price(Decimal::new(1399, 2)),
            at_ten(),
        )
        .unwrap();

        assert_eq!(receipt.stock_after, Decimal::from(25));
        assert_eq!(receipt.unit_price, Decimal::new(1399, 2));
        assert_eq!(store.part(part_id).unwrap().unit_price, Decimal::new(1399, 2));
    }

    #[test]
    fn test_adjustment_records_delta() {
        let mut store = MaintenanceStore::new();
        let (_, part_id) = fixture(&mut store, 10);

        StockService::register_movement(
            &mut store,
            part_id,
            MovementRequest::new(MovementKind::Adjustment, Decimal::from(7))
                .with_sub_kind("inventory_adjustment".to_string()),
            at_ten(),
        )
        .unwrap();

        assert_eq!(store.part(part_id).unwrap().stock, Decimal::from(7));
        let movements = store.movements_for_part(part_id);
        // 盤點到 7，原庫存 10：流水帳記 -3
        assert_eq!(movements[0].quantity, Decimal::from(-3));
    }
}
