//! 工單檢視
//!
//! 設備名稱與階層路徑於讀取時解析，供報表層使用。

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cmms_core::{CmmsError, Result, WorkOrder, WorkOrderStatus};
use cmms_store::MaintenanceStore;

/// 工時紀錄檢視列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    /// 技師姓名
    pub technician: String,

    /// 開始時間
    pub started_at: NaiveDateTime,

    /// 結束時間
    pub finished_at: Option<NaiveDateTime>,

    /// 是否進行中
    pub open: bool,

    /// 區段時長（小時，四捨五入到 2 位）
    pub hours: Decimal,
}

/// 備件耗用檢視列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionView {
    /// 料號
    pub part_code: String,

    /// 備件名稱
    pub part_name: String,

    /// 數量
    pub quantity: Decimal,

    /// 耗用當下的單價
    pub unit_price: Decimal,

    /// 此筆成本
    pub cost: Decimal,
}

/// 工單完整檢視
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetailView {
    /// 工單本體
    pub order: WorkOrder,

    /// 設備名稱
    pub equipment_name: String,

    /// 設備代碼
    pub equipment_code: String,

    /// 設備階層路徑
    pub equipment_path: String,

    /// 工時紀錄
    pub sessions: Vec<SessionView>,

    /// 已結束工時合計（小時）
    pub total_hours: Decimal,

    /// 備件耗用
    pub consumptions: Vec<ConsumptionView>,

    /// 備件成本合計
    pub parts_cost: Decimal,

    /// 備件 + 外部工廠成本合計
    pub total_cost: Decimal,
}

impl OrderDetailView {
    /// 組裝工單檢視（唯讀；進行中工時以 `now` 估算）
    pub fn build(store: &MaintenanceStore, order_id: u64, now: NaiveDateTime) -> Result<Self> {
        let order = store
            .order(order_id)
            .ok_or_else(|| CmmsError::NotFound(format!("工單不存在: {order_id}")))?
            .clone();

        let info = store.resolve_equipment(order.equipment);
        let (equipment_name, equipment_code) = info
            .map(|i| (i.name, i.code))
            .unwrap_or_else(|| (String::new(), String::new()));
        let equipment_path = store.equipment_path(order.equipment);

        let sessions: Vec<SessionView> = store
            .sessions_for_order(order_id)
            .into_iter()
            .map(|s| SessionView {
                technician: s.technician.clone(),
                started_at: s.started_at,
                finished_at: s.finished_at,
                open: s.open,
                hours: s.duration_hours(now).round_dp(2),
            })
            .collect();
        let total_hours = store.finished_hours_total(order_id);

        let consumptions: Vec<ConsumptionView> = store
            .consumptions_for_order(order_id)
            .into_iter()
            .map(|c| {
                let (part_code, part_name) = store
                    .part(c.part_id)
                    .map(|p| (p.code.clone(), p.name.clone()))
                    .unwrap_or_else(|| (String::new(), String::new()));
                ConsumptionView {
                    part_code,
                    part_name,
                    quantity: c.quantity,
                    unit_price: c.unit_price,
                    cost: c.line_cost(),
                }
            })
            .collect();
        let parts_cost = consumptions
            .iter()
            .map(|c| c.cost)
            .sum::<Decimal>()
            .round_dp(2);
        let total_cost = (parts_cost + order.external_cost_total).round_dp(2);

        Ok(Self {
            order,
            equipment_name,
            equipment_code,
            equipment_path,
            sessions,
            total_hours,
            consumptions,
            parts_cost,
            total_cost,
        })
    }
}

/// 行事曆檢視列（有排定時間且未結案 / 未取消的工單）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledOrderRow {
    /// 工單ID
    pub id: u64,

    /// 工單號碼
    pub number: String,

    /// 類別
    pub kind: String,

    /// 狀態
    pub status: WorkOrderStatus,

    /// 標題
    pub title: String,

    /// 排定執行時間
    pub scheduled_for: NaiveDateTime,

    /// 設備名稱
    pub equipment_name: String,
}

/// 所有排定中的工單，依排定時間排序
pub fn scheduled_orders(store: &MaintenanceStore) -> Vec<ScheduledOrderRow> {
    let mut rows: Vec<ScheduledOrderRow> = store
        .orders()
        .filter(|o| !o.status.is_terminal())
        .filter_map(|o| {
            o.scheduled_for.map(|scheduled_for| ScheduledOrderRow {
                id: o.id,
                number: o.number.clone(),
                kind: o.kind.clone(),
                status: o.status,
                title: o.title.clone(),
                scheduled_for,
                equipment_name: store
                    .resolve_equipment(o.equipment)
                    .map(|i| i.name)
                    .unwrap_or_default(),
            })
        })
        .collect();
    rows.sort_by_key(|r| r.scheduled_for);
    rows
}
