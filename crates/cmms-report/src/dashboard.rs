//! 儀表板統計

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cmms_core::{MachineStatus, WorkOrderStatus};
use cmms_store::MaintenanceStore;

/// 儀表板統計數字
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    /// 待處理工單數
    pub pending_orders: usize,

    /// 進行中工單數
    pub in_progress_orders: usize,

    /// 本月結案工單數
    pub closed_this_month: usize,

    /// 機台總數
    pub total_machines: usize,

    /// 運轉中機台數
    pub operational_machines: usize,

    /// 故障機台數
    pub broken_machines: usize,

    /// 可動率（%）；無機台時視為 100
    pub availability_pct: Decimal,

    /// 低庫存備件數
    pub low_stock_parts: usize,

    /// 已到期的範本指派數
    pub assignments_due: usize,

    /// 一週內到期的範本指派數
    pub assignments_due_next_week: usize,
}

impl DashboardStats {
    /// 彙整統計（唯讀）
    pub fn collect(store: &MaintenanceStore, today: NaiveDate) -> Self {
        let month_start = today.with_day0(0).unwrap_or(today);

        let pending_orders = store
            .orders()
            .filter(|o| o.status == WorkOrderStatus::Pending)
            .count();
        let in_progress_orders = store
            .orders()
            .filter(|o| o.status == WorkOrderStatus::InProgress)
            .count();
        let closed_this_month = store
            .orders()
            .filter(|o| o.status == WorkOrderStatus::Closed)
            .filter(|o| {
                o.finished_at
                    .map(|end| end.date() >= month_start)
                    .unwrap_or(false)
            })
            .count();

        let total_machines = store.machines().count();
        let operational_machines = store
            .machines()
            .filter(|m| m.status == MachineStatus::Operational)
            .count();
        let broken_machines = store
            .machines()
            .filter(|m| m.status == MachineStatus::Broken)
            .count();
        let availability_pct = if total_machines > 0 {
            (Decimal::from(operational_machines) * Decimal::from(100)
                / Decimal::from(total_machines))
            .round()
        } else {
            Decimal::from(100)
        };

        let low_stock_parts = store
            .parts()
            .filter(|p| p.active && p.is_low_stock())
            .count();

        let week_ahead = today + chrono::Duration::days(7);
        let assignments_due = store.assignments().filter(|a| a.is_due(today)).count();
        let assignments_due_next_week = store
            .assignments()
            .filter(|a| a.active)
            .filter(|a| {
                a.next_run
                    .map(|d| d > today && d <= week_ahead)
                    .unwrap_or(false)
            })
            .count();

        Self {
            pending_orders,
            in_progress_orders,
            closed_this_month,
            total_machines,
            operational_machines,
            broken_machines,
            availability_pct,
            low_stock_parts,
            assignments_due,
            assignments_due_next_week,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmms_core::{Company, EquipmentKind, EquipmentRef, Line, Machine, Plant, WorkOrder, Zone};

    #[test]
    fn test_collect_counts() {
        let mut store = MaintenanceStore::new();
        let company = store.insert_company(Company::new("ACM".to_string(), "Acme".to_string()));
        let plant = store.insert_plant(Plant::new(company, "P1".to_string(), "Plant".to_string()));
        let zone = store.insert_zone(Zone::new(plant, "Z1".to_string(), "Zone".to_string()));
        let line = store.insert_line(Line::new(zone, "L1".to_string(), "Line".to_string()));
        store.insert_machine(Machine::new(line, "M-01".to_string(), "Press".to_string()));
        let mut broken = Machine::new(line, "M-02".to_string(), "Filler".to_string());
        broken.status = MachineStatus::Broken;
        store.insert_machine(broken);

        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let created = today.and_hms_opt(8, 0, 0).unwrap();
        store.insert_order(WorkOrder::new(
            "2500001".to_string(),
            "corrective".to_string(),
            "Open".to_string(),
            EquipmentRef::new(EquipmentKind::Machine, 1),
            created,
        ));
        let mut closed = WorkOrder::new(
            "2500002".to_string(),
            "corrective".to_string(),
            "Done".to_string(),
            EquipmentRef::new(EquipmentKind::Machine, 1),
            created,
        );
        closed.status = WorkOrderStatus::Closed;
        closed.finished_at = today.with_day(2).unwrap().and_hms_opt(16, 0, 0);
        store.insert_order(closed);

        let stats = DashboardStats::collect(&store, today);
        assert_eq!(stats.pending_orders, 1);
        assert_eq!(stats.closed_this_month, 1);
        assert_eq!(stats.total_machines, 2);
        assert_eq!(stats.operational_machines, 1);
        assert_eq!(stats.broken_machines, 1);
        assert_eq!(stats.availability_pct, Decimal::from(50));
    }

    #[test]
    fn test_availability_without_machines() {
        let store = MaintenanceStore::new();
        let stats = DashboardStats::collect(&store, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        assert_eq!(stats.availability_pct, Decimal::from(100));
    }
}
