//! 工單狀態機
//!
//! 狀態流：pending → assigned → in_progress → partially_closed → closed，
//! cancelled 可自任何非終止狀態進入。每次變更為一次完整操作：
//! 驗證全數通過才落寫入，失敗不留半套狀態。

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use cmms_core::{
    Actor, CmmsError, EngineConfig, MachineStatus, NewWorkOrder, Result, Role, WorkOrder,
    WorkOrderPatch, WorkOrderStatus, KIND_CORRECTIVE,
};
use cmms_store::MaintenanceStore;

use crate::checklist::ChecklistService;
use crate::numbering::OrderNumberGenerator;
use crate::recurrence::RecurrenceGenerator;
use crate::{CreatedOrder, TransitionOutcome};

fn order_not_found(order_id: u64) -> CmmsError {
    CmmsError::NotFound(format!("工單不存在: {order_id}"))
}

/// 工單生命週期引擎
pub struct LifecycleEngine {
    /// 引擎組態（由請求層解析一次後傳入）
    config: EngineConfig,
}

impl LifecycleEngine {
    /// 創建新的引擎
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// 建立工單（狀態為待處理）
    ///
    /// 故障維修工單指向運轉中的機台時，機台同步轉為故障狀態。
    pub fn create_order(
        &self,
        store: &mut MaintenanceStore,
        new: NewWorkOrder,
        now: NaiveDateTime,
    ) -> Result<CreatedOrder> {
        if new.title.trim().is_empty() {
            return Err(CmmsError::Validation("工單標題不可為空".to_string()));
        }

        let number = OrderNumberGenerator::next(store, now.date());
        let mut order = WorkOrder::new(
            number.clone(),
            new.kind.clone(),
            new.title,
            new.equipment,
            now,
        )
        .with_priority(new.priority)
        .with_problem(new.problem)
        .with_created_by(new.created_by)
        .with_routine(new.routine_id, new.recurrence);
        if let Some(technician) = new.technician {
            order = order.with_technician(technician);
        }
        if let Some(hours) = new.estimated_hours {
            order = order.with_estimated_hours(hours);
        }
        if let Some(scheduled) = new.scheduled_for {
            order = order.with_scheduled_for(scheduled);
        }
        let id = store.insert_order(order);

        if new.kind == KIND_CORRECTIVE && new.equipment.is_machine() {
            if let Some(machine) = store.machine_mut(new.equipment.id) {
                if machine.status == MachineStatus::Operational {
                    machine.status = MachineStatus::Broken;
                }
            }
        }

        tracing::info!("建立工單 {number}（類別 {}）", new.kind);
        Ok(CreatedOrder { id, number })
    }

    /// 套用欄位補丁
    pub fn apply_patch(
        &self,
        store: &mut MaintenanceStore,
        order_id: u64,
        patch: &WorkOrderPatch,
    ) -> Result<()> {
        let order = store
            .order_mut(order_id)
            .ok_or_else(|| order_not_found(order_id))?;
        patch.apply(order)
    }

    /// 變更工單狀態
    ///
    /// 進入 partially_closed / closed 時執行工時安全網；
    /// 預防工單於 partially_closed 觸發再生與檢查表衍生，
    /// 兩者失敗皆不影響本次變更的結果。
    pub fn set_status(
        &self,
        store: &mut MaintenanceStore,
        order_id: u64,
        target: WorkOrderStatus,
        actor: &Actor,
        now: NaiveDateTime,
    ) -> Result<TransitionOutcome> {
        // 前置驗證：不通過則整個操作拒絕
        {
            let order = store.order(order_id).ok_or_else(|| order_not_found(order_id))?;
            if target == WorkOrderStatus::Assigned && !order.has_technician() {
                return Err(CmmsError::Validation(
                    "未指派技師的工單不可標記為已指派".to_string(),
                ));
            }
            if target == WorkOrderStatus::Closed
                && actor.role == Role::Technician
                && !self.config.technician_can_close
            {
                return Err(CmmsError::Validation(
                    "技師無最終結案權限".to_string(),
                ));
            }
        }

        let mut generated_preventive = None;
        let mut spawned_correctives = Vec::new();
        let mut reconciled_sessions = 0;

        match target {
            WorkOrderStatus::InProgress => {
                let order = store
                    .order_mut(order_id)
                    .ok_or_else(|| order_not_found(order_id))?;
                if order.started_at.is_none() {
                    order.started_at = Some(now);
                }
                // 重新開工：清除先前的完工時間與結案者
                if order.finished_at.is_some() {
                    order.finished_at = None;
                    order.closed_by = None;
                }
            }
            WorkOrderStatus::PartiallyClosed => {
                let (is_corrective, is_preventive, equipment) = {
                    let order = store
                        .order_mut(order_id)
                        .ok_or_else(|| order_not_found(order_id))?;
                    if order.started_at.is_none() {
                        order.started_at = Some(now);
                    }
                    order.finished_at = Some(now);
                    (order.is_corrective(), order.is_preventive(), order.equipment)
                };

                reconciled_sessions = self.reconcile_open_sessions(store, order_id)?;

                // 故障維修完工：機台回到運轉狀態
                if is_corrective && equipment.is_machine() {
                    if let Some(machine) = store.machine_mut(equipment.id) {
                        machine.status = MachineStatus::Operational;
                    }
                }

                if is_preventive {
                    generated_preventive = RecurrenceGenerator::generate_next(store, order_id, now);
                    spawned_correctives = ChecklistService::spawn_correctives(store, order_id, now);
                }
            }
            WorkOrderStatus::Closed => {
                {
                    let order = store
                        .order_mut(order_id)
                        .ok_or_else(|| order_not_found(order_id))?;
                    // 已經部分結案過的完工時間不覆寫
                    if order.finished_at.is_none() {
                        order.finished_at = Some(now);
                    }
                    order.closed_by = Some(actor.name.clone());
                }
                reconciled_sessions = self.reconcile_open_sessions(store, order_id)?;
            }
            WorkOrderStatus::Pending | WorkOrderStatus::Assigned | WorkOrderStatus::Cancelled => {}
        }

        let order = store
            .order_mut(order_id)
            .ok_or_else(|| order_not_found(order_id))?;
        let previous = order.status;
        order.status = target;
        tracing::info!(
            "工單 {} 狀態 {} → {}",
            order.number,
            previous.as_str(),
            target.as_str()
        );

        Ok(TransitionOutcome {
            status: target,
            generated_preventive,
            spawned_correctives,
            reconciled_sessions,
        })
    }

    /// 工時安全網
    ///
    /// 強制結束技師忘記停止的工時紀錄，終點取工單完工時間而非
    /// 對帳當下，工時才會是「開工到結單」而非「開工到對帳」。
    fn reconcile_open_sessions(
        &self,
        store: &mut MaintenanceStore,
        order_id: u64,
    ) -> Result<usize> {
        let (number, finished_at) = {
            let order = store.order(order_id).ok_or_else(|| order_not_found(order_id))?;
            (order.number.clone(), order.finished_at)
        };
        let end = match finished_at {
            Some(end) => end,
            None => return Ok(0),
        };

        let open_ids = store.open_session_ids(order_id);
        for session_id in &open_ids {
            if let Some(session) = store.session_mut(*session_id) {
                session.finished_at = Some(end);
                session.open = false;
            }
        }

        if !open_ids.is_empty() {
            let total = store.finished_hours_total(order_id);
            if let Some(order) = store.order_mut(order_id) {
                order.actual_hours = Some(total);
            }
            tracing::warn!(
                "工單 {}: 自動結束 {} 筆未停止的工時紀錄",
                number,
                open_ids.len()
            );
        }

        Ok(open_ids.len())
    }

    /// 管理性刪除：工單與其工時紀錄、耗用、檢查回覆一併移除
    pub fn delete_order(&self, store: &mut MaintenanceStore, order_id: u64) -> Result<String> {
        let order = store.delete_order_cascade(order_id)?;
        tracing::info!("刪除工單 {}", order.number);
        Ok(order.number)
    }

    /// 新增外部工廠費用，回傳重算後的合計
    pub fn add_external_cost(
        &self,
        store: &mut MaintenanceStore,
        order_id: u64,
        vendor: String,
        description: String,
        cost: Decimal,
    ) -> Result<Decimal> {
        let order = store
            .order_mut(order_id)
            .ok_or_else(|| order_not_found(order_id))?;
        order.add_external_cost(vendor, description, cost);
        Ok(order.external_cost_total)
    }

    /// 依索引移除外部工廠費用，回傳重算後的合計
    pub fn remove_external_cost(
        &self,
        store: &mut MaintenanceStore,
        order_id: u64,
        index: usize,
    ) -> Result<Decimal> {
        let order = store
            .order_mut(order_id)
            .ok_or_else(|| order_not_found(order_id))?;
        order.remove_external_cost(index)?;
        Ok(order.external_cost_total)
    }
}

impl Default for LifecycleEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cmms_core::{
        EquipmentKind, EquipmentRef, Line, Machine, Plant, TimeSession, Zone, KIND_PREVENTIVE,
    };
    use cmms_core::Company;

    fn noon(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn machine_fixture(store: &mut MaintenanceStore) -> u64 {
        let company = store.insert_company(Company::new("ACM".to_string(), "Acme".to_string()));
        let plant = store.insert_plant(Plant::new(company, "P1".to_string(), "Plant".to_string()));
        let zone = store.insert_zone(Zone::new(plant, "Z1".to_string(), "Zone".to_string()));
        let line = store.insert_line(Line::new(zone, "L1".to_string(), "Line".to_string()));
        store.insert_machine(Machine::new(line, "M-01".to_string(), "Press".to_string()))
    }

    fn corrective_on_machine(store: &mut MaintenanceStore, machine_id: u64) -> u64 {
        let engine = LifecycleEngine::default();
        let new = NewWorkOrder::new(
            KIND_CORRECTIVE.to_string(),
            "Fix press".to_string(),
            EquipmentRef::new(EquipmentKind::Machine, machine_id),
        );
        engine.create_order(store, new, noon(1)).unwrap().id
    }

    #[test]
    fn test_assigned_requires_technician() {
        let mut store = MaintenanceStore::new();
        let machine_id = machine_fixture(&mut store);
        let order_id = corrective_on_machine(&mut store, machine_id);
        let engine = LifecycleEngine::default();
        let boss = Actor::supervisor("Boss");

        let err = engine
            .set_status(&mut store, order_id, WorkOrderStatus::Assigned, &boss, noon(2))
            .unwrap_err();
        assert!(matches!(err, CmmsError::Validation(_)));
        // 操作整筆拒絕，狀態不變
        assert_eq!(store.order(order_id).unwrap().status, WorkOrderStatus::Pending);

        store.order_mut(order_id).unwrap().technician = Some("J. Garcia".to_string());
        engine
            .set_status(&mut store, order_id, WorkOrderStatus::Assigned, &boss, noon(2))
            .unwrap();
        assert_eq!(store.order(order_id).unwrap().status, WorkOrderStatus::Assigned);
    }

    #[test]
    fn test_transition_timestamps() {
        let mut store = MaintenanceStore::new();
        let machine_id = machine_fixture(&mut store);
        let order_id = corrective_on_machine(&mut store, machine_id);
        let engine = LifecycleEngine::default();
        let boss = Actor::supervisor("Boss");

        engine
            .set_status(&mut store, order_id, WorkOrderStatus::InProgress, &boss, noon(2))
            .unwrap();
        {
            let order = store.order(order_id).unwrap();
            assert_eq!(order.started_at, Some(noon(2)));
            assert!(order.finished_at.is_none());
        }

        engine
            .set_status(&mut store, order_id, WorkOrderStatus::PartiallyClosed, &boss, noon(3))
            .unwrap();
        {
            let order = store.order(order_id).unwrap();
            // 開工時間不被覆寫，完工時間為本次變更時間
            assert_eq!(order.started_at, Some(noon(2)));
            assert_eq!(order.finished_at, Some(noon(3)));
        }

        // 重新開工清除完工時間與結案者
        engine
            .set_status(&mut store, order_id, WorkOrderStatus::InProgress, &boss, noon(4))
            .unwrap();
        {
            let order = store.order(order_id).unwrap();
            assert_eq!(order.started_at, Some(noon(2)));
            assert!(order.finished_at.is_none());
            assert!(order.closed_by.is_none());
        }
    }

    #[test]
    fn test_close_is_idempotent_on_finish_timestamp() {
        let mut store = MaintenanceStore::new();
        let machine_id = machine_fixture(&mut store);
        let order_id = corrective_on_machine(&mut store, machine_id);
        let engine = LifecycleEngine::default();
        let boss = Actor::supervisor("Boss");

        engine
            .set_status(&mut store, order_id, WorkOrderStatus::Closed, &boss, noon(5))
            .unwrap();
        assert_eq!(store.order(order_id).unwrap().finished_at, Some(noon(5)));

        // 第二次結案不得以較晚的 now 覆寫完工時間
        engine
            .set_status(&mut store, order_id, WorkOrderStatus::Closed, &boss, noon(9))
            .unwrap();
        assert_eq!(store.order(order_id).unwrap().finished_at, Some(noon(5)));
    }

    #[test]
    fn test_technician_close_gate() {
        let mut store = MaintenanceStore::new();
        let machine_id = machine_fixture(&mut store);
        let order_id = corrective_on_machine(&mut store, machine_id);
        let tech = Actor::technician("J. Garcia");

        let strict = LifecycleEngine::default();
        let err = strict
            .set_status(&mut store, order_id, WorkOrderStatus::Closed, &tech, noon(5))
            .unwrap_err();
        assert!(matches!(err, CmmsError::Validation(_)));

        let permissive = LifecycleEngine::new(EngineConfig {
            technician_can_close: true,
        });
        let outcome = permissive
            .set_status(&mut store, order_id, WorkOrderStatus::Closed, &tech, noon(5))
            .unwrap();
        assert_eq!(outcome.status, WorkOrderStatus::Closed);
        assert_eq!(
            store.order(order_id).unwrap().closed_by.as_deref(),
            Some("J. Garcia")
        );
    }

    #[test]
    fn test_machine_flips_broken_and_back() {
        let mut store = MaintenanceStore::new();
        let machine_id = machine_fixture(&mut store);

        // 建立故障維修工單：運轉中的機台轉為故障
        let order_id = corrective_on_machine(&mut store, machine_id);
        assert_eq!(store.machine(machine_id).unwrap().status, MachineStatus::Broken);

        let engine = LifecycleEngine::default();
        let boss = Actor::supervisor("Boss");
        engine
            .set_status(&mut store, order_id, WorkOrderStatus::PartiallyClosed, &boss, noon(2))
            .unwrap();
        assert_eq!(
            store.machine(machine_id).unwrap().status,
            MachineStatus::Operational
        );
    }

    #[test]
    fn test_safety_net_closes_forgotten_sessions() {
        let mut store = MaintenanceStore::new();
        let machine_id = machine_fixture(&mut store);
        let order_id = corrective_on_machine(&mut store, machine_id);
        let engine = LifecycleEngine::default();
        let boss = Actor::supervisor("Boss");

        // 兩位技師開工，其中一位忘記停止計時
        let start = noon(2);
        store.insert_session(TimeSession::new(order_id, "A".to_string(), start));
        let mut closed = TimeSession::new(order_id, "B".to_string(), start);
        closed.finished_at = Some(start + chrono::Duration::minutes(30));
        closed.open = false;
        store.insert_session(closed);

        let end = start + chrono::Duration::hours(2);
        let outcome = engine
            .set_status(&mut store, order_id, WorkOrderStatus::PartiallyClosed, &boss, end)
            .unwrap();
        assert_eq!(outcome.reconciled_sessions, 1);

        let order = store.order(order_id).unwrap();
        assert_eq!(order.finished_at, Some(end));
        // 2h（強制結束，終點取工單完工時間）+ 0.5h = 2.5h
        assert_eq!(order.actual_hours, Some(Decimal::new(25, 1)));

        for session in store.sessions_for_order(order_id) {
            assert!(!session.open);
            assert!(session.finished_at.is_some());
        }
        // 強制結束的紀錄終點是工單完工時間，不是對帳當下
        assert_eq!(
            store.sessions_for_order(order_id)[0].finished_at,
            Some(end)
        );
    }

    #[test]
    fn test_external_cost_ops() {
        let mut store = MaintenanceStore::new();
        let machine_id = machine_fixture(&mut store);
        let order_id = corrective_on_machine(&mut store, machine_id);
        let engine = LifecycleEngine::default();

        let total = engine
            .add_external_cost(
                &mut store,
                order_id,
                "Talleres Norte".to_string(),
                "Motor rewinding".to_string(),
                Decimal::new(120055, 2),
            )
            .unwrap();
        assert_eq!(total, Decimal::new(120055, 2));

        assert!(engine.remove_external_cost(&mut store, order_id, 3).is_err());
        let total = engine.remove_external_cost(&mut store, order_id, 0).unwrap();
        assert_eq!(total, Decimal::ZERO);
    }

    #[test]
    fn test_delete_order_cascades() {
        let mut store = MaintenanceStore::new();
        let machine_id = machine_fixture(&mut store);
        let order_id = corrective_on_machine(&mut store, machine_id);
        store.insert_session(TimeSession::new(order_id, "A".to_string(), noon(2)));

        let engine = LifecycleEngine::default();
        let number = engine.delete_order(&mut store, order_id).unwrap();
        assert_eq!(number, "2500001");
        assert!(store.order(order_id).is_none());
        assert!(store.sessions_for_order(order_id).is_empty());
    }

    #[test]
    fn test_preventive_partial_close_emits_successor() {
        use cmms_core::{Recurrence, RecurrenceUnit};

        let mut store = MaintenanceStore::new();
        let machine_id = machine_fixture(&mut store);
        let engine = LifecycleEngine::default();
        let boss = Actor::supervisor("Boss");

        let new = NewWorkOrder::new(
            KIND_PREVENTIVE.to_string(),
            "Weekly greasing".to_string(),
            EquipmentRef::new(EquipmentKind::Machine, machine_id),
        )
        .with_routine(1, Recurrence::new(RecurrenceUnit::Days, 7));
        let order_id = engine.create_order(&mut store, new, noon(1)).unwrap().id;

        let outcome = engine
            .set_status(&mut store, order_id, WorkOrderStatus::PartiallyClosed, &boss, noon(3))
            .unwrap();

        let successor_number = outcome.generated_preventive.expect("successor generated");
        let successor = store
            .orders()
            .find(|o| o.number == successor_number)
            .unwrap();
        assert_eq!(successor.status, WorkOrderStatus::Pending);
        assert_eq!(
            successor.scheduled_for,
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap().and_hms_opt(0, 0, 0)
        );
    }
}
