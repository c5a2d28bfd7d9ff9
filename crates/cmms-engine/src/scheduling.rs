//! 範本指派排程
//!
//! 較舊的預防工單產生路徑：指派紀錄帶週期與上次 / 下次執行日，
//! 由排程介面手動觸發產生工單，與工單自帶週期的再生機制並存。

use chrono::NaiveDateTime;

use cmms_core::{
    CmmsError, EquipmentRef, MaintenanceRoutine, Recurrence, Result, RoutineAssignment, WorkOrder,
    KIND_PREVENTIVE,
};
use cmms_store::MaintenanceStore;

use crate::numbering::{OrderNumberGenerator, RoutineCodeGenerator};
use crate::CreatedOrder;

/// 範本指派排程服務
pub struct AssignmentScheduler;

impl AssignmentScheduler {
    /// 建檔保養範本並配發範本代碼
    pub fn register_routine(store: &mut MaintenanceStore, mut routine: MaintenanceRoutine) -> u64 {
        routine.code = RoutineCodeGenerator::next(store, routine.kind);
        store.insert_routine(routine)
    }

    /// 建立範本對設備的指派
    pub fn create_assignment(
        store: &mut MaintenanceStore,
        routine_id: u64,
        equipment: EquipmentRef,
        recurrence: Recurrence,
        today: chrono::NaiveDate,
    ) -> Result<u64> {
        if store.routine(routine_id).is_none() {
            return Err(CmmsError::NotFound(format!("保養範本不存在: {routine_id}")));
        }
        if store.resolve_equipment(equipment).is_none() {
            return Err(CmmsError::Validation("指派的設備不存在".to_string()));
        }

        let mut assignment = RoutineAssignment::new(routine_id, equipment, recurrence, today);
        assignment.compute_next_run(today);
        Ok(store.insert_assignment(assignment))
    }

    /// 自指派產生一張預防工單並前推下次執行日
    pub fn generate_from_assignment(
        store: &mut MaintenanceStore,
        assignment_id: u64,
        now: NaiveDateTime,
    ) -> Result<CreatedOrder> {
        let assignment = store
            .assignment(assignment_id)
            .ok_or_else(|| CmmsError::NotFound(format!("指派不存在: {assignment_id}")))?
            .clone();
        let routine = store
            .routine(assignment.routine_id)
            .ok_or_else(|| {
                CmmsError::NotFound(format!("保養範本不存在: {}", assignment.routine_id))
            })?
            .clone();

        let number = OrderNumberGenerator::next(store, now.date());
        let problem = format!(
            "Scheduled execution of routine {}\n\n{}",
            routine.code,
            routine.description.clone().unwrap_or_default()
        );
        let mut order = WorkOrder::new(
            number.clone(),
            KIND_PREVENTIVE.to_string(),
            format!("Preventive: {}", routine.name),
            assignment.equipment,
            now,
        )
        .with_problem(problem)
        .with_routine(Some(assignment.routine_id), Some(assignment.recurrence));
        if let Some(hours) = routine.estimated_hours() {
            order = order.with_estimated_hours(hours);
        }
        if let Some(scheduled) = assignment.next_run.and_then(|d| d.and_hms_opt(0, 0, 0)) {
            order = order.with_scheduled_for(scheduled);
        }
        let id = store.insert_order(order);

        let today = now.date();
        if let Some(assignment) = store.assignment_mut(assignment_id) {
            assignment.last_run = Some(today);
            assignment.compute_next_run(today);
        }

        tracing::info!(
            "指派 {assignment_id} 產生預防工單 {number}（範本 {}）",
            routine.code
        );
        Ok(CreatedOrder { id, number })
    }

    /// 停用指派
    pub fn deactivate(store: &mut MaintenanceStore, assignment_id: u64) -> Result<()> {
        let assignment = store
            .assignment_mut(assignment_id)
            .ok_or_else(|| CmmsError::NotFound(format!("指派不存在: {assignment_id}")))?;
        assignment.active = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cmms_core::{
        Company, EquipmentKind, Line, Machine, Plant, RecurrenceUnit, RoutineKind, Zone,
    };
    use rust_decimal::Decimal;

    fn machine_fixture(store: &mut MaintenanceStore) -> u64 {
        let company = store.insert_company(Company::new("ACM".to_string(), "Acme".to_string()));
        let plant = store.insert_plant(Plant::new(company, "P1".to_string(), "Plant".to_string()));
        let zone = store.insert_zone(Zone::new(plant, "Z1".to_string(), "Zone".to_string()));
        let line = store.insert_line(Line::new(zone, "L1".to_string(), "Line".to_string()));
        store.insert_machine(Machine::new(line, "M-01".to_string(), "Press".to_string()))
    }

    fn routine_fixture(store: &mut MaintenanceStore) -> u64 {
        AssignmentScheduler::register_routine(
            store,
            MaintenanceRoutine::new(
                String::new(),
                "Monthly lubrication".to_string(),
                RoutineKind::Preventive,
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            )
            .with_description("Grease all bearings".to_string())
            .with_estimated_minutes(90),
        )
    }

    #[test]
    fn test_register_routine_assigns_code() {
        let mut store = MaintenanceStore::new();
        let routine_id = routine_fixture(&mut store);
        assert_eq!(store.routine(routine_id).unwrap().code, "PR-0001");
    }

    #[test]
    fn test_create_assignment_validates_targets() {
        let mut store = MaintenanceStore::new();
        let machine_id = machine_fixture(&mut store);
        let routine_id = routine_fixture(&mut store);
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let recurrence = Recurrence::new(RecurrenceUnit::Days, 30);

        // 不存在的設備
        let err = AssignmentScheduler::create_assignment(
            &mut store,
            routine_id,
            EquipmentRef::new(EquipmentKind::Machine, 99),
            recurrence,
            today,
        )
        .unwrap_err();
        assert!(matches!(err, CmmsError::Validation(_)));

        let id = AssignmentScheduler::create_assignment(
            &mut store,
            routine_id,
            EquipmentRef::new(EquipmentKind::Machine, machine_id),
            recurrence,
            today,
        )
        .unwrap();

        // 未曾執行的指派立即到期
        let assignment = store.assignment(id).unwrap();
        assert_eq!(assignment.next_run, Some(today));
    }

    #[test]
    fn test_generate_from_assignment() {
        let mut store = MaintenanceStore::new();
        let machine_id = machine_fixture(&mut store);
        let routine_id = routine_fixture(&mut store);
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let now = today.and_hms_opt(7, 0, 0).unwrap();

        let assignment_id = AssignmentScheduler::create_assignment(
            &mut store,
            routine_id,
            EquipmentRef::new(EquipmentKind::Machine, machine_id),
            Recurrence::new(RecurrenceUnit::Weeks, 1),
            today,
        )
        .unwrap();

        let created =
            AssignmentScheduler::generate_from_assignment(&mut store, assignment_id, now).unwrap();

        let order = store.order(created.id).unwrap();
        assert_eq!(order.kind, KIND_PREVENTIVE);
        assert_eq!(order.title, "Preventive: Monthly lubrication");
        assert!(order.problem.starts_with("Scheduled execution of routine PR-0001"));
        assert_eq!(order.estimated_hours, Some(Decimal::new(15, 1)));
        assert_eq!(order.scheduled_for, today.and_hms_opt(0, 0, 0));

        // 指派日期前推
        let assignment = store.assignment(assignment_id).unwrap();
        assert_eq!(assignment.last_run, Some(today));
        assert_eq!(
            assignment.next_run,
            Some(NaiveDate::from_ymd_opt(2025, 3, 17).unwrap())
        );
    }
}
