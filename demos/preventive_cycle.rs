//! 預防保養循環示例

use chrono::NaiveDate;
use rust_decimal::Decimal;

use cmms::{
    seed_defaults, Actor, AssignmentScheduler, ChecklistItem, Company, EquipmentKind,
    EquipmentRef, LifecycleEngine, Line, Machine, MaintenanceRoutine, MaintenanceStore,
    NewWorkOrder, Plant, Recurrence, RecurrenceUnit, RoutineKind, SessionTracker, WorkOrderStatus,
    Zone, KIND_PREVENTIVE,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    println!("=== 預防保養循環示例 ===\n");

    let mut store = MaintenanceStore::new();
    seed_defaults(&mut store);

    // 建立設備階層
    let company = store.insert_company(Company::new("ACM".to_string(), "Acme Foods".to_string()));
    let plant = store.insert_plant(Plant::new(company, "P1".to_string(), "North plant".to_string()));
    let zone = store.insert_zone(Zone::new(plant, "Z1".to_string(), "Packaging".to_string()));
    let line = store.insert_line(Line::new(zone, "L1".to_string(), "Filling line".to_string()));
    let machine =
        store.insert_machine(Machine::new(line, "M-01".to_string(), "Filler".to_string()));

    // 建檔保養範本
    let routine_id = AssignmentScheduler::register_routine(
        &mut store,
        MaintenanceRoutine::new(
            String::new(),
            "Weekly greasing".to_string(),
            RoutineKind::Preventive,
            NaiveDate::from_ymd_opt(2025, 1, 1).ok_or("bad date")?,
        )
        .with_estimated_minutes(120)
        .with_checklist_item(ChecklistItem::new("Belt tension".to_string(), 1)),
    );

    // 建立帶週期的預防工單
    let engine = LifecycleEngine::default();
    let now = NaiveDate::from_ymd_opt(2025, 3, 10)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .ok_or("bad date")?;
    let created = engine.create_order(
        &mut store,
        NewWorkOrder::new(
            KIND_PREVENTIVE.to_string(),
            "Weekly greasing".to_string(),
            EquipmentRef::new(EquipmentKind::Machine, machine),
        )
        .with_routine(routine_id, Recurrence::new(RecurrenceUnit::Days, 7))
        .with_estimated_hours(Decimal::from(2)),
        now,
    )?;
    println!("建立預防工單: {}", created.number);

    // 技師開工、完工
    SessionTracker::start_work(&mut store, created.id, "J. Garcia", now)?;
    let paused = SessionTracker::pause_work(
        &mut store,
        created.id,
        "J. Garcia",
        now + chrono::Duration::hours(2),
    )?;
    println!("技師工時: {}h", paused.total_hours);

    // 部分結案觸發下一張預防工單
    let outcome = engine.set_status(
        &mut store,
        created.id,
        WorkOrderStatus::PartiallyClosed,
        &Actor::supervisor("Boss"),
        now + chrono::Duration::hours(3),
    )?;
    if let Some(number) = &outcome.generated_preventive {
        println!("自動產生下一張預防工單: {number}");
    }

    Ok(())
}
