//! 資料存放層
//!
//! 以 HashMap 為底的單機存放層。每個頂層操作持有 `&mut` 獨占存取，
//! 天然序列化並發請求；引擎採先驗證後寫入，失敗時不留下半套狀態。

use std::collections::HashMap;

use rust_decimal::Decimal;

use cmms_core::{
    ChecklistAnswer, ChecklistItem, CmmsError, Company, Element, EquipmentInfo, EquipmentKind,
    EquipmentRef, InterventionType, Line, Machine, MaintenanceRoutine, PartConsumption, Plant,
    Result, RoutineAssignment, SparePart, StockMovement, TimeSession, WorkOrder, Zone,
    KIND_PREVENTIVE,
};

/// 各實體的流水號計數器
#[derive(Debug, Default)]
struct IdSequences {
    company: u64,
    plant: u64,
    zone: u64,
    line: u64,
    machine: u64,
    element: u64,
    part: u64,
    movement: u64,
    routine: u64,
    routine_item: u64,
    assignment: u64,
    order: u64,
    session: u64,
    consumption: u64,
    answer: u64,
}

fn bump(seq: &mut u64) -> u64 {
    *seq += 1;
    *seq
}

/// 維護資料存放層
#[derive(Debug, Default)]
pub struct MaintenanceStore {
    companies: HashMap<u64, Company>,
    plants: HashMap<u64, Plant>,
    zones: HashMap<u64, Zone>,
    lines: HashMap<u64, Line>,
    machines: HashMap<u64, Machine>,
    elements: HashMap<u64, Element>,

    parts: HashMap<u64, SparePart>,
    movements: Vec<StockMovement>,

    routines: HashMap<u64, MaintenanceRoutine>,
    assignments: HashMap<u64, RoutineAssignment>,
    intervention_types: HashMap<String, InterventionType>,

    orders: HashMap<u64, WorkOrder>,
    sessions: HashMap<u64, TimeSession>,
    consumptions: HashMap<u64, PartConsumption>,
    answers: HashMap<u64, ChecklistAnswer>,

    sequences: IdSequences,
}

impl MaintenanceStore {
    /// 創建空的存放層
    pub fn new() -> Self {
        Self::default()
    }

    // ========== 設備階層 ==========

    pub fn insert_company(&mut self, mut company: Company) -> u64 {
        company.id = bump(&mut self.sequences.company);
        let id = company.id;
        self.companies.insert(id, company);
        id
    }

    pub fn insert_plant(&mut self, mut plant: Plant) -> u64 {
        plant.id = bump(&mut self.sequences.plant);
        let id = plant.id;
        self.plants.insert(id, plant);
        id
    }

    pub fn insert_zone(&mut self, mut zone: Zone) -> u64 {
        zone.id = bump(&mut self.sequences.zone);
        let id = zone.id;
        self.zones.insert(id, zone);
        id
    }

    pub fn insert_line(&mut self, mut line: Line) -> u64 {
        line.id = bump(&mut self.sequences.line);
        let id = line.id;
        self.lines.insert(id, line);
        id
    }

    pub fn insert_machine(&mut self, mut machine: Machine) -> u64 {
        machine.id = bump(&mut self.sequences.machine);
        let id = machine.id;
        self.machines.insert(id, machine);
        id
    }

    pub fn insert_element(&mut self, mut element: Element) -> u64 {
        element.id = bump(&mut self.sequences.element);
        let id = element.id;
        self.elements.insert(id, element);
        id
    }

    pub fn machine(&self, id: u64) -> Option<&Machine> {
        self.machines.get(&id)
    }

    pub fn machine_mut(&mut self, id: u64) -> Option<&mut Machine> {
        self.machines.get_mut(&id)
    }

    pub fn machines(&self) -> impl Iterator<Item = &Machine> {
        self.machines.values()
    }

    /// 解析設備引用為名稱與代碼；節點不存在時為 None
    pub fn resolve_equipment(&self, equipment: EquipmentRef) -> Option<EquipmentInfo> {
        let (name, code) = match equipment.kind {
            EquipmentKind::Company => {
                let n = self.companies.get(&equipment.id)?;
                (n.name.clone(), n.code.clone())
            }
            EquipmentKind::Plant => {
                let n = self.plants.get(&equipment.id)?;
                (n.name.clone(), n.code.clone())
            }
            EquipmentKind::Zone => {
                let n = self.zones.get(&equipment.id)?;
                (n.name.clone(), n.code.clone())
            }
            EquipmentKind::Line => {
                let n = self.lines.get(&equipment.id)?;
                (n.name.clone(), n.code.clone())
            }
            EquipmentKind::Machine => {
                let n = self.machines.get(&equipment.id)?;
                (n.name.clone(), n.code.clone())
            }
            EquipmentKind::Element => {
                let n = self.elements.get(&equipment.id)?;
                (n.name.clone(), n.code.clone())
            }
        };
        Some(EquipmentInfo { name, code })
    }

    /// 設備的完整階層路徑（祖先代碼以 " > " 串接）
    pub fn equipment_path(&self, equipment: EquipmentRef) -> String {
        let mut codes: Vec<String> = Vec::new();
        let mut machine_id = None;
        let mut line_id = None;
        let mut zone_id = None;
        let mut plant_id = None;
        let mut company_id = None;

        match equipment.kind {
            EquipmentKind::Element => {
                if let Some(e) = self.elements.get(&equipment.id) {
                    codes.push(e.code.clone());
                    machine_id = Some(e.machine_id);
                }
            }
            EquipmentKind::Machine => machine_id = Some(equipment.id),
            EquipmentKind::Line => line_id = Some(equipment.id),
            EquipmentKind::Zone => zone_id = Some(equipment.id),
            EquipmentKind::Plant => plant_id = Some(equipment.id),
            EquipmentKind::Company => company_id = Some(equipment.id),
        }

        if let Some(id) = machine_id {
            if let Some(m) = self.machines.get(&id) {
                codes.insert(0, m.code.clone());
                line_id = Some(m.line_id);
            }
        }
        if let Some(id) = line_id {
            if let Some(l) = self.lines.get(&id) {
                codes.insert(0, l.code.clone());
                zone_id = Some(l.zone_id);
            }
        }
        if let Some(id) = zone_id {
            if let Some(z) = self.zones.get(&id) {
                codes.insert(0, z.code.clone());
                plant_id = Some(z.plant_id);
            }
        }
        if let Some(id) = plant_id {
            if let Some(p) = self.plants.get(&id) {
                codes.insert(0, p.code.clone());
                company_id = Some(p.company_id);
            }
        }
        if let Some(id) = company_id {
            if let Some(c) = self.companies.get(&id) {
                codes.insert(0, c.code.clone());
            }
        }

        codes.join(" > ")
    }

    // ========== 備件與庫存異動 ==========

    pub fn insert_part(&mut self, mut part: SparePart) -> u64 {
        part.id = bump(&mut self.sequences.part);
        let id = part.id;
        self.parts.insert(id, part);
        id
    }

    pub fn part(&self, id: u64) -> Option<&SparePart> {
        self.parts.get(&id)
    }

    pub fn part_mut(&mut self, id: u64) -> Option<&mut SparePart> {
        self.parts.get_mut(&id)
    }

    pub fn parts(&self) -> impl Iterator<Item = &SparePart> {
        self.parts.values()
    }

    pub fn record_movement(&mut self, mut movement: StockMovement) -> u64 {
        movement.id = bump(&mut self.sequences.movement);
        let id = movement.id;
        self.movements.push(movement);
        id
    }

    pub fn movements_for_part(&self, part_id: u64) -> Vec<&StockMovement> {
        self.movements.iter().filter(|m| m.part_id == part_id).collect()
    }

    // ========== 保養範本與指派 ==========

    /// 寫入範本；範本本體與其工作項目、備件、檢查項目一併配號
    pub fn insert_routine(&mut self, mut routine: MaintenanceRoutine) -> u64 {
        routine.id = bump(&mut self.sequences.routine);
        for task in &mut routine.tasks {
            task.id = bump(&mut self.sequences.routine_item);
        }
        for part in &mut routine.required_parts {
            part.id = bump(&mut self.sequences.routine_item);
        }
        for item in &mut routine.checklist {
            item.id = bump(&mut self.sequences.routine_item);
        }
        let id = routine.id;
        self.routines.insert(id, routine);
        id
    }

    pub fn routine(&self, id: u64) -> Option<&MaintenanceRoutine> {
        self.routines.get(&id)
    }

    pub fn routines(&self) -> impl Iterator<Item = &MaintenanceRoutine> {
        self.routines.values()
    }

    pub fn routine_codes(&self) -> impl Iterator<Item = &str> {
        self.routines.values().map(|r| r.code.as_str())
    }

    /// 以檢查項目ID反查項目定義
    pub fn checklist_item(&self, item_id: u64) -> Option<&ChecklistItem> {
        self.routines
            .values()
            .flat_map(|r| r.checklist.iter())
            .find(|item| item.id == item_id)
    }

    pub fn insert_assignment(&mut self, mut assignment: RoutineAssignment) -> u64 {
        assignment.id = bump(&mut self.sequences.assignment);
        let id = assignment.id;
        self.assignments.insert(id, assignment);
        id
    }

    pub fn assignment(&self, id: u64) -> Option<&RoutineAssignment> {
        self.assignments.get(&id)
    }

    pub fn assignment_mut(&mut self, id: u64) -> Option<&mut RoutineAssignment> {
        self.assignments.get_mut(&id)
    }

    pub fn assignments(&self) -> impl Iterator<Item = &RoutineAssignment> {
        self.assignments.values()
    }

    // ========== 工單類別目錄 ==========

    pub fn upsert_intervention_type(&mut self, kind: InterventionType) {
        self.intervention_types.insert(kind.code.clone(), kind);
    }

    pub fn intervention_type(&self, code: &str) -> Option<&InterventionType> {
        self.intervention_types.get(code)
    }

    /// 目錄內容（依列表排序欄位）
    pub fn intervention_types(&self) -> Vec<&InterventionType> {
        let mut kinds: Vec<&InterventionType> = self.intervention_types.values().collect();
        kinds.sort_by_key(|k| k.position);
        kinds
    }

    // ========== 工單 ==========

    pub fn insert_order(&mut self, mut order: WorkOrder) -> u64 {
        order.id = bump(&mut self.sequences.order);
        let id = order.id;
        self.orders.insert(id, order);
        id
    }

    pub fn order(&self, id: u64) -> Option<&WorkOrder> {
        self.orders.get(&id)
    }

    pub fn order_mut(&mut self, id: u64) -> Option<&mut WorkOrder> {
        self.orders.get_mut(&id)
    }

    pub fn orders(&self) -> impl Iterator<Item = &WorkOrder> {
        self.orders.values()
    }

    pub fn order_numbers(&self) -> impl Iterator<Item = &str> {
        self.orders.values().map(|o| o.number.as_str())
    }

    /// 檢查是否已有較新的同範本、同設備預防工單（再生防重入護欄）
    pub fn has_newer_preventive(
        &self,
        routine_id: Option<u64>,
        equipment: EquipmentRef,
        after_id: u64,
    ) -> bool {
        self.orders.values().any(|o| {
            o.kind == KIND_PREVENTIVE
                && o.routine_id == routine_id
                && o.equipment == equipment
                && o.id > after_id
        })
    }

    /// 檢查是否已存在同標題、同設備且問題描述帶指定前綴的工單
    /// （檢查表衍生工單的防重護欄）
    pub fn order_exists_with_tag(
        &self,
        title: &str,
        equipment: EquipmentRef,
        problem_prefix: &str,
    ) -> bool {
        self.orders.values().any(|o| {
            o.title == title && o.equipment == equipment && o.problem.starts_with(problem_prefix)
        })
    }

    /// 刪除工單並連帶刪除其工時紀錄、備件耗用、檢查回覆
    pub fn delete_order_cascade(&mut self, order_id: u64) -> Result<WorkOrder> {
        let order = self
            .orders
            .remove(&order_id)
            .ok_or_else(|| CmmsError::NotFound(format!("工單不存在: {order_id}")))?;
        self.sessions.retain(|_, s| s.order_id != order_id);
        self.consumptions.retain(|_, c| c.order_id != order_id);
        self.answers.retain(|_, a| a.order_id != order_id);
        Ok(order)
    }

    // ========== 工時紀錄 ==========

    pub fn insert_session(&mut self, mut session: TimeSession) -> u64 {
        session.id = bump(&mut self.sequences.session);
        let id = session.id;
        self.sessions.insert(id, session);
        id
    }

    pub fn session(&self, id: u64) -> Option<&TimeSession> {
        self.sessions.get(&id)
    }

    pub fn session_mut(&mut self, id: u64) -> Option<&mut TimeSession> {
        self.sessions.get_mut(&id)
    }

    pub fn sessions_for_order(&self, order_id: u64) -> Vec<&TimeSession> {
        let mut sessions: Vec<&TimeSession> = self
            .sessions
            .values()
            .filter(|s| s.order_id == order_id)
            .collect();
        sessions.sort_by_key(|s| s.started_at);
        sessions
    }

    /// 某工單所有未結束紀錄的ID
    pub fn open_session_ids(&self, order_id: u64) -> Vec<u64> {
        self.sessions
            .values()
            .filter(|s| s.order_id == order_id && s.open)
            .map(|s| s.id)
            .collect()
    }

    /// 某技師在某工單上的未結束紀錄
    pub fn open_session_id(&self, order_id: u64, technician: &str) -> Option<u64> {
        self.sessions
            .values()
            .find(|s| s.order_id == order_id && s.open && s.technician == technician)
            .map(|s| s.id)
    }

    /// 某工單所有已結束紀錄的工時合計（小時，四捨五入到 2 位）
    pub fn finished_hours_total(&self, order_id: u64) -> Decimal {
        let seconds: i64 = self
            .sessions
            .values()
            .filter(|s| s.order_id == order_id)
            .filter_map(|s| s.finished_at.map(|end| (end - s.started_at).num_seconds()))
            .sum();
        (Decimal::from(seconds) / Decimal::from(3600)).round_dp(2)
    }

    // ========== 備件耗用 ==========

    pub fn insert_consumption(&mut self, mut consumption: PartConsumption) -> u64 {
        consumption.id = bump(&mut self.sequences.consumption);
        let id = consumption.id;
        self.consumptions.insert(id, consumption);
        id
    }

    pub fn consumptions_for_order(&self, order_id: u64) -> Vec<&PartConsumption> {
        let mut rows: Vec<&PartConsumption> = self
            .consumptions
            .values()
            .filter(|c| c.order_id == order_id)
            .collect();
        rows.sort_by_key(|c| c.id);
        rows
    }

    // ========== 檢查回覆 ==========

    pub fn insert_answer(&mut self, mut answer: ChecklistAnswer) -> u64 {
        answer.id = bump(&mut self.sequences.answer);
        let id = answer.id;
        self.answers.insert(id, answer);
        id
    }

    pub fn answers_for_order(&self, order_id: u64) -> Vec<&ChecklistAnswer> {
        let mut rows: Vec<&ChecklistAnswer> = self
            .answers
            .values()
            .filter(|a| a.order_id == order_id)
            .collect();
        rows.sort_by_key(|a| a.id);
        rows
    }

    /// 整批刪除某工單的檢查回覆，回傳刪除筆數
    pub fn delete_answers_for_order(&mut self, order_id: u64) -> usize {
        let before = self.answers.len();
        self.answers.retain(|_, a| a.order_id != order_id);
        before - self.answers.len()
    }
}
