//! 檢查表回覆與衍生工單
//!
//! 回覆整批覆寫；NOK 且設定自動衍生的項目在預防工單
//! partially_closed 時各產生一張故障維修工單。

use chrono::NaiveDateTime;

use cmms_core::{
    ChecklistAnswer, ChecklistItem, CmmsError, Priority, Result, WorkOrder, KIND_CORRECTIVE,
};
use cmms_store::MaintenanceStore;

use crate::numbering::OrderNumberGenerator;

/// 檢查表回覆輸入
#[derive(Debug, Clone)]
pub struct AnswerInput {
    /// 檢查項目ID
    pub item_id: u64,

    /// 回覆值（`ok`、`nok` 或量測值）
    pub response: String,

    /// 觀察備註
    pub observations: Option<String>,
}

/// 檢查表服務
pub struct ChecklistService;

impl ChecklistService {
    /// 提交一張工單的檢查回覆（整批刪除重建）
    pub fn submit_answers(
        store: &mut MaintenanceStore,
        order_id: u64,
        answers: Vec<AnswerInput>,
        now: NaiveDateTime,
    ) -> Result<usize> {
        if store.order(order_id).is_none() {
            return Err(CmmsError::NotFound(format!("工單不存在: {order_id}")));
        }

        store.delete_answers_for_order(order_id);
        let count = answers.len();
        for input in answers {
            let mut answer = ChecklistAnswer::new(order_id, input.item_id, input.response, now);
            if let Some(observations) = input.observations {
                answer = answer.with_observations(observations);
            }
            store.insert_answer(answer);
        }
        Ok(count)
    }

    /// 為 NOK 回覆衍生故障維修工單，回傳新工單號碼清單
    ///
    /// 單一項目失敗只記錄並跳過，已產生的工單不回滾。
    pub fn spawn_correctives(
        store: &mut MaintenanceStore,
        order_id: u64,
        now: NaiveDateTime,
    ) -> Vec<String> {
        let source = match store.order(order_id) {
            Some(order) => order.clone(),
            None => return Vec::new(),
        };
        let answers: Vec<ChecklistAnswer> = store
            .answers_for_order(order_id)
            .into_iter()
            .cloned()
            .collect();

        let mut numbers = Vec::new();
        for answer in answers {
            if !answer.is_nok() {
                continue;
            }
            let item = match store.checklist_item(answer.item_id) {
                Some(item) => item.clone(),
                None => continue,
            };
            if !item.generates_corrective {
                continue;
            }

            match Self::spawn_one(store, &source, &item, &answer, now) {
                Ok(Some(number)) => numbers.push(number),
                Ok(None) => {} // 已衍生過，跳過
                Err(err) => {
                    tracing::error!(
                        "工單 {} 檢查項目 {} 衍生故障維修工單失敗: {err}",
                        source.number,
                        item.id
                    );
                }
            }
        }
        numbers
    }

    fn spawn_one(
        store: &mut MaintenanceStore,
        source: &WorkOrder,
        item: &ChecklistItem,
        answer: &ChecklistAnswer,
        now: NaiveDateTime,
    ) -> Result<Option<String>> {
        let title = format!("Corrective: {}", item.description);
        let tag = format!("[Preventive {}]", source.number);

        // 防重護欄：同標題、同設備且問題描述帶本工單標記者視為已衍生
        if store.order_exists_with_tag(&title, source.equipment, &tag) {
            return Ok(None);
        }

        let mut problem = format!(
            "[Preventive {}] Checklist NOK: {}",
            source.number, item.description
        );
        if let Some(observations) = answer.observations.as_deref().filter(|o| !o.is_empty()) {
            problem.push_str(&format!(". Observation: {observations}"));
        }

        let number = OrderNumberGenerator::next(store, now.date());
        let order = WorkOrder::new(
            number.clone(),
            KIND_CORRECTIVE.to_string(),
            title,
            source.equipment,
            now,
        )
        .with_priority(Priority::Medium)
        .with_problem(problem)
        .with_created_by(format!("system (checklist {})", source.number));
        store.insert_order(order);

        tracing::info!(
            "工單 {} 檢查項目 NOK，衍生故障維修工單 {number}",
            source.number
        );
        Ok(Some(number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cmms_core::{
        EquipmentKind, EquipmentRef, MaintenanceRoutine, RoutineKind, WorkOrderStatus,
        KIND_PREVENTIVE, RESPONSE_NOK, RESPONSE_OK,
    };

    fn at_nine() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    /// 建立一個帶兩個檢查項目的範本與引用它的預防工單，
    /// 回傳 (工單ID, 會衍生的項目ID, 不會衍生的項目ID)
    fn fixture(store: &mut MaintenanceStore) -> (u64, u64, u64) {
        let routine = MaintenanceRoutine::new(
            "PR-0001".to_string(),
            "Belt check".to_string(),
            RoutineKind::Preventive,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
        .with_checklist_item(ChecklistItem::new("Belt tension".to_string(), 1))
        .with_checklist_item(
            ChecklistItem::new("Guard paint".to_string(), 2).with_generates_corrective(false),
        );
        let routine_id = store.insert_routine(routine);
        let items: Vec<u64> = store
            .routine(routine_id)
            .unwrap()
            .checklist
            .iter()
            .map(|i| i.id)
            .collect();

        let order = WorkOrder::new(
            "2500001".to_string(),
            KIND_PREVENTIVE.to_string(),
            "Belt check".to_string(),
            EquipmentRef::new(EquipmentKind::Machine, 5),
            at_nine(),
        )
        .with_routine(Some(routine_id), None);
        let order_id = store.insert_order(order);
        (order_id, items[0], items[1])
    }

    #[test]
    fn test_submit_replaces_previous_answers() {
        let mut store = MaintenanceStore::new();
        let (order_id, item_a, item_b) = fixture(&mut store);

        ChecklistService::submit_answers(
            &mut store,
            order_id,
            vec![AnswerInput {
                item_id: item_a,
                response: RESPONSE_OK.to_string(),
                observations: None,
            }],
            at_nine(),
        )
        .unwrap();
        assert_eq!(store.answers_for_order(order_id).len(), 1);

        // 重新提交：舊回覆整批刪除
        ChecklistService::submit_answers(
            &mut store,
            order_id,
            vec![
                AnswerInput {
                    item_id: item_a,
                    response: RESPONSE_NOK.to_string(),
                    observations: Some("Frayed edge".to_string()),
                },
                AnswerInput {
                    item_id: item_b,
                    response: RESPONSE_NOK.to_string(),
                    observations: None,
                },
            ],
            at_nine(),
        )
        .unwrap();
        let answers = store.answers_for_order(order_id);
        assert_eq!(answers.len(), 2);
        assert!(answers.iter().all(|a| a.is_nok()));
    }

    #[test]
    fn test_spawn_only_flagged_items() {
        let mut store = MaintenanceStore::new();
        let (order_id, item_a, item_b) = fixture(&mut store);

        ChecklistService::submit_answers(
            &mut store,
            order_id,
            vec![
                AnswerInput {
                    item_id: item_a,
                    response: RESPONSE_NOK.to_string(),
                    observations: Some("Frayed edge".to_string()),
                },
                // generates_corrective=false：NOK 也不衍生
                AnswerInput {
                    item_id: item_b,
                    response: RESPONSE_NOK.to_string(),
                    observations: None,
                },
            ],
            at_nine(),
        )
        .unwrap();

        let numbers = ChecklistService::spawn_correctives(&mut store, order_id, at_nine());
        assert_eq!(numbers.len(), 1);

        let spawned = store.orders().find(|o| o.number == numbers[0]).unwrap();
        assert_eq!(spawned.title, "Corrective: Belt tension");
        assert_eq!(spawned.kind, KIND_CORRECTIVE);
        assert_eq!(spawned.status, WorkOrderStatus::Pending);
        assert_eq!(
            spawned.problem,
            "[Preventive 2500001] Checklist NOK: Belt tension. Observation: Frayed edge"
        );
        assert_eq!(spawned.created_by, "system (checklist 2500001)");
    }

    #[test]
    fn test_spawn_is_guarded_against_duplicates() {
        let mut store = MaintenanceStore::new();
        let (order_id, item_a, _) = fixture(&mut store);

        ChecklistService::submit_answers(
            &mut store,
            order_id,
            vec![AnswerInput {
                item_id: item_a,
                response: RESPONSE_NOK.to_string(),
                observations: None,
            }],
            at_nine(),
        )
        .unwrap();

        let first = ChecklistService::spawn_correctives(&mut store, order_id, at_nine());
        assert_eq!(first.len(), 1);

        // 再次觸發：防重護欄找到既有的衍生工單
        let second = ChecklistService::spawn_correctives(&mut store, order_id, at_nine());
        assert!(second.is_empty());
        assert_eq!(store.orders().count(), 2);
    }

    #[test]
    fn test_ok_answers_spawn_nothing() {
        let mut store = MaintenanceStore::new();
        let (order_id, item_a, _) = fixture(&mut store);

        ChecklistService::submit_answers(
            &mut store,
            order_id,
            vec![AnswerInput {
                item_id: item_a,
                response: RESPONSE_OK.to_string(),
                observations: None,
            }],
            at_nine(),
        )
        .unwrap();

        assert!(ChecklistService::spawn_correctives(&mut store, order_id, at_nine()).is_empty());
    }
}
