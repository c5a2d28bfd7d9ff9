//! 預防工單再生
//!
//! 預防工單進入 partially_closed 時同步觸發一次。週期規則與
//! 範本引用都存在工單本身，再生不依賴指派資料仍存在。

use chrono::NaiveDateTime;

use cmms_core::{CmmsError, Result, WorkOrder, KIND_PREVENTIVE};
use cmms_store::MaintenanceStore;

use crate::numbering::OrderNumberGenerator;

/// 預防工單再生器
pub struct RecurrenceGenerator;

impl RecurrenceGenerator {
    /// 產生下一張預防工單，回傳新工單號碼
    ///
    /// 失敗只記錄不外拋：結案本身不可被「排不出下一張」擋下。
    pub fn generate_next(
        store: &mut MaintenanceStore,
        order_id: u64,
        now: NaiveDateTime,
    ) -> Option<String> {
        match Self::try_generate(store, order_id, now) {
            Ok(number) => number,
            Err(err) => {
                tracing::error!("工單 {order_id} 產生下一張預防工單失敗: {err}");
                None
            }
        }
    }

    fn try_generate(
        store: &mut MaintenanceStore,
        order_id: u64,
        now: NaiveDateTime,
    ) -> Result<Option<String>> {
        let source = store
            .order(order_id)
            .ok_or_else(|| CmmsError::NotFound(format!("工單不存在: {order_id}")))?
            .clone();

        // 無週期設定：到此為止，不再生
        let recurrence = match source.recurrence {
            Some(r) if r.every > 0 => r,
            _ => return Ok(None),
        };

        // 防重入護欄：已有較新的同範本、同設備預防工單就不再生。
        // 查詢後寫入並非比對交換，同一變更被並發重入時仍可能重複，
        // 以每操作獨占存放層為前提。
        if store.has_newer_preventive(source.routine_id, source.equipment, source.id) {
            return Ok(None);
        }

        let closing_date = source.finished_at.unwrap_or(now).date();
        let next_date = recurrence.next_date(closing_date);
        let scheduled = next_date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| CmmsError::InvalidDate(next_date.to_string()))?;

        let number = OrderNumberGenerator::next(store, now.date());
        let mut next = WorkOrder::new(
            number.clone(),
            KIND_PREVENTIVE.to_string(),
            source.title.clone(),
            source.equipment,
            now,
        )
        .with_priority(source.priority)
        .with_problem(source.problem.clone())
        .with_scheduled_for(scheduled)
        .with_created_by("system (auto)".to_string())
        .with_routine(source.routine_id, Some(recurrence));
        if let Some(hours) = source.estimated_hours {
            next = next.with_estimated_hours(hours);
        }
        store.insert_order(next);

        tracing::info!(
            "工單 {} 自動產生下一張預防工單 {number}，排定 {next_date}",
            source.number
        );
        Ok(Some(number))
    }
}
