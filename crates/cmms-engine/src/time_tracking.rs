//! 工時操作（開始 / 暫停）
//!
//! 同一 (工單, 技師) 只允許一筆進行中的紀錄；
//! 不同技師可同時在同一張工單上計時。

use chrono::NaiveDateTime;

use cmms_core::{CmmsError, Result, TimeSession, WorkOrderStatus};
use cmms_store::MaintenanceStore;

use crate::{PausedWork, StartedWork};

/// 工時追蹤服務
pub struct SessionTracker;

impl SessionTracker {
    /// 技師開始工作
    ///
    /// 工單仍在待處理 / 已指派狀態時順勢進入進行中；
    /// 未指派技師的工單由開工的技師接手。
    pub fn start_work(
        store: &mut MaintenanceStore,
        order_id: u64,
        technician: &str,
        now: NaiveDateTime,
    ) -> Result<StartedWork> {
        if store.order(order_id).is_none() {
            return Err(CmmsError::NotFound(format!("工單不存在: {order_id}")));
        }
        if store.open_session_id(order_id, technician).is_some() {
            return Err(CmmsError::Conflict(format!(
                "{technician} 在此工單已有進行中的工時紀錄"
            )));
        }

        let session_id =
            store.insert_session(TimeSession::new(order_id, technician.to_string(), now));

        let mut promoted = false;
        if let Some(order) = store.order_mut(order_id) {
            if matches!(
                order.status,
                WorkOrderStatus::Pending | WorkOrderStatus::Assigned
            ) {
                order.status = WorkOrderStatus::InProgress;
                if order.started_at.is_none() {
                    order.started_at = Some(now);
                }
                promoted = true;
            }
            if !order.has_technician() {
                order.technician = Some(technician.to_string());
            }
            tracing::debug!("工單 {} 由 {technician} 開始工作", order.number);
        }

        Ok(StartedWork {
            session_id,
            promoted,
        })
    }

    /// 技師暫停工作
    ///
    /// 結束紀錄後以所有已結束紀錄重算工單實際工時。
    pub fn pause_work(
        store: &mut MaintenanceStore,
        order_id: u64,
        technician: &str,
        now: NaiveDateTime,
    ) -> Result<PausedWork> {
        if store.order(order_id).is_none() {
            return Err(CmmsError::NotFound(format!("工單不存在: {order_id}")));
        }
        let session_id = store
            .open_session_id(order_id, technician)
            .ok_or_else(|| {
                CmmsError::NotFound(format!("{technician} 在此工單沒有進行中的工時紀錄"))
            })?;

        let session_hours = {
            let session = store
                .session_mut(session_id)
                .ok_or_else(|| CmmsError::NotFound(format!("工時紀錄不存在: {session_id}")))?;
            session.finished_at = Some(now);
            session.open = false;
            session.duration_hours(now).round_dp(2)
        };

        let total_hours = store.finished_hours_total(order_id);
        if let Some(order) = store.order_mut(order_id) {
            order.actual_hours = Some(total_hours);
            tracing::debug!(
                "工單 {} 由 {technician} 暫停工作，累計工時 {total_hours}h",
                order.number
            );
        }

        Ok(PausedWork {
            session_hours,
            total_hours,
        })
    }
}
