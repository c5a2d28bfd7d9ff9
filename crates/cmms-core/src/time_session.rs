//! 工時紀錄模型

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 一位技師在一張工單上的連續工作區段
///
/// 同一 (工單, 技師) 同時間最多只能有一筆未結束的紀錄。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSession {
    /// 紀錄ID
    pub id: u64,

    /// 工單ID
    pub order_id: u64,

    /// 技師姓名
    pub technician: String,

    /// 開始時間
    pub started_at: NaiveDateTime,

    /// 結束時間（進行中為 None）
    pub finished_at: Option<NaiveDateTime>,

    /// 是否進行中
    pub open: bool,
}

impl TimeSession {
    /// 創建新的工時紀錄（進行中）
    pub fn new(order_id: u64, technician: String, started_at: NaiveDateTime) -> Self {
        Self {
            id: 0,
            order_id,
            technician,
            started_at,
            finished_at: None,
            open: true,
        }
    }

    /// 區段時長（小時）；進行中的紀錄以 `now` 計
    pub fn duration_hours(&self, now: NaiveDateTime) -> Decimal {
        let end = self.finished_at.unwrap_or(now);
        let seconds = (end - self.started_at).num_seconds();
        Decimal::from(seconds) / Decimal::from(3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_duration_hours() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut session = TimeSession::new(1, "J. Garcia".to_string(), start);

        // 進行中：以 now 計算
        let now = start + chrono::Duration::minutes(90);
        assert_eq!(session.duration_hours(now), Decimal::new(15, 1));

        // 已結束：以結束時間計算，now 不影響
        session.finished_at = Some(start + chrono::Duration::hours(2));
        session.open = false;
        let later = start + chrono::Duration::hours(10);
        assert_eq!(session.duration_hours(later), Decimal::from(2));
    }
}
