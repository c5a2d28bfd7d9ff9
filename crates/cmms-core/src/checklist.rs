//! 檢查項目回覆模型

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// OK 回覆值
pub const RESPONSE_OK: &str = "ok";
/// NOK 回覆值
pub const RESPONSE_NOK: &str = "nok";

/// 一張工單上對一個檢查項目的回覆
///
/// 回覆值為 `ok`、`nok` 或自由填寫的量測值；
/// 重新提交檢查表時整批刪除重建。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistAnswer {
    /// 回覆ID
    pub id: u64,

    /// 工單ID
    pub order_id: u64,

    /// 檢查項目ID
    pub item_id: u64,

    /// 回覆值
    pub response: String,

    /// 觀察備註
    pub observations: Option<String>,

    /// 回覆時間
    pub recorded_at: NaiveDateTime,
}

impl ChecklistAnswer {
    pub fn new(order_id: u64, item_id: u64, response: String, recorded_at: NaiveDateTime) -> Self {
        Self {
            id: 0,
            order_id,
            item_id,
            response,
            observations: None,
            recorded_at,
        }
    }

    /// 建構器模式：設置觀察備註
    pub fn with_observations(mut self, observations: String) -> Self {
        self.observations = Some(observations);
        self
    }

    /// 檢查是否為 NOK 回覆
    pub fn is_nok(&self) -> bool {
        self.response == RESPONSE_NOK
    }
}
