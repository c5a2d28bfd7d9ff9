//! 單據編號
//!
//! 工單號與範本代碼都以「掃描現有最大號 + 1」配號，
//! 唯一性依賴每個操作獨占存放層的前提。

use chrono::NaiveDate;

use cmms_core::RoutineKind;
use cmms_store::MaintenanceStore;

/// 工單號產生器
pub struct OrderNumberGenerator;

impl OrderNumberGenerator {
    /// 產生下一個工單號，格式 YYNNNNN
    ///
    /// 2 位年份前綴 + 5 位流水號，流水號每年歸零重計；
    /// 最大號尾碼無法解析時從 1 重新起算。
    pub fn next(store: &MaintenanceStore, today: NaiveDate) -> String {
        let prefix = today.format("%y").to_string();

        let sequence = store
            .order_numbers()
            .filter(|n| n.starts_with(prefix.as_str()))
            .max()
            .map(|last| {
                last.get(2..)
                    .and_then(|tail| tail.parse::<u32>().ok())
                    .map(|seq| seq + 1)
                    .unwrap_or(1)
            })
            .unwrap_or(1);

        format!("{prefix}{sequence:05}")
    }
}

/// 保養範本代碼產生器
pub struct RoutineCodeGenerator;

impl RoutineCodeGenerator {
    /// 產生下一個範本代碼：預防保養 PR-NNNN、法規檢驗 TL-NNNN
    pub fn next(store: &MaintenanceStore, kind: RoutineKind) -> String {
        let prefix = match kind {
            RoutineKind::Preventive => "PR-",
            RoutineKind::Regulatory => "TL-",
        };

        let sequence = store
            .routine_codes()
            .filter(|c| c.starts_with(prefix))
            .max()
            .map(|last| {
                last.split('-')
                    .nth(1)
                    .and_then(|tail| tail.parse::<u32>().ok())
                    .map(|seq| seq + 1)
                    .unwrap_or(1)
            })
            .unwrap_or(1);

        format!("{prefix}{sequence:04}")
    }
}
