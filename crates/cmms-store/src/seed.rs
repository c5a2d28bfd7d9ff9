//! 部署初始化
//!
//! 預設資料由部署工具在上線前呼叫一次寫入，
//! 不在請求處理路徑上做隱式初始化。

use cmms_core::InterventionType;

use crate::store::MaintenanceStore;

/// 寫入預設工單類別目錄；已存在的代碼不覆寫（可重複執行）
pub fn seed_defaults(store: &mut MaintenanceStore) {
    let defaults = [
        InterventionType::new(
            "corrective".to_string(),
            "Corrective".to_string(),
            "fa-wrench".to_string(),
            1,
        )
        .with_color("#d32f2f".to_string()),
        InterventionType::new(
            "preventive".to_string(),
            "Preventive".to_string(),
            "fa-calendar-check".to_string(),
            2,
        ),
        InterventionType::new(
            "regulatory".to_string(),
            "Regulatory inspection".to_string(),
            "fa-clipboard-check".to_string(),
            3,
        )
        .with_color("#7b1fa2".to_string()),
        InterventionType::new(
            "improvement".to_string(),
            "Improvement".to_string(),
            "fa-arrow-trend-up".to_string(),
            4,
        )
        .with_color("#388e3c".to_string()),
    ];

    for kind in defaults {
        if store.intervention_type(&kind.code).is_none() {
            store.upsert_intervention_type(kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_repeatable() {
        let mut store = MaintenanceStore::new();

        seed_defaults(&mut store);
        assert_eq!(store.intervention_types().len(), 4);

        // 自訂顏色不會被第二次執行覆寫
        let mut custom = store.intervention_type("corrective").unwrap().clone();
        custom.color = "#000000".to_string();
        store.upsert_intervention_type(custom);

        seed_defaults(&mut store);
        assert_eq!(store.intervention_types().len(), 4);
        assert_eq!(store.intervention_type("corrective").unwrap().color, "#000000");
    }
}
