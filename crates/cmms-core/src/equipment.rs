//! 設備階層模型
//!
//! 六層固定階層：公司 → 廠區 → 區域 → 產線 → 機台 → 組件。
//! 工單以 (層級, id) 標記引用任一節點，讀取時才解析名稱與路徑。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 設備層級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentKind {
    /// 公司
    Company,
    /// 廠區
    Plant,
    /// 區域
    Zone,
    /// 產線
    Line,
    /// 機台
    Machine,
    /// 組件
    Element,
}

impl EquipmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentKind::Company => "company",
            EquipmentKind::Plant => "plant",
            EquipmentKind::Zone => "zone",
            EquipmentKind::Line => "line",
            EquipmentKind::Machine => "machine",
            EquipmentKind::Element => "element",
        }
    }
}

/// 設備引用（標記式引用，非外鍵）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EquipmentRef {
    /// 設備層級
    pub kind: EquipmentKind,

    /// 節點ID
    pub id: u64,
}

impl EquipmentRef {
    pub fn new(kind: EquipmentKind, id: u64) -> Self {
        Self { kind, id }
    }

    /// 檢查是否引用機台層級
    pub fn is_machine(&self) -> bool {
        self.kind == EquipmentKind::Machine
    }
}

/// 設備解析結果（名稱與代碼）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentInfo {
    /// 節點名稱
    pub name: String,

    /// 節點代碼
    pub code: String,
}

/// 機台關鍵性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criticality {
    /// 高
    High,
    /// 中
    Medium,
    /// 低
    Low,
}

impl Default for Criticality {
    fn default() -> Self {
        Criticality::Medium
    }
}

/// 機台狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineStatus {
    /// 運轉中
    Operational,
    /// 故障
    Broken,
    /// 保養中
    Maintenance,
}

/// 公司（階層最上層）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
}

impl Company {
    pub fn new(code: String, name: String) -> Self {
        Self {
            id: 0,
            code,
            name,
            description: None,
            address: None,
        }
    }
}

/// 廠區，隸屬於一間公司
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    pub id: u64,
    pub company_id: u64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

impl Plant {
    pub fn new(company_id: u64, code: String, name: String) -> Self {
        Self {
            id: 0,
            company_id,
            code,
            name,
            description: None,
        }
    }
}

/// 區域，隸屬於一個廠區
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: u64,
    pub plant_id: u64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

impl Zone {
    pub fn new(plant_id: u64, code: String, name: String) -> Self {
        Self {
            id: 0,
            plant_id,
            code,
            name,
            description: None,
        }
    }
}

/// 產線，隸屬於一個區域
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub id: u64,
    pub zone_id: u64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

impl Line {
    pub fn new(zone_id: u64, code: String, name: String) -> Self {
        Self {
            id: 0,
            zone_id,
            code,
            name,
            description: None,
        }
    }
}

/// 機台，隸屬於一條產線
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub id: u64,
    pub line_id: u64,
    pub code: String,
    pub name: String,

    /// 型號
    pub model: Option<String>,

    /// 製造商
    pub manufacturer: Option<String>,

    /// 序號
    pub serial_number: Option<String>,

    /// 關鍵性
    pub criticality: Criticality,

    /// 機台狀態
    pub status: MachineStatus,

    /// 累計運轉時數
    pub operating_hours: u32,

    /// 重置價值（RAV）
    pub replacement_value: Decimal,
}

impl Machine {
    pub fn new(line_id: u64, code: String, name: String) -> Self {
        Self {
            id: 0,
            line_id,
            code,
            name,
            model: None,
            manufacturer: None,
            serial_number: None,
            criticality: Criticality::default(),
            status: MachineStatus::Operational,
            operating_hours: 0,
            replacement_value: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置關鍵性
    pub fn with_criticality(mut self, criticality: Criticality) -> Self {
        self.criticality = criticality;
        self
    }

    /// 建構器模式：設置型號
    pub fn with_model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }

    /// 檢查機台是否可運轉
    pub fn is_operational(&self) -> bool {
        self.status == MachineStatus::Operational
    }
}

/// 組件，隸屬於一台機台
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    pub id: u64,
    pub machine_id: u64,
    pub code: String,
    pub name: String,

    /// 組件種類（自由文字）
    pub element_kind: Option<String>,

    /// 重置價值（RAV）
    pub replacement_value: Decimal,
}

impl Element {
    pub fn new(machine_id: u64, code: String, name: String) -> Self {
        Self {
            id: 0,
            machine_id,
            code,
            name,
            element_kind: None,
            replacement_value: Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equipment_ref() {
        let eq = EquipmentRef::new(EquipmentKind::Machine, 7);
        assert!(eq.is_machine());
        assert_eq!(eq.kind.as_str(), "machine");

        let zone = EquipmentRef::new(EquipmentKind::Zone, 3);
        assert!(!zone.is_machine());
    }

    #[test]
    fn test_machine_defaults() {
        let machine = Machine::new(1, "M-01".to_string(), "Press".to_string());

        assert_eq!(machine.status, MachineStatus::Operational);
        assert_eq!(machine.criticality, Criticality::Medium);
        assert!(machine.is_operational());
    }
}
