//! Shipment plan board cells (出荷予定表)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shukka_types::BoardSection;

use super::ContractCode;

/// Composite key of a board cell. At most one cell exists per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlanKey {
    pub date: NaiveDate,
    pub section: BoardSection,
    pub row_index: u32,
}

impl PlanKey {
    pub fn new(date: NaiveDate, section: BoardSection, row_index: u32) -> Self {
        Self {
            date,
            section,
            row_index,
        }
    }
}

impl std::fmt::Display for PlanKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}-{}]", self.date, self.section, self.row_index)
    }
}

/// Raw, loosely typed input from the board editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanFields {
    #[serde(default)]
    pub contract_code: String,
    #[serde(default)]
    pub site_name: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub plan_quantity: String,
    #[serde(default)]
    pub truck_count: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanCell {
    pub key: PlanKey,
    /// Soft link to an order; `None` when blank or unresolved
    pub contract_code: Option<ContractCode>,
    pub site_name: String,
    pub start_time: String,
    pub plan_quantity: Option<f64>,
    pub truck_count: Option<u32>,
    pub note: String,
}

/// Board cell as handed to the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanCellView {
    /// ISO-8601 date
    pub date: String,
    pub section: BoardSection,
    pub row_index: u32,
    /// Empty when no contract is linked
    pub contract_code: String,
    pub site_name: String,
    pub start_time: String,
    pub plan_quantity: Option<f64>,
    pub truck_count: Option<u32>,
    pub note: String,
}

impl From<&PlanCell> for PlanCellView {
    fn from(cell: &PlanCell) -> Self {
        Self {
            date: cell.key.date.format("%Y-%m-%d").to_string(),
            section: cell.key.section,
            row_index: cell.key.row_index,
            contract_code: cell
                .contract_code
                .as_ref()
                .map(|c| c.to_string())
                .unwrap_or_default(),
            site_name: cell.site_name.clone(),
            start_time: cell.start_time.clone(),
            plan_quantity: cell.plan_quantity,
            truck_count: cell.truck_count,
            note: cell.note.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_formats_date_and_blank_contract() {
        let cell = PlanCell {
            key: PlanKey::new(
                NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                BoardSection::Other,
                2,
            ),
            contract_code: None,
            site_name: "未定".to_string(),
            start_time: "8:00".to_string(),
            plan_quantity: None,
            truck_count: Some(2),
            note: String::new(),
        };
        let view = PlanCellView::from(&cell);
        assert_eq!(view.date, "2025-06-01");
        assert_eq!(view.contract_code, "");
        assert_eq!(view.truck_count, Some(2));
    }

    #[test]
    fn test_key_ordering() {
        let d = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let a = PlanKey::new(d, BoardSection::El, 3);
        let b = PlanKey::new(d, BoardSection::Other, 0);
        assert!(a < b);
    }
}
