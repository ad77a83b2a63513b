//! Plan board input handling
//!
//! Cells are provisional and edited piecemeal, so numeric input is parsed
//! leniently: blank or unparsable text becomes `None`, never an error.

use serde::{Deserialize, Serialize};

use crate::model::{ContractCode, Order, PlanCell, PlanFields, PlanKey};

/// Parse a planned quantity. Blank, unparsable, negative or non-finite -> `None`.
pub fn parse_lenient_quantity(raw: &str) -> Option<f64> {
    let value: f64 = normalize_digits(raw).parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Largest truck count a single board cell can plan
pub const MAX_PLANNED_TRUCKS: u32 = 999;

/// Parse a truck count. Accepts "3" and "3.0"; anything else, or a count
/// above [`MAX_PLANNED_TRUCKS`], -> `None`.
pub fn parse_lenient_count(raw: &str) -> Option<u32> {
    let text = normalize_digits(raw);
    let count = match text.parse::<u32>() {
        Ok(count) => count,
        Err(_) => {
            let value: f64 = text.parse().ok()?;
            if !(value.is_finite() && value >= 0.0 && value.fract() == 0.0) {
                return None;
            }
            if value > MAX_PLANNED_TRUCKS as f64 {
                return None;
            }
            value as u32
        }
    };
    (count <= MAX_PLANNED_TRUCKS).then_some(count)
}

/// Trim and fold full-width digits (０-９, ．) typed on Japanese IMEs
fn normalize_digits(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
            '．' => '.',
            _ => c,
        })
        .collect()
}

/// Build the full replacement cell for `key` from raw board input.
///
/// `order` is the resolved contract, if the code matched one.
pub fn build_plan_cell(key: PlanKey, fields: &PlanFields, order: Option<&Order>) -> PlanCell {
    PlanCell {
        key,
        contract_code: order.map(|o| o.code.clone()),
        site_name: fields.site_name.trim().to_string(),
        start_time: fields.start_time.trim().to_string(),
        plan_quantity: parse_lenient_quantity(&fields.plan_quantity),
        truck_count: parse_lenient_count(&fields.truck_count),
        note: fields.note.clone(),
    }
}

/// Planned quantity of a contract across the board vs. its contracted quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanCoverage {
    pub contract_code: ContractCode,
    pub planned_quantity: f64,
    pub contract_quantity: f64,
    pub cell_count: usize,
}

impl PlanCoverage {
    pub fn compute(order: &Order, cells: &[PlanCell]) -> Self {
        let linked: Vec<_> = cells
            .iter()
            .filter(|c| c.contract_code.as_ref() == Some(&order.code))
            .collect();
        Self {
            contract_code: order.code.clone(),
            planned_quantity: linked.iter().filter_map(|c| c.plan_quantity).sum(),
            contract_quantity: order.fields.quantity,
            cell_count: linked.len(),
        }
    }

    /// 予定数量が契約数量を超過しているか
    pub fn is_over(&self) -> bool {
        self.planned_quantity > self.contract_quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::order::tests::sample_fields;
    use chrono::NaiveDate;
    use shukka_types::BoardSection;

    fn key(row: u32) -> PlanKey {
        PlanKey::new(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            BoardSection::El,
            row,
        )
    }

    #[test]
    fn test_lenient_quantity() {
        assert_eq!(parse_lenient_quantity("12.5"), Some(12.5));
        assert_eq!(parse_lenient_quantity(" 30 "), Some(30.0));
        assert_eq!(parse_lenient_quantity("１８"), Some(18.0));
        assert_eq!(parse_lenient_quantity(""), None);
        assert_eq!(parse_lenient_quantity("abc"), None);
        assert_eq!(parse_lenient_quantity("-3"), None);
        assert_eq!(parse_lenient_quantity("NaN"), None);
    }

    #[test]
    fn test_lenient_count() {
        assert_eq!(parse_lenient_count("3"), Some(3));
        assert_eq!(parse_lenient_count("3.0"), Some(3));
        assert_eq!(parse_lenient_count("２"), Some(2));
        assert_eq!(parse_lenient_count("2.5"), None);
        assert_eq!(parse_lenient_count("-1"), None);
        assert_eq!(parse_lenient_count("  "), None);
    }

    #[test]
    fn test_lenient_count_out_of_range() {
        assert_eq!(parse_lenient_count("999"), Some(MAX_PLANNED_TRUCKS));
        assert_eq!(parse_lenient_count("1000"), None);
        assert_eq!(parse_lenient_count("4294967295"), None);
        assert_eq!(parse_lenient_count("4294967296"), None);
        assert_eq!(parse_lenient_count("1e12"), None);
    }

    #[test]
    fn test_build_cell_unresolved_contract() {
        let fields = PlanFields {
            contract_code: "2599990".to_string(),
            site_name: " 熊本駅前 ".to_string(),
            start_time: "8:30".to_string(),
            plan_quantity: "x".to_string(),
            truck_count: "3".to_string(),
            note: "雨天中止".to_string(),
        };
        let cell = build_plan_cell(key(0), &fields, None);
        assert_eq!(cell.contract_code, None);
        assert_eq!(cell.site_name, "熊本駅前");
        assert_eq!(cell.plan_quantity, None);
        assert_eq!(cell.truck_count, Some(3));
    }

    #[test]
    fn test_coverage_over_quantity() {
        let order = crate::model::Order::new(
            "2500010".parse().unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            sample_fields(),
        );
        let mut a = build_plan_cell(key(0), &PlanFields::default(), Some(&order));
        a.plan_quantity = Some(60.0);
        let mut b = build_plan_cell(key(1), &PlanFields::default(), Some(&order));
        b.plan_quantity = Some(48.0);
        let unrelated = build_plan_cell(key(2), &PlanFields::default(), None);

        let coverage = PlanCoverage::compute(&order, &[a, b, unrelated]);
        assert_eq!(coverage.cell_count, 2);
        assert!((coverage.planned_quantity - 108.0).abs() < 1e-9);
        assert!(coverage.is_over());
    }
}
