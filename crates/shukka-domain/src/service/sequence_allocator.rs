//! Contract number allocation (自動採番)
//!
//! Pure functions over the set of existing codes. Callers must run them
//! inside the order store's insert unit so two allocations never observe
//! the same maximum.

use chrono::{Datelike, NaiveDate};
use shukka_types::{Error, Result};
use tracing::debug;

use crate::model::ContractCode;

/// Last two digits of the year, e.g. 2025 -> "25"
pub fn year_prefix(today: NaiveDate) -> String {
    format!("{:02}", today.year().rem_euclid(100))
}

/// Next fresh contract code for `today`'s year, branch digit 0.
///
/// Only codes with the same year prefix count, so a new year starts at 0001.
pub fn next_contract_code(today: NaiveDate, existing: &[ContractCode]) -> Result<ContractCode> {
    let prefix = year_prefix(today);
    let last_seq = existing
        .iter()
        .filter(|code| code.year_prefix() == prefix)
        .map(ContractCode::sequence)
        .max()
        .unwrap_or(0);

    if last_seq >= ContractCode::MAX_SEQUENCE {
        return Err(Error::SequenceExhausted(prefix));
    }

    let code = ContractCode::from_parts(&prefix, last_seq + 1, 0)?;
    debug!(code = %code, last_seq, "allocated contract number");
    Ok(code)
}

/// Next branch code in `parent`'s year+sequence group.
///
/// Fails with `Error::BranchExhausted` rather than wrapping past 9.
pub fn next_branch_code(parent: &ContractCode, existing: &[ContractCode]) -> Result<ContractCode> {
    let group = parent.group_prefix();
    let last_branch = existing
        .iter()
        .filter(|code| code.group_prefix() == group)
        .map(ContractCode::branch)
        .max()
        .unwrap_or_else(|| parent.branch());

    if last_branch >= ContractCode::MAX_BRANCH {
        return Err(Error::BranchExhausted(parent.to_string()));
    }

    let code = ContractCode::from_parts(parent.year_prefix(), parent.sequence(), last_branch + 1)?;
    debug!(parent = %parent, code = %code, "allocated branch number");
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(raw: &[&str]) -> Vec<ContractCode> {
        raw.iter().map(|c| c.parse().unwrap()).collect()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_of_year() {
        let code = next_contract_code(day(2025, 1, 5), &[]).unwrap();
        assert_eq!(code.as_str(), "2500010");
    }

    #[test]
    fn test_increments_max_sequence() {
        let existing = codes(&["2500010", "2500120", "2500053"]);
        let code = next_contract_code(day(2025, 6, 1), &existing).unwrap();
        assert_eq!(code.as_str(), "2500130");
    }

    #[test]
    fn test_new_year_ignores_previous_year() {
        let existing = codes(&["2508880", "2509990"]);
        let code = next_contract_code(day(2026, 1, 1), &existing).unwrap();
        assert_eq!(code.as_str(), "2600010");
    }

    #[test]
    fn test_strictly_increasing() {
        let today = day(2025, 3, 1);
        let mut existing = Vec::new();
        let mut last = 0;
        for _ in 0..25 {
            let code = next_contract_code(today, &existing).unwrap();
            assert!(code.sequence() > last);
            last = code.sequence();
            existing.push(code);
        }
        assert_eq!(last, 25);
    }

    #[test]
    fn test_sequence_exhausted() {
        let existing = codes(&["2599990"]);
        let err = next_contract_code(day(2025, 12, 31), &existing).unwrap_err();
        assert!(matches!(err, Error::SequenceExhausted(p) if p == "25"));
    }

    #[test]
    fn test_first_branch() {
        let parent: ContractCode = "2500010".parse().unwrap();
        let code = next_branch_code(&parent, &[parent.clone()]).unwrap();
        assert_eq!(code.as_str(), "2500011");
    }

    #[test]
    fn test_branch_from_branch_uses_group_max() {
        let existing = codes(&["2500010", "2500011", "2500012", "2500020"]);
        let parent: ContractCode = "2500011".parse().unwrap();
        let code = next_branch_code(&parent, &existing).unwrap();
        assert_eq!(code.as_str(), "2500013");
    }

    #[test]
    fn test_branch_exhausted_after_nine() {
        let parent: ContractCode = "2500010".parse().unwrap();
        let mut existing = vec![parent.clone()];
        for expected in 1..=9u8 {
            let code = next_branch_code(&parent, &existing).unwrap();
            assert_eq!(code.branch(), expected);
            existing.push(code);
        }
        let err = next_branch_code(&parent, &existing).unwrap_err();
        assert!(matches!(err, Error::BranchExhausted(c) if c == "2500010"));
    }
}
