//! Contract number (契約NO): `YY NNNN B`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shukka_types::Error;

/// Seven-digit contract code: 2-digit year, 4-digit sequence, 1-digit branch
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractCode(String);

impl ContractCode {
    pub const LEN: usize = 7;
    pub const MAX_SEQUENCE: u32 = 9999;
    pub const MAX_BRANCH: u8 = 9;

    /// Build a code from its parts. Out-of-range parts are rejected.
    pub fn from_parts(year_prefix: &str, sequence: u32, branch: u8) -> Result<Self, Error> {
        if year_prefix.len() != 2 || !year_prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::validation(
                "issue_no",
                format!("year prefix must be 2 digits: {}", year_prefix),
            ));
        }
        if sequence == 0 || sequence > Self::MAX_SEQUENCE {
            return Err(Error::validation(
                "issue_no",
                format!("sequence out of range: {}", sequence),
            ));
        }
        if branch > Self::MAX_BRANCH {
            return Err(Error::validation(
                "issue_no",
                format!("branch digit out of range: {}", branch),
            ));
        }
        Ok(Self(format!("{}{:04}{}", year_prefix, sequence, branch)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 年 (first two digits)
    pub fn year_prefix(&self) -> &str {
        &self.0[..2]
    }

    /// 連番 (digits 3-6)
    pub fn sequence(&self) -> u32 {
        self.0[2..6].parse().unwrap_or(0)
    }

    /// 枝番 (last digit)
    pub fn branch(&self) -> u8 {
        self.0.as_bytes()[6] - b'0'
    }

    /// Year + sequence, shared by a contract and all of its branches
    pub fn group_prefix(&self) -> &str {
        &self.0[..6]
    }
}

impl FromStr for ContractCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != Self::LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::validation(
                "issue_no",
                format!("contract number must be {} digits: '{}'", Self::LEN, s),
            ));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ContractCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContractCode> for String {
    fn from(code: ContractCode) -> Self {
        code.0
    }
}

impl fmt::Display for ContractCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts() {
        let code: ContractCode = "2500013".parse().unwrap();
        assert_eq!(code.year_prefix(), "25");
        assert_eq!(code.sequence(), 1);
        assert_eq!(code.branch(), 3);
        assert_eq!(code.group_prefix(), "250001");
    }

    #[test]
    fn test_from_parts_pads_sequence() {
        let code = ContractCode::from_parts("26", 42, 0).unwrap();
        assert_eq!(code.as_str(), "2600420");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!("250001".parse::<ContractCode>().is_err());
        assert!("25A0010".parse::<ContractCode>().is_err());
        assert!(ContractCode::from_parts("25", 10000, 0).is_err());
        assert!(ContractCode::from_parts("25", 1, 10).is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let code: ContractCode = "2500100".parse().unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"2500100\"");
        let back: ContractCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<ContractCode>("\"12\"").is_err());
    }
}
