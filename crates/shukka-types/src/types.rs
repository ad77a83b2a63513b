//! Shared enums used across layers

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::Error;

/// Lane on the shipment planning board
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardSection {
    El,
    Other,
}

impl BoardSection {
    pub const ALL: [BoardSection; 2] = [BoardSection::El, BoardSection::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            BoardSection::El => "el",
            BoardSection::Other => "other",
        }
    }
}

impl std::fmt::Display for BoardSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoardSection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "el" => Ok(BoardSection::El),
            "other" => Ok(BoardSection::Other),
            other => Err(Error::validation(
                "section",
                format!("unknown board section '{}' (expected el or other)", other),
            )),
        }
    }
}

/// Shift category used by the unit price master (昼間 / 夜間)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftCategory {
    Day,
    Night,
}

impl ShiftCategory {
    pub fn from_night_flag(night: bool) -> Self {
        if night {
            ShiftCategory::Night
        } else {
            ShiftCategory::Day
        }
    }

    /// Japanese label as printed in item names
    pub fn label(&self) -> &'static str {
        match self {
            ShiftCategory::Day => "昼間",
            ShiftCategory::Night => "夜間",
        }
    }
}

impl std::fmt::Display for ShiftCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ShiftCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "昼間" | "day" | "Day" | "DAY" => Ok(ShiftCategory::Day),
            "夜間" | "night" | "Night" | "NIGHT" => Ok(ShiftCategory::Night),
            other => Err(Error::validation(
                "category",
                format!("unknown shift category '{}'", other),
            )),
        }
    }
}
