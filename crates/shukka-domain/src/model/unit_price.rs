//! Unit price master (単価マスタ)

use serde::{Deserialize, Serialize};
use shukka_types::ShiftCategory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPriceEntry {
    /// 区分
    pub category: ShiftCategory,
    /// 項目名, e.g. "昼間 3回転" or "夜間 2回空積"
    pub item_name: String,
    /// 仕切り価格 (used by the performance report)
    pub partition_price: i64,
    /// 標準販売価格
    #[serde(default)]
    pub standard_price: i64,
}

/// Item name of the rotation tier line
pub fn rotation_label(category: ShiftCategory, rotations: u32) -> String {
    format!("{} {}回転", category.label(), rotations)
}

/// Item name of the empty-run (空積) surcharge line
pub fn empty_run_label(category: ShiftCategory, rotations: u32) -> String {
    format!("{} {}回空積", category.label(), rotations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(rotation_label(ShiftCategory::Day, 1), "昼間 1回転");
        assert_eq!(empty_run_label(ShiftCategory::Night, 4), "夜間 4回空積");
    }
}
