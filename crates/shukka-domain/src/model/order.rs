//! Order (受注) model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shukka_types::{Error, Result};

use super::ContractCode;

/// 配合データ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MixDesign {
    /// 原料土
    #[serde(default)]
    pub material_soil: String,
    /// 水
    #[serde(default)]
    pub water: f64,
    /// セメントBB
    #[serde(default)]
    pub cement_bb: f64,
    /// 再生砂
    #[serde(default)]
    pub recycle_sand: f64,
    /// 混和剤
    #[serde(default)]
    pub admixture: f64,
    /// 原料土wm
    #[serde(default)]
    pub material_soil_wm: f64,
}

/// 判定フラグ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFlags {
    /// 現場試験
    #[serde(default)]
    pub site_test: bool,
    /// 夜間
    #[serde(default)]
    pub night: bool,
    /// 23区外
    #[serde(default)]
    pub outside_zone: bool,
    /// 材料渡し
    #[serde(default)]
    pub material_delivery: bool,
}

/// A contract as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub code: ContractCode,
    pub issue_date: NaiveDate,
    #[serde(flatten)]
    pub fields: OrderFields,
}

/// Editable order fields (everything but code and issue date)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderFields {
    /// 現場名
    pub site: String,
    /// 現場住所
    #[serde(default)]
    pub site_address: String,
    /// 得意先
    pub customer: String,
    /// 施工者名
    #[serde(default)]
    pub contractor: String,
    /// 担当者名
    #[serde(default)]
    pub coordinator: Option<String>,
    /// 連絡先
    #[serde(default)]
    pub contact: String,
    /// 商品名
    pub product: String,
    /// 商品区分
    #[serde(default)]
    pub product_category: String,
    #[serde(default)]
    pub note: String,
    /// 初回出荷予定日
    #[serde(default)]
    pub first_ship_date: Option<NaiveDate>,
    /// 契約数量 (m³)
    pub quantity: f64,
    /// 予定回転数
    #[serde(default)]
    pub rotation: u32,
    /// 販売単価
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub mix: MixDesign,
    #[serde(default)]
    pub flags: OrderFlags,
    /// 特記項目
    #[serde(default)]
    pub special_note: String,
}

impl OrderFields {
    /// Check required fields and numeric ranges before any write.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("site", &self.site),
            ("customer", &self.customer),
            ("product", &self.product),
        ] {
            if value.trim().is_empty() {
                return Err(Error::validation(field, "required"));
            }
        }
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(Error::validation(
                "quantity",
                format!("must be a non-negative number: {}", self.quantity),
            ));
        }
        if self.price < 0 {
            return Err(Error::validation("price", "must not be negative"));
        }
        let mix = &self.mix;
        for (field, value) in [
            ("water", mix.water),
            ("cement_bb", mix.cement_bb),
            ("recycle_sand", mix.recycle_sand),
            ("admixture", mix.admixture),
            ("material_soil_wm", mix.material_soil_wm),
        ] {
            if !value.is_finite() {
                return Err(Error::validation(field, "must be a finite number"));
            }
        }
        Ok(())
    }
}

impl Order {
    pub fn new(code: ContractCode, issue_date: NaiveDate, fields: OrderFields) -> Self {
        Self {
            code,
            issue_date,
            fields,
        }
    }

    /// Clone as a branch: same fields, new code, issue date reset.
    pub fn branch(&self, code: ContractCode, today: NaiveDate) -> Self {
        Self {
            code,
            issue_date: today,
            fields: self.fields.clone(),
        }
    }

    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            code: self.code.clone(),
            site: self.fields.site.clone(),
            address: self.fields.site_address.clone(),
        }
    }
}

/// Search hit for the contract autocomplete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub code: ContractCode,
    pub site: String,
    pub address: String,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_fields() -> OrderFields {
        OrderFields {
            site: "長嶺南6丁目".to_string(),
            site_address: "熊本市東区長嶺南6丁目".to_string(),
            customer: "松尾建設".to_string(),
            contractor: "松尾土木".to_string(),
            coordinator: Some("田中".to_string()),
            product: "流動化処理土".to_string(),
            quantity: 100.0,
            rotation: 3,
            price: 12000,
            mix: MixDesign {
                material_soil: "建設発生土".to_string(),
                water: 320.0,
                cement_bb: 80.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(sample_fields().validate().is_ok());
    }

    #[test]
    fn test_validate_required_site() {
        let mut fields = sample_fields();
        fields.site = "  ".to_string();
        match fields.validate() {
            Err(Error::Validation { field, .. }) => assert_eq!(field, "site"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_validate_negative_quantity() {
        let mut fields = sample_fields();
        fields.quantity = -1.0;
        assert!(fields.validate().is_err());
    }

    #[test]
    fn test_branch_copies_fields() {
        let parent = Order::new(
            "2500010".parse().unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            sample_fields(),
        );
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let child = parent.branch("2500011".parse().unwrap(), today);
        assert_eq!(child.fields, parent.fields);
        assert_eq!(child.issue_date, today);
        assert_eq!(child.code.as_str(), "2500011");
    }
}
