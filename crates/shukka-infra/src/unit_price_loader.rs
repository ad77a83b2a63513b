//! Unit price master loaders (単価マスタ)
//!
//! CSV files exported from Japanese office tools are often CP932, so bytes
//! that are not valid UTF-8 are decoded as Shift-JIS.

use std::fs;
use std::path::Path;

use encoding_rs::SHIFT_JIS;
use serde::Deserialize;
use tracing::warn;

use shukka_domain::model::UnitPriceEntry;
use shukka_types::{ConfigError, Error, Result, ShiftCategory};

/// Load entries from `.csv` or `.toml` by file extension
pub fn load_unit_prices(path: &Path) -> Result<Vec<UnitPriceEntry>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("toml") => {
            let content = fs::read_to_string(path)?;
            load_unit_prices_from_toml(&content)
        }
        _ => {
            let bytes = fs::read(path)?;
            load_unit_prices_from_csv(&decode(&bytes))
        }
    }
}

fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (decoded, _, had_errors) = SHIFT_JIS.decode(bytes);
            if had_errors {
                warn!("some characters could not be decoded from CP932");
            }
            decoded.into_owned()
        }
    }
}

/// Parse CSV with header `区分,項目名,仕切り価格[,標準販売価格]`
pub fn load_unit_prices_from_csv(content: &str) -> Result<Vec<UnitPriceEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::Csv(e.to_string()))?
        .clone();
    let column = |names: &[&str]| headers.iter().position(|h| names.contains(&h));
    let category_col = column(&["区分", "category"])
        .ok_or_else(|| Error::Csv("missing column: 区分".to_string()))?;
    let item_col = column(&["項目名", "item_name"])
        .ok_or_else(|| Error::Csv("missing column: 項目名".to_string()))?;
    let partition_col = column(&["仕切り価格", "partition_price"])
        .ok_or_else(|| Error::Csv("missing column: 仕切り価格".to_string()))?;
    let standard_col = column(&["標準販売価格", "standard_price"]);

    let mut entries = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| Error::Csv(e.to_string()))?;
        // +2: 0-based index and the header line
        let row_num = row_idx + 2;
        let field = |col: usize| record.get(col).unwrap_or("");

        if field(item_col).is_empty() {
            continue;
        }
        let category: ShiftCategory = field(category_col).parse().map_err(|e: Error| {
            Error::Csv(format!("row {}: {}", row_num, e))
        })?;
        let partition_price = parse_price(field(partition_col), row_num, "仕切り価格")?;
        let standard_price = match standard_col.map(field) {
            Some(raw) if !raw.is_empty() => parse_price(raw, row_num, "標準販売価格")?,
            _ => 0,
        };

        entries.push(UnitPriceEntry {
            category,
            item_name: field(item_col).to_string(),
            partition_price,
            standard_price,
        });
    }
    Ok(entries)
}

fn parse_price(raw: &str, row: usize, column: &str) -> Result<i64> {
    raw.replace(',', "")
        .parse()
        .map_err(|_| Error::Csv(format!("row {}, column {}: invalid price '{}'", row, column, raw)))
}

/// Container for parsing a prices TOML file
#[derive(Debug, Deserialize)]
struct UnitPriceFile {
    prices: Vec<UnitPriceEntry>,
}

/// Parse TOML made of `[[prices]]` tables
pub fn load_unit_prices_from_toml(content: &str) -> Result<Vec<UnitPriceEntry>> {
    let file: UnitPriceFile = toml::from_str(content).map_err(|e| {
        Error::Config(ConfigError::ParseError(format!(
            "Failed to parse unit price TOML: {}",
            e
        )))
    })?;
    Ok(file.prices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CSV: &str = "区分,項目名,仕切り価格,標準販売価格\n\
                       昼間,昼間 1回転,\"3,000\",3500\n\
                       夜間,夜間 2回空積,800,\n\
                       昼間,,0,0\n";

    #[test]
    fn test_csv() {
        let entries = load_unit_prices_from_csv(CSV).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].category, ShiftCategory::Day);
        assert_eq!(entries[0].partition_price, 3000);
        assert_eq!(entries[0].standard_price, 3500);
        assert_eq!(entries[1].item_name, "夜間 2回空積");
        assert_eq!(entries[1].standard_price, 0);
    }

    #[test]
    fn test_csv_missing_column() {
        let err = load_unit_prices_from_csv("区分,項目名\n昼間,昼間 1回転\n").unwrap_err();
        assert!(err.to_string().contains("仕切り価格"));
    }

    #[test]
    fn test_csv_bad_category() {
        let err = load_unit_prices_from_csv("区分,項目名,仕切り価格\n空積,空積 1回,100\n").unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_cp932_file() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        let (encoded, _, _) = SHIFT_JIS.encode(CSV);
        file.write_all(&encoded).unwrap();
        let entries = load_unit_prices(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].item_name, "昼間 1回転");
    }

    #[test]
    fn test_toml() {
        let content = r#"
[[prices]]
category = "day"
item_name = "昼間 3回転"
partition_price = 3200

[[prices]]
category = "night"
item_name = "夜間 3回転"
partition_price = 4100
standard_price = 4500
"#;
        let entries = load_unit_prices_from_toml(content).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].standard_price, 0);
        assert_eq!(entries[1].category, ShiftCategory::Night);
    }
}
