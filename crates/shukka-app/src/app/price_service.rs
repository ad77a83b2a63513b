//! Price Service - unit price master (単価マスタ) maintenance

use std::path::Path;

use tracing::info;

use shukka_domain::model::UnitPriceEntry;
use shukka_domain::repository::UnitPriceRepository;
use shukka_infra::unit_price_loader::load_unit_prices;
use shukka_types::{Error, Result, ShiftCategory};

fn validate(entry: &UnitPriceEntry) -> Result<()> {
    if entry.item_name.trim().is_empty() {
        return Err(Error::validation("item_name", "required"));
    }
    if entry.partition_price < 0 || entry.standard_price < 0 {
        return Err(Error::validation(
            "price",
            format!("negative price for {}", entry.item_name),
        ));
    }
    Ok(())
}

/// Insert or replace one entry keyed by (category, item name)
pub fn upsert_unit_price<R: UnitPriceRepository + ?Sized>(
    repo: &R,
    category: ShiftCategory,
    item_name: &str,
    partition_price: i64,
    standard_price: i64,
) -> Result<UnitPriceEntry> {
    let entry = UnitPriceEntry {
        category,
        item_name: item_name.trim().to_string(),
        partition_price,
        standard_price,
    };
    validate(&entry)?;
    repo.upsert_price(&entry)?;
    info!(%category, item = %entry.item_name, price = partition_price, "set unit price");
    Ok(entry)
}

pub fn list_unit_prices<R: UnitPriceRepository + ?Sized>(repo: &R) -> Result<Vec<UnitPriceEntry>> {
    repo.find_all_prices()
}

/// Load a CSV or TOML price list and upsert every row.
///
/// The whole file is validated before anything is written.
pub fn import_unit_prices<R: UnitPriceRepository + ?Sized>(repo: &R, path: &Path) -> Result<usize> {
    let entries = load_unit_prices(path)?;
    for entry in &entries {
        validate(entry)?;
    }
    for entry in &entries {
        repo.upsert_price(entry)?;
    }
    info!(path = %path.display(), count = entries.len(), "imported unit prices");
    Ok(entries.len())
}
