//! Repository adapters for persistence layer

use std::path::PathBuf;

use shukka_domain::repository::{
    OrderRepository, PlanRepository, ShipmentRepository, UnitPriceRepository,
};
use shukka_infra::persistence::FileDatabase;
use shukka_types::Result;

use crate::config::Config;

/// Every store the use cases need
pub trait Database:
    OrderRepository + PlanRepository + ShipmentRepository + UnitPriceRepository
{
}

impl<T> Database for T where
    T: OrderRepository + PlanRepository + ShipmentRepository + UnitPriceRepository
{
}

/// Open the file database in the configured data directory
pub fn open_database(config: &Config) -> Result<FileDatabase> {
    let store_dir = config.store_dir()?;
    FileDatabase::open(store_dir)
}

/// Open the file database at a custom directory
pub fn open_database_at(store_dir: PathBuf) -> Result<FileDatabase> {
    FileDatabase::open(store_dir)
}
