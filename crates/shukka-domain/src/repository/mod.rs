//! Repository trait definitions for data persistence
//!
//! Implementations must run each method as one serializable unit. The
//! `*_with` methods hand the caller a consistent view of the rows it needs
//! and commit the returned row in the same unit, so read-then-write
//! sequences (numbering, running totals) cannot interleave.

use chrono::NaiveDate;

use crate::model::{
    ContractCode, NewShipment, Order, PlanCell, PlanKey, ShipmentEvent, UnitPriceEntry,
};
use shukka_types::{Result, ShiftCategory};

/// Repository for orders (受注)
pub trait OrderRepository {
    /// Find an order by contract code
    fn find_by_code(&self, code: &ContractCode) -> Result<Option<Order>>;

    /// Find all orders ordered by code
    fn find_all(&self) -> Result<Vec<Order>>;

    /// Insert an order built from the current set of codes.
    ///
    /// `build` sees every existing code and returns the order to insert.
    /// A code that is already taken is rejected with `Error::Conflict`.
    fn insert_with(&self, build: &mut dyn FnMut(&[ContractCode]) -> Result<Order>)
        -> Result<Order>;

    /// Overwrite an existing order; `Error::NotFound` if absent
    fn update(&self, order: &Order) -> Result<()>;
}

/// Repository for plan board cells (出荷予定)
pub trait PlanRepository {
    /// Insert or fully overwrite the cell at `cell.key`
    fn upsert_cell(&self, cell: PlanCell) -> Result<PlanCell>;

    /// Remove the cell at `key`; returns whether one existed
    fn remove_cell(&self, key: &PlanKey) -> Result<bool>;

    /// All cells ordered by key
    fn find_all_cells(&self) -> Result<Vec<PlanCell>>;

    fn find_cells_by_date(&self, date: NaiveDate) -> Result<Vec<PlanCell>>;

    fn find_cells_by_contract(&self, code: &ContractCode) -> Result<Vec<PlanCell>>;
}

/// The rows a new shipment's running figures are derived from
#[derive(Debug, Clone, Copy)]
pub struct LedgerView<'a> {
    /// The order being shipped against, as of this unit
    pub order: Option<&'a Order>,
    /// Same contract, same date, insertion order
    pub same_day: &'a [ShipmentEvent],
    /// Same contract, every date, insertion order
    pub history: &'a [ShipmentEvent],
}

/// Append-only shipment ledger (出荷)
pub trait ShipmentRepository {
    /// Append the event built from the current ledger view for
    /// `(shipment.contract_code, shipment.date)`, including the order as
    /// it stands in the same unit. The store assigns the id.
    fn append_with(
        &self,
        shipment: &NewShipment,
        build: &mut dyn FnMut(LedgerView<'_>) -> Result<ShipmentEvent>,
    ) -> Result<ShipmentEvent>;

    /// Events for a contract across all dates, insertion order
    fn find_by_contract(&self, code: &ContractCode) -> Result<Vec<ShipmentEvent>>;

    /// Events for a contract on one date, insertion order
    fn find_by_contract_and_date(
        &self,
        code: &ContractCode,
        date: NaiveDate,
    ) -> Result<Vec<ShipmentEvent>>;

    /// Events on one date, insertion order
    fn find_by_date(&self, date: NaiveDate) -> Result<Vec<ShipmentEvent>>;
}

/// Unit price master (単価マスタ)
pub trait UnitPriceRepository {
    fn find_price(&self, category: ShiftCategory, item_name: &str)
        -> Result<Option<UnitPriceEntry>>;

    fn find_all_prices(&self) -> Result<Vec<UnitPriceEntry>>;

    /// Insert or replace by (category, item name)
    fn upsert_price(&self, entry: &UnitPriceEntry) -> Result<()>;
}
