//! Application Layer
//!
//! This module orchestrates between the UI (CLI) and the domain and
//! infrastructure layers.
//!
//! The app layer contains:
//! - `order_service`: contract creation, numbering, branching and search
//! - `plan_service`: shipment plan board edits
//! - `shipment_service`: ledger prefill, stats and recording
//! - `report_service`: the daily performance report
//! - `price_service`: unit price master maintenance

pub mod order_service;
pub mod plan_service;
pub mod price_service;
pub mod report_service;
pub mod shipment_service;

pub use order_service::{
    branch_order, create_order, get_order, list_orders, lookup_code, search_orders, update_order,
    SEARCH_LIMIT,
};
pub use plan_service::{
    clear_plan_cell, list_plan_cells, list_plan_cells_for_date, plan_over_quantity, upsert_plan_cell,
};
pub use price_service::{import_unit_prices, list_unit_prices, upsert_unit_price};
pub use report_service::daily_report;
pub use shipment_service::{
    compute_running_stats, list_shipments, prefill_shipment, record_shipment, remaining_quantity,
    shipment_stats, ShipmentDraft, ShipmentStats,
};
