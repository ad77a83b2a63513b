//! Domain model types

pub mod contract_code;
pub mod order;
pub mod plan_cell;
pub mod shipment;
pub mod unit_price;

pub use contract_code::ContractCode;
pub use order::{MixDesign, Order, OrderFields, OrderFlags, OrderSummary};
pub use plan_cell::{PlanCell, PlanCellView, PlanFields, PlanKey};
pub use shipment::{NewShipment, OrderSnapshot, ShipmentEvent, STANDARD_LOAD};
pub use unit_price::{empty_run_label, rotation_label, UnitPriceEntry};
