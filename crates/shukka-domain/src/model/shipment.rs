//! Shipment ledger (出荷) records

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContractCode, MixDesign, Order, OrderFlags};

/// Standard full load per vehicle (m³); also the default shipment quantity
pub const STANDARD_LOAD: f64 = 6.0;

/// Order fields frozen at the moment a shipment is recorded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub site: String,
    pub site_address: String,
    pub customer: String,
    pub contractor: String,
    pub coordinator: String,
    pub contact: String,
    pub product: String,
    pub product_category: String,
    pub note: String,
    pub special_note: String,
    pub contract_quantity: f64,
    pub rotation: u32,
    pub price: i64,
    pub mix: MixDesign,
    pub flags: OrderFlags,
}

impl OrderSnapshot {
    pub fn capture(order: &Order) -> Self {
        let f = &order.fields;
        Self {
            site: f.site.clone(),
            site_address: f.site_address.clone(),
            customer: f.customer.clone(),
            contractor: f.contractor.clone(),
            coordinator: f.coordinator.clone().unwrap_or_default(),
            contact: f.contact.clone(),
            product: f.product.clone(),
            product_category: f.product_category.clone(),
            note: f.note.clone(),
            special_note: f.special_note.clone(),
            contract_quantity: f.quantity,
            rotation: f.rotation,
            price: f.price,
            mix: f.mix.clone(),
            flags: f.flags,
        }
    }
}

/// Operator input for one delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShipment {
    pub contract_code: ContractCode,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Defaults to [`STANDARD_LOAD`] when absent
    pub quantity: Option<f64>,
    pub vehicle_no: String,
}

/// One vehicle's delivery. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentEvent {
    /// Store-assigned, increasing in insertion order
    pub id: u64,
    pub contract_code: ContractCode,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub quantity: f64,
    /// 車両番号
    pub vehicle_no: String,
    /// 累計台数 (1-based position within the contract's day)
    pub vehicle_index: u32,
    /// 累計出荷量 including this event
    pub cumulative_quantity: f64,
    /// 前車NO
    pub previous_vehicle_no: Option<String>,
    /// 残量 after this event; negative means over-delivery
    pub remaining_quantity: f64,
    pub snapshot: OrderSnapshot,
    pub recorded_at: DateTime<Utc>,
}

impl ShipmentEvent {
    /// Short of a full load by this much (0 for full or over loads)
    pub fn shortfall(&self) -> f64 {
        if self.quantity < STANDARD_LOAD {
            STANDARD_LOAD - self.quantity
        } else {
            0.0
        }
    }
}
