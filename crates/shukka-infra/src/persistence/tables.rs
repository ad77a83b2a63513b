//! In-memory table set and its on-disk shape

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shukka_domain::model::{ContractCode, Order, PlanCell, PlanKey, ShipmentEvent, UnitPriceEntry};
use shukka_types::ShiftCategory;

/// All four tables. Keyed maps make the unique constraints structural.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StoredTables", into = "StoredTables")]
pub(crate) struct Tables {
    pub orders: BTreeMap<ContractCode, Order>,
    pub plans: BTreeMap<PlanKey, PlanCell>,
    /// Insertion order
    pub shipments: Vec<ShipmentEvent>,
    pub unit_prices: BTreeMap<(ShiftCategory, String), UnitPriceEntry>,
    pub next_shipment_id: u64,
}

impl Default for Tables {
    fn default() -> Self {
        StoredTables::default().into()
    }
}

/// JSON layout: one array per table
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredTables {
    #[serde(default)]
    orders: Vec<Order>,
    #[serde(default)]
    plans: Vec<PlanCell>,
    #[serde(default)]
    shipments: Vec<ShipmentEvent>,
    #[serde(default)]
    unit_prices: Vec<UnitPriceEntry>,
    #[serde(default)]
    next_shipment_id: u64,
}

impl From<StoredTables> for Tables {
    fn from(stored: StoredTables) -> Self {
        let mut shipments = stored.shipments;
        shipments.sort_by_key(|e| e.id);
        let after_last = shipments.last().map(|e| e.id + 1).unwrap_or(1);

        Self {
            orders: stored
                .orders
                .into_iter()
                .map(|o| (o.code.clone(), o))
                .collect(),
            plans: stored.plans.into_iter().map(|c| (c.key, c)).collect(),
            shipments,
            unit_prices: stored
                .unit_prices
                .into_iter()
                .map(|p| ((p.category, p.item_name.clone()), p))
                .collect(),
            next_shipment_id: stored.next_shipment_id.max(after_last),
        }
    }
}

impl From<Tables> for StoredTables {
    fn from(tables: Tables) -> Self {
        Self {
            orders: tables.orders.into_values().collect(),
            plans: tables.plans.into_values().collect(),
            shipments: tables.shipments,
            unit_prices: tables.unit_prices.into_values().collect(),
            next_shipment_id: tables.next_shipment_id,
        }
    }
}
