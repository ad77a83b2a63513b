//! Running figures over the shipment ledger

use chrono::Utc;
use serde::{Deserialize, Serialize};
use shukka_types::{Error, Result};

use crate::model::{NewShipment, OrderSnapshot, ShipmentEvent, STANDARD_LOAD};
use crate::repository::LedgerView;

/// Figures shown to the operator before the next vehicle is recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    /// 累計台数 for the next vehicle
    pub next_vehicle_index: u32,
    /// 累計出荷量 including the pending load
    pub cumulative_quantity: f64,
    /// 前車NO, `None` for the first vehicle of the day
    pub previous_vehicle_no: Option<String>,
}

/// Stats over `same_day` (one contract, one date, insertion order) with
/// `pending` added for the load about to be recorded.
pub fn running_stats(same_day: &[ShipmentEvent], pending: f64) -> RunningStats {
    let shipped: f64 = same_day.iter().map(|e| e.quantity).sum();
    RunningStats {
        next_vehicle_index: same_day.len() as u32 + 1,
        cumulative_quantity: shipped + pending,
        previous_vehicle_no: same_day.last().map(|e| e.vehicle_no.clone()),
    }
}

/// Contracted minus everything shipped so far minus `pending`. Not clamped.
pub fn remaining_quantity(contract_quantity: f64, history: &[ShipmentEvent], pending: f64) -> f64 {
    let shipped: f64 = history.iter().map(|e| e.quantity).sum();
    contract_quantity - (shipped + pending)
}

/// Build the next ledger event from operator input and the ledger view.
///
/// The stored running figures use the quantity actually recorded.
/// `id` is left at 0 for the store to assign.
pub fn build_event(
    input: &NewShipment,
    snapshot: OrderSnapshot,
    view: LedgerView<'_>,
) -> Result<ShipmentEvent> {
    let quantity = input.quantity.unwrap_or(STANDARD_LOAD);
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(Error::validation(
            "quantity",
            format!("must be a positive number: {}", quantity),
        ));
    }
    let vehicle_no = input.vehicle_no.trim();
    if vehicle_no.is_empty() {
        return Err(Error::validation("vehicle_no", "required"));
    }

    let stats = running_stats(view.same_day, quantity);
    let remaining = remaining_quantity(snapshot.contract_quantity, view.history, quantity);

    Ok(ShipmentEvent {
        id: 0,
        contract_code: input.contract_code.clone(),
        date: input.date,
        time: input.time,
        quantity,
        vehicle_no: vehicle_no.to_string(),
        vehicle_index: stats.next_vehicle_index,
        cumulative_quantity: stats.cumulative_quantity,
        previous_vehicle_no: stats.previous_vehicle_no,
        remaining_quantity: remaining,
        snapshot,
        recorded_at: Utc::now(),
    })
}
