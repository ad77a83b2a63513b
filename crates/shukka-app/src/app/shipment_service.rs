//! Shipment Service - ledger (出荷入力)
//!
//! Figures shown before recording assume the next load is a full
//! [`STANDARD_LOAD`]; the recorded event stores the figures for the quantity
//! actually shipped.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use shukka_domain::model::{
    ContractCode, NewShipment, Order, OrderSnapshot, ShipmentEvent, STANDARD_LOAD,
};
use shukka_domain::repository::{OrderRepository, ShipmentRepository};
use shukka_domain::service::{self, build_event, running_stats, RunningStats};
use shukka_types::{Error, Result};

use super::order_service::{get_order, lookup_code};

/// Running figures plus the order details the entry screen shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentStats {
    pub contract_code: ContractCode,
    pub next_vehicle_index: u32,
    pub cumulative_quantity: f64,
    pub previous_vehicle_no: Option<String>,
    pub site: String,
    pub customer: String,
    pub product: String,
    pub address: String,
    /// 担当者名, empty when unset
    pub coordinator_name: String,
}

/// Field set offered to the operator before a shipment is confirmed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentDraft {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub quantity: f64,
    /// Present only when a contract was given
    pub stats: Option<ShipmentStats>,
    pub remaining_quantity: Option<f64>,
}

/// Stats for the next vehicle of `code` on `date`
pub fn compute_running_stats<R>(repo: &R, code: &str, date: NaiveDate) -> Result<RunningStats>
where
    R: OrderRepository + ShipmentRepository + ?Sized,
{
    let order = get_order(repo, code)?;
    let same_day = repo.find_by_contract_and_date(&order.code, date)?;
    Ok(running_stats(&same_day, STANDARD_LOAD))
}

/// Contracted minus shipped minus one pending full load. May be negative.
pub fn remaining_quantity<R>(repo: &R, code: &str) -> Result<f64>
where
    R: OrderRepository + ShipmentRepository + ?Sized,
{
    let order = get_order(repo, code)?;
    remaining_for(repo, &order)
}

fn remaining_for<R>(repo: &R, order: &Order) -> Result<f64>
where
    R: ShipmentRepository + ?Sized,
{
    let history = repo.find_by_contract(&order.code)?;
    Ok(service::remaining_quantity(
        order.fields.quantity,
        &history,
        STANDARD_LOAD,
    ))
}

fn stats_for<R>(repo: &R, order: &Order, date: NaiveDate) -> Result<ShipmentStats>
where
    R: ShipmentRepository + ?Sized,
{
    let same_day = repo.find_by_contract_and_date(&order.code, date)?;
    let stats = running_stats(&same_day, STANDARD_LOAD);
    let f = &order.fields;
    Ok(ShipmentStats {
        contract_code: order.code.clone(),
        next_vehicle_index: stats.next_vehicle_index,
        cumulative_quantity: stats.cumulative_quantity,
        previous_vehicle_no: stats.previous_vehicle_no,
        site: f.site.clone(),
        customer: f.customer.clone(),
        product: f.product.clone(),
        address: f.site_address.clone(),
        coordinator_name: f.coordinator.clone().unwrap_or_default(),
    })
}

/// Running stats and order details; `Error::NotFound` for an unknown code
pub fn shipment_stats<R>(repo: &R, code: &str, date: NaiveDate) -> Result<ShipmentStats>
where
    R: OrderRepository + ShipmentRepository + ?Sized,
{
    let order = get_order(repo, code)?;
    stats_for(repo, &order, date)
}

/// Defaults for the entry form. Without a contract only date, time and
/// the standard quantity are filled.
pub fn prefill_shipment<R>(repo: &R, code: Option<&str>, now: NaiveDateTime) -> Result<ShipmentDraft>
where
    R: OrderRepository + ShipmentRepository + ?Sized,
{
    let mut draft = ShipmentDraft {
        date: now.date(),
        time: now.time(),
        quantity: STANDARD_LOAD,
        stats: None,
        remaining_quantity: None,
    };

    if let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) {
        let order = get_order(repo, code)?;
        draft.stats = Some(stats_for(repo, &order, draft.date)?);
        draft.remaining_quantity = Some(remaining_for(repo, &order)?);
    }
    Ok(draft)
}

/// Append one shipment. The order's fields, as they stand when the event
/// is committed, are frozen into it.
pub fn record_shipment<R>(repo: &R, input: &NewShipment) -> Result<ShipmentEvent>
where
    R: ShipmentRepository + ?Sized,
{
    let event = repo.append_with(input, &mut |view| {
        let order = view
            .order
            .ok_or_else(|| Error::not_found("order", input.contract_code.to_string()))?;
        build_event(input, OrderSnapshot::capture(order), view)
    })?;

    info!(
        code = %event.contract_code,
        date = %event.date,
        vehicle = %event.vehicle_no,
        index = event.vehicle_index,
        remaining = event.remaining_quantity,
        "recorded shipment"
    );
    Ok(event)
}

/// Ledger rows for a contract, optionally for one date, in insertion order
pub fn list_shipments<R>(repo: &R, code: &str, date: Option<NaiveDate>) -> Result<Vec<ShipmentEvent>>
where
    R: ShipmentRepository + ?Sized,
{
    let code = lookup_code(code)?;
    match date {
        Some(date) => repo.find_by_contract_and_date(&code, date),
        None => repo.find_by_contract(&code),
    }
}
