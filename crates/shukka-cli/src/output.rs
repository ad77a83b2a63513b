//! Output formatting module

use serde::Serialize;
use shukka_app::app::{ShipmentDraft, ShipmentStats};
use shukka_domain::model::{Order, OrderSummary, PlanCellView, ShipmentEvent, UnitPriceEntry};
use shukka_domain::service::{render_daily_report, DailyReport, PlanCoverage};
use shukka_types::{OutputFormat, Result};

const NONE_LABEL: &str = "なし";

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let cut: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", cut)
    } else {
        s.to_string()
    }
}

fn opt_f64(value: Option<f64>) -> String {
    value.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string())
}

pub fn output_order(format: OutputFormat, order: &Order) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(order);
    }
    let f = &order.fields;
    println!("\nOrder {}", order.code);
    println!("==============");
    println!("Issue date:      {}", order.issue_date);
    println!("Site:            {}", f.site);
    println!("Address:         {}", f.site_address);
    println!("Customer:        {}", f.customer);
    println!("Contractor:      {}", f.contractor);
    println!("Coordinator:     {}", f.coordinator.as_deref().unwrap_or("-"));
    println!("Product:         {} {}", f.product, f.product_category);
    println!("Quantity:        {:.1} m³", f.quantity);
    println!("Rotation:        {}", f.rotation);
    println!("Price:           {}", f.price);
    if let Some(date) = f.first_ship_date {
        println!("First shipment:  {}", date);
    }
    println!(
        "Night: {}  Site test: {}  Outside zone: {}  Material delivery: {}",
        f.flags.night, f.flags.site_test, f.flags.outside_zone, f.flags.material_delivery
    );
    if !f.note.is_empty() {
        println!("Note:            {}", f.note);
    }
    if !f.special_note.is_empty() {
        println!("Special note:    {}", f.special_note);
    }
    Ok(())
}

pub fn output_orders(format: OutputFormat, orders: &[Order]) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(orders);
    }
    if orders.is_empty() {
        println!("No orders found.");
        return Ok(());
    }
    println!("{:<9} {:<24} {:<16} {:>10}", "Code", "Site", "Customer", "Qty(m³)");
    println!("{}", "-".repeat(62));
    for order in orders {
        println!(
            "{:<9} {:<24} {:<16} {:>10.1}",
            order.code,
            truncate(&order.fields.site, 24),
            truncate(&order.fields.customer, 16),
            order.fields.quantity
        );
    }
    Ok(())
}

pub fn output_search(format: OutputFormat, hits: &[OrderSummary]) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(hits);
    }
    for hit in hits {
        println!("{}  {}  {}", hit.code, hit.site, hit.address);
    }
    Ok(())
}

pub fn output_plan_cells(format: OutputFormat, cells: &[PlanCellView]) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(cells);
    }
    if cells.is_empty() {
        println!("No plan cells found.");
        return Ok(());
    }
    println!(
        "{:<10} {:<5} {:>3} {:<9} {:<20} {:<6} {:>7} {:>6}  {}",
        "Date", "Sec", "Row", "Contract", "Site", "Start", "Qty", "Trucks", "Note"
    );
    println!("{}", "-".repeat(84));
    for cell in cells {
        println!(
            "{:<10} {:<5} {:>3} {:<9} {:<20} {:<6} {:>7} {:>6}  {}",
            cell.date,
            cell.section,
            cell.row_index,
            cell.contract_code,
            truncate(&cell.site_name, 20),
            cell.start_time,
            opt_f64(cell.plan_quantity),
            cell.truck_count
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string()),
            cell.note
        );
    }
    Ok(())
}

pub fn output_coverage(format: OutputFormat, coverage: &PlanCoverage) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(coverage);
    }
    println!("Contract:        {}", coverage.contract_code);
    println!("Plan cells:      {}", coverage.cell_count);
    println!("Planned:         {:.1} m³", coverage.planned_quantity);
    println!("Contracted:      {:.1} m³", coverage.contract_quantity);
    if coverage.is_over() {
        println!("⚠ Planned quantity exceeds the contract");
    }
    Ok(())
}

fn print_stats(stats: &ShipmentStats) {
    println!("Contract:        {}", stats.contract_code);
    println!("Site:            {}", stats.site);
    println!("Address:         {}", stats.address);
    println!("Customer:        {}", stats.customer);
    println!("Product:         {}", stats.product);
    println!("Coordinator:     {}", stats.coordinator_name);
    println!("Vehicle #:       {}", stats.next_vehicle_index);
    println!("Cumulative:      {:.1} m³", stats.cumulative_quantity);
    println!(
        "Previous:        {}",
        stats.previous_vehicle_no.as_deref().unwrap_or(NONE_LABEL)
    );
}

pub fn output_stats(format: OutputFormat, stats: &ShipmentStats) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(stats);
    }
    print_stats(stats);
    Ok(())
}

pub fn output_draft(format: OutputFormat, draft: &ShipmentDraft) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(draft);
    }
    println!("Date:            {}", draft.date);
    println!("Time:            {}", draft.time.format("%H:%M"));
    println!("Quantity:        {:.1} m³", draft.quantity);
    if let Some(ref stats) = draft.stats {
        print_stats(stats);
    }
    if let Some(remaining) = draft.remaining_quantity {
        println!("Remaining:       {:.1} m³", remaining);
    }
    Ok(())
}

pub fn output_shipment(format: OutputFormat, event: &ShipmentEvent) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(event);
    }
    println!(
        "Recorded #{} for {} ({}): {:.1} m³ by {}",
        event.vehicle_index, event.contract_code, event.date, event.quantity, event.vehicle_no
    );
    println!("Cumulative:      {:.1} m³", event.cumulative_quantity);
    println!("Remaining:       {:.1} m³", event.remaining_quantity);
    if event.remaining_quantity < 0.0 {
        println!("⚠ Contract quantity exceeded");
    }
    Ok(())
}

pub fn output_shipments(format: OutputFormat, events: &[ShipmentEvent]) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(events);
    }
    if events.is_empty() {
        println!("No shipments found.");
        return Ok(());
    }
    println!(
        "{:<10} {:<5} {:>3} {:<10} {:>7} {:>9} {:<10} {:>9}",
        "Date", "Time", "#", "Vehicle", "Qty", "Cumul.", "Prev.", "Remain"
    );
    println!("{}", "-".repeat(72));
    for e in events {
        println!(
            "{:<10} {:<5} {:>3} {:<10} {:>7.1} {:>9.1} {:<10} {:>9.1}",
            e.date.to_string(),
            e.time.format("%H:%M").to_string(),
            e.vehicle_index,
            truncate(&e.vehicle_no, 10),
            e.quantity,
            e.cumulative_quantity,
            e.previous_vehicle_no.as_deref().unwrap_or(NONE_LABEL),
            e.remaining_quantity
        );
    }
    Ok(())
}

pub fn output_report(format: OutputFormat, report: &DailyReport) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(report);
    }
    print!("{}", render_daily_report(report));
    Ok(())
}

pub fn output_prices(format: OutputFormat, prices: &[UnitPriceEntry]) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(prices);
    }
    if prices.is_empty() {
        println!("No unit prices registered.");
        return Ok(());
    }
    println!("{:<6} {:<20} {:>10} {:>10}", "区分", "項目名", "仕切り", "標準");
    println!("{}", "-".repeat(50));
    for p in prices {
        println!(
            "{:<6} {:<20} {:>10} {:>10}",
            p.category.label(),
            p.item_name,
            p.partition_price,
            p.standard_price
        );
    }
    Ok(())
}
