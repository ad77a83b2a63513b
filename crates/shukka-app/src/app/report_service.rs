//! Report Service - daily performance report (実績管理表)

use chrono::NaiveDate;
use tracing::info;

use shukka_domain::repository::{PlanRepository, ShipmentRepository, UnitPriceRepository};
use shukka_domain::service::{build_daily_report, DailyReport};
use shukka_types::Result;

/// Build the report for `date` from the ledger, the plan board and the price master
pub fn daily_report<R>(repo: &R, date: NaiveDate) -> Result<DailyReport>
where
    R: PlanRepository + ShipmentRepository + UnitPriceRepository + ?Sized,
{
    let shipments = repo.find_by_date(date)?;
    let plans = repo.find_cells_by_date(date)?;
    let prices = repo.find_all_prices()?;

    let report = build_daily_report(date, &shipments, &plans, &prices);
    info!(
        %date,
        contracts = report.contracts.len(),
        shipments = report.total_shipments(),
        "daily report"
    );
    Ok(report)
}
