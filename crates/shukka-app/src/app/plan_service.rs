//! Plan Service - shipment plan board (出荷予定表)

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use shukka_domain::model::{ContractCode, PlanCellView, PlanFields, PlanKey};
use shukka_domain::repository::{OrderRepository, PlanRepository};
use shukka_domain::service::{build_plan_cell, PlanCoverage};
use shukka_types::{BoardSection, Result};

use super::order_service::get_order;

/// Overwrite (or create) the cell at (date, section, row_index).
///
/// Numeric fields are parsed leniently; a contract code that is blank or
/// does not resolve to an order leaves the cell unlinked.
pub fn upsert_plan_cell<R>(
    repo: &R,
    date: NaiveDate,
    section: &str,
    row_index: u32,
    fields: &PlanFields,
) -> Result<PlanCellView>
where
    R: OrderRepository + PlanRepository + ?Sized,
{
    let section: BoardSection = section.parse()?;
    let key = PlanKey::new(date, section, row_index);

    let raw_code = fields.contract_code.trim();
    let order = if raw_code.is_empty() {
        None
    } else {
        match raw_code.parse::<ContractCode>() {
            Ok(code) => repo.find_by_code(&code)?,
            Err(_) => None,
        }
    };
    if order.is_none() && !raw_code.is_empty() {
        debug!(key = %key, code = raw_code, "plan cell contract not found, leaving unlinked");
    }

    let cell = repo.upsert_cell(build_plan_cell(key, fields, order.as_ref()))?;
    info!(key = %key, "upserted plan cell");
    Ok(PlanCellView::from(&cell))
}

/// Every cell on the board, ordered by (date, section, row)
pub fn list_plan_cells<R: PlanRepository + ?Sized>(repo: &R) -> Result<Vec<PlanCellView>> {
    Ok(repo
        .find_all_cells()?
        .iter()
        .map(PlanCellView::from)
        .collect())
}

pub fn list_plan_cells_for_date<R: PlanRepository + ?Sized>(
    repo: &R,
    date: NaiveDate,
) -> Result<Vec<PlanCellView>> {
    Ok(repo
        .find_cells_by_date(date)?
        .iter()
        .map(PlanCellView::from)
        .collect())
}

/// Remove one cell; `false` if there was nothing to remove
pub fn clear_plan_cell<R: PlanRepository + ?Sized>(
    repo: &R,
    date: NaiveDate,
    section: &str,
    row_index: u32,
) -> Result<bool> {
    let key = PlanKey::new(date, section.parse()?, row_index);
    let removed = repo.remove_cell(&key)?;
    if removed {
        info!(key = %key, "cleared plan cell");
    }
    Ok(removed)
}

/// Planned quantity across the board for one contract vs. its contract quantity
pub fn plan_over_quantity<R>(repo: &R, code: &str) -> Result<PlanCoverage>
where
    R: OrderRepository + PlanRepository + ?Sized,
{
    let order = get_order(repo, code)?;
    let cells = repo.find_cells_by_contract(&order.code)?;
    let coverage = PlanCoverage::compute(&order, &cells);
    if coverage.is_over() {
        warn!(
            code = %order.code,
            planned = coverage.planned_quantity,
            contracted = coverage.contract_quantity,
            "planned quantity exceeds contract"
        );
    }
    Ok(coverage)
}
