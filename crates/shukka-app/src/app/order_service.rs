//! Order Service - contract lifecycle
//!
//! Numbering runs inside the order store's insert unit, so concurrent
//! creations never hand out the same contract number.

use chrono::NaiveDate;
use tracing::{info, warn};

use shukka_domain::model::{ContractCode, Order, OrderFields, OrderSummary};
use shukka_domain::repository::OrderRepository;
use shukka_domain::service::{next_branch_code, next_contract_code};
use shukka_types::{Error, Result};

/// Maximum number of autocomplete hits
pub const SEARCH_LIMIT: usize = 15;

/// Parse a user-supplied code; anything that cannot name an order is "not found"
pub fn lookup_code(raw: &str) -> Result<ContractCode> {
    raw.parse()
        .map_err(|_| Error::not_found("order", raw.trim().to_string()))
}

/// Create an order. A blank `issue_no` gets the next number for `today`'s year.
pub fn create_order<R: OrderRepository + ?Sized>(
    repo: &R,
    issue_no: Option<&str>,
    fields: OrderFields,
    today: NaiveDate,
) -> Result<Order> {
    fields.validate()?;
    let supplied = match issue_no.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.parse::<ContractCode>()?),
        None => None,
    };

    let order = repo.insert_with(&mut |existing| {
        let code = match &supplied {
            Some(code) => code.clone(),
            None => next_contract_code(today, existing)?,
        };
        Ok(Order::new(code, today, fields.clone()))
    })?;

    info!(code = %order.code, site = %order.fields.site, "created order");
    Ok(order)
}

/// Replace every field except code and issue date
pub fn update_order<R: OrderRepository + ?Sized>(
    repo: &R,
    code: &str,
    fields: OrderFields,
) -> Result<Order> {
    fields.validate()?;
    let mut order = get_order(repo, code)?;
    order.fields = fields;
    repo.update(&order)?;
    info!(code = %order.code, "updated order");
    Ok(order)
}

/// Clone `parent_code` into the next branch number of its group
pub fn branch_order<R: OrderRepository + ?Sized>(
    repo: &R,
    parent_code: &str,
    today: NaiveDate,
) -> Result<Order> {
    let parent = get_order(repo, parent_code)?;

    let order = repo.insert_with(&mut |existing| {
        let code = next_branch_code(&parent.code, existing)?;
        Ok(parent.branch(code, today))
    });

    match &order {
        Ok(o) => info!(parent = %parent.code, code = %o.code, "branched order"),
        Err(Error::BranchExhausted(_)) => warn!(parent = %parent.code, "branch numbers exhausted"),
        Err(_) => {}
    }
    order
}

pub fn get_order<R: OrderRepository + ?Sized>(repo: &R, code: &str) -> Result<Order> {
    let code = lookup_code(code)?;
    repo.find_by_code(&code)?
        .ok_or_else(|| Error::not_found("order", code.to_string()))
}

/// Orders issued on `issue_date`, ordered by code
pub fn list_orders<R: OrderRepository + ?Sized>(repo: &R, issue_date: NaiveDate) -> Result<Vec<Order>> {
    Ok(repo
        .find_all()?
        .into_iter()
        .filter(|o| o.issue_date == issue_date)
        .collect())
}

/// Case-insensitive substring match on site name or code, by site name, at most 15
pub fn search_orders<R: OrderRepository + ?Sized>(repo: &R, term: &str) -> Result<Vec<OrderSummary>> {
    let needle = term.trim().to_lowercase();
    let mut hits: Vec<OrderSummary> = repo
        .find_all()?
        .iter()
        .filter(|o| {
            needle.is_empty()
                || o.fields.site.to_lowercase().contains(&needle)
                || o.code.as_str().contains(&needle)
        })
        .map(Order::summary)
        .collect();
    hits.sort_by(|a, b| a.site.cmp(&b.site).then_with(|| a.code.cmp(&b.code)));
    hits.truncate(SEARCH_LIMIT);
    Ok(hits)
}
