//! Export functionality

mod excel;

pub use excel::export_daily_report;
