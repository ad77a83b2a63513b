//! Domain services

pub mod performance;
pub mod plan_board;
pub mod sequence_allocator;
pub mod shipment_ledger;

pub use performance::{
    build_daily_report, render_daily_report, ContractReport, DailyReport, ReportLine,
    ReportLineKind, TierAllocation,
};
pub use plan_board::{
    build_plan_cell, parse_lenient_count, parse_lenient_quantity, PlanCoverage, MAX_PLANNED_TRUCKS,
};
pub use sequence_allocator::{next_branch_code, next_contract_code, year_prefix};
pub use shipment_ledger::{build_event, remaining_quantity, running_stats, RunningStats};
