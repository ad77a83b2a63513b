//! Daily performance report (実績管理表)
//!
//! Each contract's shipment count N for the day is split across the k
//! planned trucks: R = N mod k trucks run L = ceil(N/k) rotations and the
//! other k - R run M = floor(N/k). Trip units are billed per tier from the
//! unit price master; partial loads go to a separate 空積 line.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shukka_types::ShiftCategory;
use tracing::{debug, warn};

use crate::model::{
    empty_run_label, rotation_label, ContractCode, PlanCell, ShipmentEvent, UnitPriceEntry,
    STANDARD_LOAD,
};

/// Integer split of N shipments over k trucks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierAllocation {
    /// N
    pub shipments: u32,
    /// k (never 0)
    pub trucks: u32,
    /// Q = N div k
    pub quotient: u32,
    /// R = N mod k
    pub remainder: u32,
    /// L = ceil(N / k)
    pub high_rotation: u32,
    /// M = floor(N / k)
    pub low_rotation: u32,
    /// X = (Q + 1) * R
    pub high_units: u32,
    /// Y = Q * (k - R)
    pub low_units: u32,
}

impl TierAllocation {
    /// `planned_trucks` of `None` or 0 counts as one truck.
    pub fn compute(shipments: u32, planned_trucks: Option<u32>) -> Self {
        let trucks = planned_trucks.filter(|&k| k > 0).unwrap_or(1);
        let quotient = shipments / trucks;
        let remainder = shipments % trucks;
        let high_rotation = if remainder > 0 { quotient + 1 } else { quotient };
        Self {
            shipments,
            trucks,
            quotient,
            remainder,
            high_rotation,
            low_rotation: quotient,
            high_units: (quotient + 1).saturating_mul(remainder),
            low_units: quotient.saturating_mul(trucks - remainder),
        }
    }

    /// Trucks running the high rotation count (R)
    pub fn high_trucks(&self) -> u32 {
        self.remainder
    }

    /// Trucks running the low rotation count (k - R)
    pub fn low_trucks(&self) -> u32 {
        self.trucks - self.remainder
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportLineKind {
    HighTier,
    LowTier,
    EmptyRun,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLine {
    pub kind: ReportLineKind,
    /// Unit price master item the line is priced by
    pub item_name: String,
    pub rotation: u32,
    pub units: u32,
    /// m³
    pub total: f64,
    /// 仕切り価格; 0 when the master has no entry
    pub unit_price: i64,
    pub amount: f64,
}

impl ReportLine {
    fn new(
        kind: ReportLineKind,
        item_name: String,
        rotation: u32,
        units: u32,
        total: f64,
        unit_price: i64,
    ) -> Self {
        Self {
            kind,
            item_name,
            rotation,
            units,
            total,
            unit_price,
            amount: total * unit_price as f64,
        }
    }
}

/// One contract's group of report lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractReport {
    pub contract_code: ContractCode,
    pub site: String,
    pub customer: String,
    pub category: ShiftCategory,
    pub allocation: TierAllocation,
    pub shipped_quantity: f64,
    pub short_diff: f64,
    /// High tier, low tier, empty-run surcharge
    pub lines: Vec<ReportLine>,
}

impl ContractReport {
    pub fn amount(&self) -> f64 {
        self.lines.iter().map(|l| l.amount).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub contracts: Vec<ContractReport>,
}

impl DailyReport {
    pub fn total_amount(&self) -> f64 {
        self.contracts.iter().map(ContractReport::amount).sum()
    }

    pub fn total_shipments(&self) -> u32 {
        self.contracts.iter().map(|c| c.allocation.shipments).sum()
    }
}

/// Build the report for `date` from that day's shipments and plan cells.
///
/// Events or cells for other dates are ignored. Groups come out ordered by
/// contract code. Missing prices resolve to 0.
pub fn build_daily_report(
    date: NaiveDate,
    shipments: &[ShipmentEvent],
    plans: &[PlanCell],
    prices: &[UnitPriceEntry],
) -> DailyReport {
    let price_table: HashMap<(ShiftCategory, &str), i64> = prices
        .iter()
        .map(|p| ((p.category, p.item_name.as_str()), p.partition_price))
        .collect();
    let lookup = |category: ShiftCategory, item: &str| -> i64 {
        match price_table.get(&(category, item)) {
            Some(price) => *price,
            None => {
                warn!(%category, item, "unit price not found; using 0");
                0
            }
        }
    };

    let mut groups: BTreeMap<&ContractCode, Vec<&ShipmentEvent>> = BTreeMap::new();
    for event in shipments.iter().filter(|e| e.date == date) {
        groups.entry(&event.contract_code).or_default().push(event);
    }

    let contracts = groups
        .into_iter()
        .map(|(code, events)| {
            let planned = plans
                .iter()
                .filter(|c| c.key.date == date && c.contract_code.as_ref() == Some(code))
                .filter_map(|c| c.truck_count)
                .fold(0u32, u32::saturating_add);
            contract_report(code, &events, planned, &lookup)
        })
        .collect::<Vec<_>>();

    debug!(%date, contracts = contracts.len(), "built daily report");
    DailyReport { date, contracts }
}

fn contract_report(
    code: &ContractCode,
    events: &[&ShipmentEvent],
    planned_trucks: u32,
    lookup: &dyn Fn(ShiftCategory, &str) -> i64,
) -> ContractReport {
    // Snapshot of the day's first event decides site, customer and shift
    let snapshot = events.first().map(|e| &e.snapshot);
    let category = ShiftCategory::from_night_flag(snapshot.map(|s| s.flags.night).unwrap_or(false));

    let allocation = TierAllocation::compute(events.len() as u32, Some(planned_trucks));
    let short_diff: f64 = events.iter().map(|e| e.shortfall()).sum();
    let shipped_quantity: f64 = events.iter().map(|e| e.quantity).sum();

    let high = allocation.high_rotation;
    let low = allocation.low_rotation;
    let high_item = rotation_label(category, high);
    let low_item = rotation_label(category, low);
    let empty_item = empty_run_label(category, high);

    let lines = vec![
        ReportLine::new(
            ReportLineKind::HighTier,
            high_item.clone(),
            high,
            allocation.high_units,
            allocation.high_units as f64 * STANDARD_LOAD - short_diff,
            lookup(category, &high_item),
        ),
        ReportLine::new(
            ReportLineKind::LowTier,
            low_item.clone(),
            low,
            allocation.low_units,
            allocation.low_units as f64 * STANDARD_LOAD,
            lookup(category, &low_item),
        ),
        ReportLine::new(
            ReportLineKind::EmptyRun,
            empty_item.clone(),
            high,
            if short_diff > 0.0 { high } else { 0 },
            short_diff,
            lookup(category, &empty_item),
        ),
    ];

    ContractReport {
        contract_code: code.clone(),
        site: snapshot.map(|s| s.site.clone()).unwrap_or_default(),
        customer: snapshot.map(|s| s.customer.clone()).unwrap_or_default(),
        category,
        allocation,
        shipped_quantity,
        short_diff,
        lines,
    }
}

/// Plain-text rendering for terminals and logs
pub fn render_daily_report(report: &DailyReport) -> String {
    let mut out = String::new();
    out.push_str("==================================================\n");
    out.push_str(&format!("        実績管理表 / Daily Report  {}\n", report.date));
    out.push_str("==================================================\n\n");

    if report.contracts.is_empty() {
        out.push_str("  出荷実績なし / No shipments\n\n");
        return out;
    }

    for contract in &report.contracts {
        let a = &contract.allocation;
        out.push_str(&format!(
            "【{}】 {} / {} ({})\n",
            contract.contract_code,
            truncate_str(&contract.site, 24),
            truncate_str(&contract.customer, 16),
            contract.category
        ));
        out.push_str(&format!(
            "  台数 N={}  予定車両 k={}  Q={} R={}  L={} M={}  出荷量 {:.1}m³\n",
            a.shipments, a.trucks, a.quotient, a.remainder, a.high_rotation, a.low_rotation,
            contract.shipped_quantity
        ));
        out.push_str(&format!(
            "  {:<16} {:>6} {:>10} {:>10} {:>12}\n",
            "項目", "単位", "数量", "単価", "金額"
        ));
        for line in &contract.lines {
            out.push_str(&format!(
                "  {:<16} {:>6} {:>10.2} {:>10} {:>12.0}\n",
                truncate_str(&line.item_name, 16),
                line.units,
                line.total,
                line.unit_price,
                line.amount
            ));
        }
        out.push('\n');
    }

    out.push_str("--------------------------------------------------\n");
    out.push_str(&format!(
        "  合計台数 / Shipments: {}\n  合計金額 / Amount:    {:.0}\n",
        report.total_shipments(),
        report.total_amount()
    ));
    out.push_str("==================================================\n");
    out
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let truncated: String = s.chars().take(max_len.saturating_sub(2)).collect();
        format!("{}..", truncated)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PlanKey, ShipmentEvent};
    use crate::service::shipment_ledger::tests::event;
    use shukka_types::BoardSection;

    fn june_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn plan(row: u32, code: Option<&str>, trucks: Option<u32>) -> PlanCell {
        PlanCell {
            key: PlanKey::new(june_first(), BoardSection::El, row),
            contract_code: code.map(|c| c.parse().unwrap()),
            site_name: String::new(),
            start_time: String::new(),
            plan_quantity: None,
            truck_count: trucks,
            note: String::new(),
        }
    }

    fn price(category: ShiftCategory, item: &str, partition_price: i64) -> UnitPriceEntry {
        UnitPriceEntry {
            category,
            item_name: item.to_string(),
            partition_price,
            standard_price: 0,
        }
    }

    fn full_loads(code: &str, n: u64) -> Vec<ShipmentEvent> {
        (0..n)
            .map(|i| event(i + 1, code, june_first(), STANDARD_LOAD, "101"))
            .collect()
    }

    #[test]
    fn test_allocation_ten_over_three() {
        let a = TierAllocation::compute(10, Some(3));
        assert_eq!((a.quotient, a.remainder), (3, 1));
        assert_eq!((a.high_rotation, a.low_rotation), (4, 3));
        assert_eq!((a.high_units, a.low_units), (4, 6));
        assert_eq!(a.high_trucks(), 1);
        assert_eq!(a.low_trucks(), 2);
        assert_eq!(
            a.high_trucks() * a.high_rotation + a.low_trucks() * a.low_rotation,
            a.shipments
        );
    }

    #[test]
    fn test_allocation_reconstructs_n() {
        for n in 0..40 {
            for k in 1..8 {
                let a = TierAllocation::compute(n, Some(k));
                assert_eq!(a.high_trucks() * a.high_rotation + a.low_trucks() * a.low_rotation, n);
                assert_eq!(a.high_units + a.low_units, n);
            }
        }
    }

    #[test]
    fn test_allocation_zero_trucks_defaults_to_one() {
        let a = TierAllocation::compute(5, Some(0));
        assert_eq!(a.trucks, 1);
        assert_eq!((a.high_rotation, a.low_rotation), (5, 5));
        assert_eq!((a.high_units, a.low_units), (0, 5));
        assert_eq!(TierAllocation::compute(5, None).trucks, 1);
    }

    #[test]
    fn test_report_tiers_and_prices() {
        let shipments = full_loads("2500010", 10);
        let plans = vec![
            plan(0, Some("2500010"), Some(2)),
            plan(1, Some("2500010"), Some(1)),
            plan(2, Some("2500020"), Some(5)),
        ];
        let prices = vec![
            price(ShiftCategory::Day, "昼間 4回転", 3000),
            price(ShiftCategory::Day, "昼間 3回転", 3200),
        ];
        let report = build_daily_report(june_first(), &shipments, &plans, &prices);
        assert_eq!(report.contracts.len(), 1);
        let c = &report.contracts[0];
        assert_eq!(c.allocation.trucks, 3);

        let high = &c.lines[0];
        assert_eq!(high.kind, ReportLineKind::HighTier);
        assert_eq!(high.item_name, "昼間 4回転");
        assert_eq!(high.units, 4);
        assert!((high.total - 24.0).abs() < 1e-9);
        assert_eq!(high.unit_price, 3000);

        let low = &c.lines[1];
        assert_eq!(low.units, 6);
        assert!((low.total - 36.0).abs() < 1e-9);
        assert_eq!(low.unit_price, 3200);

        let empty = &c.lines[2];
        assert_eq!(empty.kind, ReportLineKind::EmptyRun);
        assert_eq!(empty.units, 0);
        assert_eq!(empty.total, 0.0);
        assert_eq!(empty.unit_price, 0);
    }

    #[test]
    fn test_shortfall_reduces_high_tier() {
        let d = june_first();
        let shipments = vec![
            event(1, "2500010", d, 6.0, "101"),
            event(2, "2500010", d, 3.0, "102"),
        ];
        // k = 3: Q = 0, R = 2, L = 1, X = 2
        let plans = vec![plan(0, Some("2500010"), Some(3))];
        let report = build_daily_report(d, &shipments, &plans, &[]);
        let c = &report.contracts[0];
        assert!((c.short_diff - 3.0).abs() < 1e-9);

        let high = &c.lines[0];
        let unadjusted = high.units as f64 * STANDARD_LOAD;
        assert!((unadjusted - high.total - 3.0).abs() < 1e-9);

        let low = &c.lines[1];
        assert!((low.total - low.units as f64 * STANDARD_LOAD).abs() < 1e-9);

        let empty = &c.lines[2];
        assert_eq!(empty.units, c.allocation.high_rotation);
        assert!((empty.total - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_night_category_and_empty_run_price() {
        let d = june_first();
        let mut shipments = vec![
            event(1, "2500030", d, 6.0, "101"),
            event(2, "2500030", d, 4.5, "101"),
        ];
        for e in &mut shipments {
            e.snapshot.flags.night = true;
        }
        let prices = vec![
            price(ShiftCategory::Night, "夜間 2回転", 5000),
            price(ShiftCategory::Night, "夜間 2回空積", 800),
            price(ShiftCategory::Day, "昼間 2回転", 1),
        ];
        let report = build_daily_report(d, &shipments, &[], &prices);
        let c = &report.contracts[0];
        assert_eq!(c.category, ShiftCategory::Night);
        // No plan rows: k = 1, L = M = 2, X = 0, Y = 2
        assert_eq!(c.lines[0].units, 0);
        assert!((c.lines[0].total + 1.5).abs() < 1e-9);
        assert_eq!(c.lines[1].unit_price, 5000);
        assert_eq!(c.lines[2].item_name, "夜間 2回空積");
        assert_eq!(c.lines[2].unit_price, 800);
        assert!((c.lines[2].amount - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn test_groups_ordered_and_other_days_ignored() {
        let d = june_first();
        let next = d.succ_opt().unwrap();
        let shipments = vec![
            event(1, "2500020", d, 6.0, "101"),
            event(2, "2500010", d, 6.0, "102"),
            event(3, "2500010", next, 6.0, "103"),
        ];
        let report = build_daily_report(d, &shipments, &[], &[]);
        let codes: Vec<_> = report
            .contracts
            .iter()
            .map(|c| c.contract_code.as_str())
            .collect();
        assert_eq!(codes, vec!["2500010", "2500020"]);
        assert_eq!(report.total_shipments(), 2);
    }

    #[test]
    fn test_render_report() {
        let report = build_daily_report(june_first(), &full_loads("2500010", 3), &[], &[]);
        let text = render_daily_report(&report);
        assert!(text.contains("実績管理表"));
        assert!(text.contains("2500010"));
        assert!(text.contains("昼間 3回転"));

        let empty = build_daily_report(june_first(), &[], &[], &[]);
        assert!(render_daily_report(&empty).contains("出荷実績なし"));
    }

    #[test]
    fn test_huge_truck_counts_do_not_overflow() {
        let shipments = full_loads("2500010", 1);
        let plans = vec![
            plan(0, Some("2500010"), Some(u32::MAX)),
            plan(1, Some("2500010"), Some(u32::MAX)),
        ];

        let report = build_daily_report(june_first(), &shipments, &plans, &[]);

        let allocation = report.contracts[0].allocation;
        assert_eq!(allocation.trucks, u32::MAX);
        assert_eq!((allocation.high_units, allocation.low_units), (1, 0));
        assert_eq!(report.contracts[0].lines[0].total, STANDARD_LOAD);
    }
}
