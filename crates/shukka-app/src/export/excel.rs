//! Excel export of the daily performance report

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::info;

use shukka_domain::service::{DailyReport, ReportLineKind};
use shukka_types::{Error, Result};

fn xlsx_err(e: rust_xlsxwriter::XlsxError) -> Error {
    Error::Excel(e.to_string())
}

/// Export the report to `output_path` with a summary sheet and a line sheet
pub fn export_daily_report(report: &DailyReport, output_path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let summary_sheet = workbook.add_worksheet();
    write_summary_sheet(summary_sheet, report)?;

    let lines_sheet = workbook.add_worksheet();
    write_lines_sheet(lines_sheet, report)?;

    workbook.save(output_path).map_err(xlsx_err)?;

    info!(path = %output_path.display(), date = %report.date, "exported daily report");
    Ok(())
}

fn write_summary_sheet(sheet: &mut Worksheet, report: &DailyReport) -> Result<()> {
    sheet.set_name("Summary").map_err(xlsx_err)?;

    let header_format = Format::new().set_bold();

    sheet
        .write_string_with_format(0, 0, "実績管理表", &header_format)
        .map_err(xlsx_err)?;
    sheet.write_string(2, 0, "日付").map_err(xlsx_err)?;
    sheet
        .write_string(2, 1, report.date.format("%Y-%m-%d").to_string())
        .map_err(xlsx_err)?;
    sheet.write_string(3, 0, "契約数").map_err(xlsx_err)?;
    sheet
        .write_number(3, 1, report.contracts.len() as f64)
        .map_err(xlsx_err)?;
    sheet.write_string(4, 0, "出荷台数").map_err(xlsx_err)?;
    sheet
        .write_number(4, 1, report.total_shipments() as f64)
        .map_err(xlsx_err)?;
    sheet.write_string(5, 0, "金額合計").map_err(xlsx_err)?;
    sheet
        .write_number(5, 1, report.total_amount())
        .map_err(xlsx_err)?;

    let headers = ["契約番号", "現場名", "得意先", "区分", "台数", "車両数", "出荷量", "空積差", "金額"];
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(7, col as u16, *header, &header_format)
            .map_err(xlsx_err)?;
    }

    for (idx, contract) in report.contracts.iter().enumerate() {
        let row = 8 + idx as u32;
        sheet
            .write_string(row, 0, contract.contract_code.as_str())
            .map_err(xlsx_err)?;
        sheet.write_string(row, 1, &contract.site).map_err(xlsx_err)?;
        sheet
            .write_string(row, 2, &contract.customer)
            .map_err(xlsx_err)?;
        sheet
            .write_string(row, 3, contract.category.label())
            .map_err(xlsx_err)?;
        sheet
            .write_number(row, 4, contract.allocation.shipments as f64)
            .map_err(xlsx_err)?;
        sheet
            .write_number(row, 5, contract.allocation.trucks as f64)
            .map_err(xlsx_err)?;
        sheet
            .write_number(row, 6, contract.shipped_quantity)
            .map_err(xlsx_err)?;
        sheet
            .write_number(row, 7, contract.short_diff)
            .map_err(xlsx_err)?;
        sheet
            .write_number(row, 8, contract.amount())
            .map_err(xlsx_err)?;
    }

    Ok(())
}

fn write_lines_sheet(sheet: &mut Worksheet, report: &DailyReport) -> Result<()> {
    sheet.set_name("Lines").map_err(xlsx_err)?;

    let header_format = Format::new().set_bold();
    let headers = ["契約番号", "現場名", "種別", "項目名", "回転数", "単位数", "数量(m³)", "単価", "金額"];
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(xlsx_err)?;
    }

    let mut row = 1u32;
    for contract in &report.contracts {
        for line in &contract.lines {
            let kind = match line.kind {
                ReportLineKind::HighTier => "上位",
                ReportLineKind::LowTier => "下位",
                ReportLineKind::EmptyRun => "空積",
            };
            sheet
                .write_string(row, 0, contract.contract_code.as_str())
                .map_err(xlsx_err)?;
            sheet.write_string(row, 1, &contract.site).map_err(xlsx_err)?;
            sheet.write_string(row, 2, kind).map_err(xlsx_err)?;
            sheet.write_string(row, 3, &line.item_name).map_err(xlsx_err)?;
            sheet
                .write_number(row, 4, line.rotation as f64)
                .map_err(xlsx_err)?;
            sheet
                .write_number(row, 5, line.units as f64)
                .map_err(xlsx_err)?;
            sheet.write_number(row, 6, line.total).map_err(xlsx_err)?;
            sheet
                .write_number(row, 7, line.unit_price as f64)
                .map_err(xlsx_err)?;
            sheet.write_number(row, 8, line.amount).map_err(xlsx_err)?;
            row += 1;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn test_export_empty_report_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        let report = DailyReport {
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            contracts: Vec::new(),
        };

        export_daily_report(&report, &path).unwrap();

        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
