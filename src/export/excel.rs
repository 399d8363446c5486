//! Excel export for billing reports

use crate::error::{Error, Result};
use crate::report::BillingReport;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;

/// Export a billing report to an Excel workbook (summary + period sheets).
pub fn export_billing_to_excel(report: &BillingReport, output_path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let summary_sheet = workbook.add_worksheet();
    write_summary_sheet(summary_sheet, report)?;

    let periods_sheet = workbook.add_worksheet();
    write_periods_sheet(periods_sheet, report)?;

    workbook
        .save(output_path)
        .map_err(|e| Error::Excel(e.to_string()))?;

    Ok(())
}

fn write_summary_sheet(sheet: &mut Worksheet, report: &BillingReport) -> Result<()> {
    sheet
        .set_name("Summary")
        .map_err(|e| Error::Excel(e.to_string()))?;

    let header_format = Format::new().set_bold();

    sheet
        .write_string_with_format(0, 0, "Port Tracker Billing Report", &header_format)
        .map_err(|e| Error::Excel(e.to_string()))?;

    sheet
        .write_string(2, 0, "From:")
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .write_string(2, 1, &report.start.to_rfc3339())
        .map_err(|e| Error::Excel(e.to_string()))?;

    sheet
        .write_string(3, 0, "To:")
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .write_string(3, 1, &report.end.to_rfc3339())
        .map_err(|e| Error::Excel(e.to_string()))?;

    sheet
        .write_string(4, 0, "Vessel:")
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .write_string(4, 1, report.vessel.as_deref().unwrap_or("(all)"))
        .map_err(|e| Error::Excel(e.to_string()))?;

    sheet
        .write_string(5, 0, "Grand total:")
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .write_number(5, 1, report.grand_total)
        .map_err(|e| Error::Excel(e.to_string()))?;

    sheet
        .write_string(6, 0, "Records without tariff:")
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .write_number(6, 1, report.unpriced_records as f64)
        .map_err(|e| Error::Excel(e.to_string()))?;

    Ok(())
}

fn write_periods_sheet(sheet: &mut Worksheet, report: &BillingReport) -> Result<()> {
    sheet
        .set_name("Periods")
        .map_err(|e| Error::Excel(e.to_string()))?;

    let header_format = Format::new().set_bold();

    sheet
        .write_string_with_format(0, 0, "Period", &header_format)
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .write_string_with_format(0, 1, "Total", &header_format)
        .map_err(|e| Error::Excel(e.to_string()))?;

    for (row_idx, row) in report.rows.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        sheet
            .write_string(excel_row, 0, &row.period)
            .map_err(|e| Error::Excel(e.to_string()))?;
        sheet
            .write_number(excel_row, 1, row.total)
            .map_err(|e| Error::Excel(e.to_string()))?;
    }

    sheet
        .set_column_width(0, 16)
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .set_column_width(1, 14)
        .map_err(|e| Error::Excel(e.to_string()))?;

    Ok(())
}
