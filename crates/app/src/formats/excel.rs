use rust_xlsxwriter::{Format, FormatAlign, Sparkline, Workbook, Worksheet};

use super::{CostReport, ReportFormatter};
use crate::error::Result;

const COST_FORMAT: &str = "#,##0.00;(#,##0.00);-";
const COST_COLUMN_WIDTH: f64 = 15.0;
const TREND_STYLE: u8 = 18;

/// Workbook with a per-subscription roll-up sheet followed by the resource group costs.
pub struct ExcelFormatter;

impl ReportFormatter for ExcelFormatter {
    fn render(&self, report: &CostReport) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let cost = Format::new()
            .set_num_format(COST_FORMAT)
            .set_align(FormatAlign::Right);
        let periods = report.periods();

        let sheet = workbook.add_worksheet();
        sheet.set_name("Subscriptions")?;
        let rows: Vec<(Vec<&str>, Vec<f64>, f64)> = report
            .subscriptions
            .iter()
            .map(|subscription| {
                (
                    vec![subscription.name.as_str()],
                    subscription.costs.iter().map(|cost| cost.total).collect(),
                    subscription.total_cost,
                )
            })
            .collect();
        write_sheet(sheet, &["Subscription"], &periods, &rows, &header, &cost)?;

        let sheet = workbook.add_worksheet();
        sheet.set_name("Costs")?;
        for (index, row) in report.resource_groups.iter().enumerate() {
            sheet.write_boolean(index as u32 + 1, 2, row.active)?;
        }
        let rows: Vec<(Vec<&str>, Vec<f64>, f64)> = report
            .resource_groups
            .iter()
            .map(|row| {
                (
                    vec![row.name.as_str(), row.subscription_name.as_str()],
                    row.costs.iter().map(|cost| cost.total).collect(),
                    row.total_cost,
                )
            })
            .collect();
        write_sheet(
            sheet,
            &["Resource Group", "Subscription", "Active"],
            &periods,
            &rows,
            &header,
            &cost,
        )?;

        Ok(workbook.save_to_buffer()?)
    }
}

/// Writes the header row, one row per entry and a trend sparkline in the last column.
///
/// Cells in `fixed` columns past a row's labels, such as the Active flag, are
/// written by the caller.
fn write_sheet(
    sheet: &mut Worksheet,
    fixed: &[&str],
    periods: &[&str],
    rows: &[(Vec<&str>, Vec<f64>, f64)],
    header: &Format,
    cost: &Format,
) -> Result<()> {
    let first_cost = fixed.len() as u16;
    let total_col = first_cost + periods.len() as u16;
    let change_col = total_col + 1;

    let titles = fixed
        .iter()
        .chain(periods.iter())
        .chain(["Total Cost", "Change"].iter());
    for (col, title) in titles.enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, header)?;
    }

    let sheet_name = sheet.name();
    let mut widths: Vec<usize> = fixed.iter().map(|title| title.len()).collect();
    for (index, (labels, costs, total)) in rows.iter().enumerate() {
        let row = index as u32 + 1;
        for (col, label) in labels.iter().enumerate() {
            sheet.write_string(row, col as u16, *label)?;
            widths[col] = widths[col].max(label.chars().count());
        }
        for (offset, value) in costs.iter().enumerate() {
            sheet.write_number_with_format(row, first_cost + offset as u16, *value, cost)?;
        }
        sheet.write_number_with_format(row, total_col, *total, cost)?;
        if !periods.is_empty() {
            let trend = Sparkline::new()
                .set_range((sheet_name.as_str(), row, first_cost, row, total_col - 1))
                .show_markers(true)
                .set_style(TREND_STYLE);
            sheet.add_sparkline(row, change_col, &trend)?;
        }
    }

    for (col, width) in widths.iter().enumerate() {
        sheet.set_column_width(col as u16, (*width as f64 * 0.9).max(8.0))?;
    }
    for col in first_cost..=total_col {
        sheet.set_column_width(col, COST_COLUMN_WIDTH)?;
    }
    sheet.set_column_width(change_col, (periods.len() as f64 * 3.0).max(8.0))?;
    Ok(())
}
