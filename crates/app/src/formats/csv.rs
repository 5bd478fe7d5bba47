use super::{CostReport, ReportFormatter};
use crate::error::{AppError, Result};

/// Comma-separated rows with one column per billing period.
pub struct CsvFormatter;

impl ReportFormatter for CsvFormatter {
    fn render(&self, report: &CostReport) -> Result<Vec<u8>> {
        let mut writer = ::csv::Writer::from_writer(Vec::new());

        let mut header = vec!["Name", "Subscription Name"];
        header.extend(report.periods());
        header.push("Total Costs");
        writer.write_record(&header)?;

        for row in &report.resource_groups {
            let mut record = vec![row.name.clone(), row.subscription_name.clone()];
            record.extend(row.costs.iter().map(|cost| format!("{:.2}", cost.total)));
            record.push(format!("{:.2}", row.total_cost));
            writer.write_record(&record)?;
        }

        writer
            .into_inner()
            .map_err(|err| AppError::Message(format!("flush csv: {}", err)))
    }
}
