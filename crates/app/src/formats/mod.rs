//! Renderers for the resource group cost report.

mod csv;
mod excel;
mod json;
mod text;

use std::fs;
use std::io::{self, Write};

use chrono::{DateTime, Utc};
use costs_core::{ResourceGroupSummary, SubscriptionSummary};
use serde::Serialize;

use crate::config::{OutputTarget, ReportFormat};
use crate::error::Result;

pub use self::csv::CsvFormatter;
pub use self::excel::ExcelFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

/// A finished report, ready to render.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostReport {
    pub generated: DateTime<Utc>,
    pub resource_group_count: usize,
    pub total_cost: f64,
    pub resource_groups: Vec<ResourceGroupSummary>,
    pub subscriptions: Vec<SubscriptionSummary>,
}

impl CostReport {
    pub fn new(
        generated: DateTime<Utc>,
        resource_groups: Vec<ResourceGroupSummary>,
        subscriptions: Vec<SubscriptionSummary>,
    ) -> Self {
        let total_cost = resource_groups.iter().map(|row| row.total_cost).sum();
        Self {
            generated,
            resource_group_count: resource_groups.len(),
            total_cost,
            resource_groups,
            subscriptions,
        }
    }

    /// Period labels shared by every row.
    pub fn periods(&self) -> Vec<&str> {
        self.resource_groups
            .first()
            .map(|row| row.costs.iter().map(|cost| cost.period.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Renders a report to the bytes written to the output target.
pub trait ReportFormatter {
    fn render(&self, report: &CostReport) -> Result<Vec<u8>>;
}

pub fn formatter_for(format: ReportFormat) -> Box<dyn ReportFormatter> {
    match format {
        ReportFormat::Text => Box::new(TextFormatter),
        ReportFormat::Csv => Box::new(CsvFormatter),
        ReportFormat::Json => Box::new(JsonFormatter),
        ReportFormat::Excel => Box::new(ExcelFormatter),
    }
}

/// Writes `rendered` to stdout or replaces the target file.
pub fn write_output(target: &OutputTarget, rendered: &[u8]) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered)?;
            stdout.flush()?;
        }
        OutputTarget::File(path) => fs::write(path, rendered)?,
    }
    Ok(())
}

/// Cuts `value` to at most `max` characters.
pub(crate) fn truncate_chars(value: &str, max: usize) -> &str {
    match value.char_indices().nth(max) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_totals_all_rows() {
        let report = fixtures::report();
        assert_eq!(report.resource_group_count, 2);
        assert_eq!(report.total_cost, 13.75);
        assert_eq!(report.periods(), vec!["2024-01", "2024-02"]);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn file_output_replaces_existing_content() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("report.txt");
        fs::write(&path, "old content that is longer").expect("seed");
        write_output(&OutputTarget::File(path.clone()), b"new").expect("write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "new");
    }
}
