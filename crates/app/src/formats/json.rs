use super::{CostReport, ReportFormatter};
use crate::error::Result;

pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn render(&self, report: &CostReport) -> Result<Vec<u8>> {
        let mut rendered = serde_json::to_vec_pretty(report)?;
        rendered.push(b'\n');
        Ok(rendered)
    }
}
