use chrono::{DateTime, Utc};
use costs_core::summarize_subscriptions;
use costs_db::Db;

use crate::config::ReportOptions;
use crate::error::Result;
use crate::formats::{CostReport, formatter_for, write_output};

#[derive(Clone, Debug, Default)]
pub struct ReportService;

impl ReportService {
    /// Summarizes the trailing `months` months as of `now`.
    pub fn build(&self, db: &Db, months: u32, now: DateTime<Utc>) -> Result<CostReport> {
        let groups = db.summarize_by_resource_group_at(months, now)?;
        let subscriptions = summarize_subscriptions(&groups);
        Ok(CostReport::new(now, groups, subscriptions))
    }

    pub fn render(&self, db: &Db, options: &ReportOptions, now: DateTime<Utc>) -> Result<Vec<u8>> {
        options.validate()?;
        let report = self.build(db, options.months, now)?;
        formatter_for(options.format).render(&report)
    }

    /// Renders the report and writes it to the requested target.
    pub fn generate(&self, db: &Db, options: &ReportOptions) -> Result<()> {
        let rendered = self.render(db, options, Utc::now())?;
        write_output(&options.target, &rendered)
    }
}
