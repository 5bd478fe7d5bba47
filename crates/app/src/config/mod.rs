use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use costs_core::BillingPeriod;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::util::{ids, time};

/// Largest name match the interactive picker will offer.
pub const MAX_PICKER_MATCHES: usize = 9;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Csv,
    Json,
    Excel,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Excel => "excel",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "excel" => Ok(Self::Excel),
            other => Err(AppError::InvalidInput(format!(
                "a valid format must be specified, got '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// Stdout when requested, otherwise the given path.
    pub fn from_flags(stdout: bool, path: Option<PathBuf>) -> Result<Self> {
        match (stdout, path) {
            (true, _) => Ok(Self::Stdout),
            (false, Some(path)) if !path.as_os_str().is_empty() => Ok(Self::File(path)),
            _ => Err(AppError::InvalidInput(
                "when not writing to stdout an output path must be specified".to_string(),
            )),
        }
    }
}

/// Options for one `generate` run.
#[derive(Clone, Debug)]
pub struct ReportOptions {
    pub format: ReportFormat,
    pub target: OutputTarget,
    pub months: u32,
}

impl ReportOptions {
    pub fn validate(&self) -> Result<()> {
        if self.months == 0 {
            return Err(AppError::InvalidInput(
                "number of months must be greater than 0".to_string(),
            ));
        }
        if self.format == ReportFormat::Excel && self.target == OutputTarget::Stdout {
            return Err(AppError::InvalidInput(
                "excel output cannot be written to stdout and so an output path must be specified"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubscriptionSelector {
    Id(String),
    Name(String),
}

impl SubscriptionSelector {
    /// Id takes precedence over a name filter when both are given.
    pub fn from_flags(id: Option<String>, name: Option<String>) -> Result<Self> {
        let id = id.filter(|value| !value.trim().is_empty());
        let name = name.filter(|value| !value.trim().is_empty());
        match (id, name) {
            (Some(id), _) => Ok(Self::Id(ids::normalize_subscription_id(&id)?)),
            (None, Some(name)) => Ok(Self::Name(name)),
            (None, None) => Err(AppError::InvalidInput(
                "either a subscription id or name must be provided".to_string(),
            )),
        }
    }
}

/// Options for one `collect` run.
#[derive(Clone, Debug)]
pub struct CollectOptions {
    pub subscription: SubscriptionSelector,
    pub year: i32,
    pub month: u32,
    /// Collect only the requested period instead of everything up to now.
    pub single: bool,
    pub overwrite: bool,
    pub truncate: bool,
}

impl CollectOptions {
    /// First billing period to collect, rejected when out of range or in the future.
    pub fn start_period(&self, now: DateTime<Utc>) -> Result<BillingPeriod> {
        time::resolve_billing_period(self.year, self.month, now)
    }

    /// Ordered periods this run targets.
    pub fn periods(&self, now: DateTime<Utc>) -> Result<Vec<BillingPeriod>> {
        let start = self.start_period(now)?;
        Ok(costs_collect::target_periods(
            start,
            BillingPeriod::containing(now),
            self.single,
        ))
    }
}
