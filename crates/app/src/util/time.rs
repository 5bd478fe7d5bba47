use chrono::{DateTime, Utc};
use costs_core::{BillingPeriod, ParseError};

use crate::error::{AppError, Result};

/// Billing period for `year`/`month`, rejected when the month is out of range
/// or the period starts after `now`.
pub fn resolve_billing_period(year: i32, month: u32, now: DateTime<Utc>) -> Result<BillingPeriod> {
    let period = BillingPeriod::new(year, month).map_err(|err| match err {
        ParseError::InvalidMonth(_) => {
            AppError::InvalidInput("invalid month, must be between 1 and 12".to_string())
        }
        other => AppError::InvalidInput(other.to_string()),
    })?;
    if period.is_after(now) {
        return Err(AppError::InvalidInput(
            "invalid billing period, must be in the past".to_string(),
        ));
    }
    Ok(period)
}
