use chrono::SecondsFormat;
use costs_core::{BillingPeriod, CostRecord, ResourceGroupStatus, StoredCost};
use rusqlite::Row;
use rusqlite::types::ValueRef;

use crate::error::{DbError, Result};

/// Numeric columns may come back as integers or reals depending on the
/// column affinity the row was written under; anything else counts as zero.
pub(crate) fn value_to_f64(value: ValueRef<'_>) -> f64 {
    match value {
        ValueRef::Integer(value) => value as f64,
        ValueRef::Real(value) => value,
        ValueRef::Null | ValueRef::Text(_) | ValueRef::Blob(_) => 0.0,
    }
}

pub(crate) fn billing_from_text(period: &BillingPeriod) -> String {
    period.start().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) struct RawCostRow {
    id: i64,
    subscription_id: Option<String>,
    subscription_name: Option<String>,
    resource_group: Option<String>,
    billing_period: String,
    cost: f64,
    cost_usd: f64,
    currency: Option<String>,
    status: String,
}

pub(crate) fn row_to_raw_cost(row: &Row<'_>) -> std::result::Result<RawCostRow, rusqlite::Error> {
    Ok(RawCostRow {
        id: row.get(0)?,
        subscription_id: row.get(1)?,
        subscription_name: row.get(2)?,
        resource_group: row.get(3)?,
        billing_period: row.get(4)?,
        cost: value_to_f64(row.get_ref(5)?),
        cost_usd: value_to_f64(row.get_ref(6)?),
        currency: row.get(7)?,
        status: row.get(8)?,
    })
}

impl RawCostRow {
    pub(crate) fn into_stored(self) -> Result<StoredCost> {
        Ok(StoredCost {
            id: self.id,
            record: CostRecord {
                subscription_id: self.subscription_id.unwrap_or_default(),
                subscription_name: self.subscription_name.unwrap_or_default(),
                resource_group: self.resource_group.unwrap_or_default(),
                billing_period: self.billing_period.parse()?,
                cost: self.cost,
                cost_usd: self.cost_usd,
                currency: self.currency.unwrap_or_default(),
            },
            status: parse_status(&self.status)?,
        })
    }
}

pub(crate) fn parse_status(value: &str) -> Result<ResourceGroupStatus> {
    value.parse::<ResourceGroupStatus>().map_err(DbError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_to_f64_coerces_numeric_affinities() {
        assert_eq!(value_to_f64(ValueRef::Integer(42)), 42.0);
        assert_eq!(value_to_f64(ValueRef::Integer(-7)), -7.0);
        assert_eq!(value_to_f64(ValueRef::Real(12.5)), 12.5);
    }

    #[test]
    fn value_to_f64_defaults_unknown_types_to_zero() {
        assert_eq!(value_to_f64(ValueRef::Null), 0.0);
        assert_eq!(value_to_f64(ValueRef::Text(b"12.5")), 0.0);
        assert_eq!(value_to_f64(ValueRef::Blob(&[1, 2, 3])), 0.0);
    }

    #[test]
    fn billing_from_text_is_utc_month_start() {
        let period = BillingPeriod::new(2024, 7).expect("period");
        assert_eq!(billing_from_text(&period), "2024-07-01T00:00:00Z");
    }
}
