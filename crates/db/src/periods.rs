use chrono::{DateTime, SecondsFormat, Utc};
use costs_core::{BillingPeriod, CollectedPeriod, CollectedSubscription, StoredCost, window_start};
use rusqlite::params;

use crate::Db;
use crate::error::Result;
use crate::helpers::row_to_raw_cost;

impl Db {
    /// Distinct billing periods already stored for a subscription, ascending.
    pub fn subscription_periods(&self, subscription_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT DISTINCT billing_period
            FROM costs
            WHERE subscription_id = ?1
            ORDER BY billing_period
            "#,
        )?;
        let rows = stmt.query_map(params![subscription_id], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Distinct billing periods, across every subscription, whose start falls
    /// within the trailing `window_months` months.
    pub fn all_periods(&self, window_months: u32) -> Result<Vec<String>> {
        self.all_periods_at(window_months, Utc::now())
    }

    pub fn all_periods_at(&self, window_months: u32, now: DateTime<Utc>) -> Result<Vec<String>> {
        let since = window_start(window_months, now).to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut stmt = self.conn.prepare(
            r#"
            SELECT DISTINCT billing_period
            FROM costs
            WHERE datetime(billing_from) >= datetime(?1)
            ORDER BY billing_period
            "#,
        )?;
        let rows = stmt.query_map(params![since], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Removes every row stored for `(subscription_id, period)`.
    pub fn delete_period(&self, subscription_id: &str, period: &str) -> Result<usize> {
        Ok(self.conn.execute(
            "DELETE FROM costs WHERE subscription_id = ?1 AND billing_period = ?2",
            params![subscription_id, period],
        )?)
    }

    pub fn count_costs(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM costs", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Collected periods for every subscription, ordered by subscription name then period.
    pub fn collection_status(&self) -> Result<Vec<CollectedPeriod>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT DISTINCT subscription_name, subscription_id, billing_period
            FROM costs
            ORDER BY subscription_name, subscription_id, billing_period
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CollectedPeriod {
                subscription_name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                subscription_id: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                billing_period: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn collected_subscriptions(&self) -> Result<Vec<CollectedSubscription>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT DISTINCT subscription_id, subscription_name
            FROM costs
            WHERE subscription_id IS NOT NULL
            ORDER BY subscription_name, subscription_id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CollectedSubscription {
                id: row.get(0)?,
                name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Rows stored for one subscription and period, in insertion order.
    pub fn costs_for_period(
        &self,
        subscription_id: &str,
        period: &BillingPeriod,
    ) -> Result<Vec<StoredCost>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, subscription_id, subscription_name, resource_group, billing_period,
                   cost, cost_usd, currency, resource_group_status
            FROM costs
            WHERE subscription_id = ?1 AND billing_period = ?2
            ORDER BY id ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![subscription_id, period.to_string()], row_to_raw_cost)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(|row| row.into_stored()).collect()
    }
}
