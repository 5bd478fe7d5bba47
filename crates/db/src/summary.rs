use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, SecondsFormat, Utc};
use costs_core::{PeriodCost, ResourceGroupStatus, ResourceGroupSummary, window_start};
use rusqlite::params;

use crate::Db;
use crate::error::{DbError, Result};
use crate::helpers::{parse_status, value_to_f64};

/// (resource group, subscription name)
type GroupKey = (String, String);

impl Db {
    /// One row per resource group with one cost column per billing period
    /// found in the trailing `window_months` months.
    ///
    /// Fails with [`DbError::NoData`] when nothing has been collected and with
    /// [`DbError::EmptyWindow`] when data exists but none of it falls in the window.
    pub fn summarize_by_resource_group(
        &self,
        window_months: u32,
    ) -> Result<Vec<ResourceGroupSummary>> {
        self.summarize_by_resource_group_at(window_months, Utc::now())
    }

    pub fn summarize_by_resource_group_at(
        &self,
        window_months: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<ResourceGroupSummary>> {
        let periods = self.all_periods_at(window_months, now)?;
        if periods.is_empty() {
            if self.count_costs()? == 0 {
                return Err(DbError::NoData);
            }
            return Err(DbError::EmptyWindow {
                months: window_months,
            });
        }

        let since = window_start(window_months, now).to_rfc3339_opts(SecondsFormat::Secs, true);
        let totals = self.period_totals_since(&since)?;
        let statuses = self.latest_statuses()?;

        let mut summary = Vec::with_capacity(totals.len());
        for (key, by_period) in totals {
            let costs: Vec<PeriodCost> = periods
                .iter()
                .map(|period| PeriodCost {
                    period: period.clone(),
                    total: by_period.get(period).copied().unwrap_or(0.0),
                })
                .collect();
            let total_cost = costs.iter().map(|cost| cost.total).sum();
            let active = statuses
                .get(&key)
                .is_some_and(|status| status.is_active());
            let (name, subscription_name) = key;
            summary.push(ResourceGroupSummary {
                name,
                subscription_name,
                active,
                costs,
                total_cost,
            });
        }
        Ok(summary)
    }

    /// Summed cost per group and period for rows starting at or after `since`.
    /// The map is keyed so iteration follows resource group name, then subscription.
    fn period_totals_since(&self, since: &str) -> Result<BTreeMap<GroupKey, HashMap<String, f64>>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT resource_group, subscription_name, billing_period, SUM(cost)
            FROM costs
            WHERE datetime(billing_from) >= datetime(?1)
            GROUP BY resource_group, subscription_name, billing_period
            "#,
        )?;
        let mut rows = stmt.query(params![since])?;
        let mut totals: BTreeMap<GroupKey, HashMap<String, f64>> = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let resource_group: Option<String> = row.get(0)?;
            let subscription_name: Option<String> = row.get(1)?;
            let period: String = row.get(2)?;
            let cost = value_to_f64(row.get_ref(3)?);
            *totals
                .entry((
                    resource_group.unwrap_or_default(),
                    subscription_name.unwrap_or_default(),
                ))
                .or_default()
                .entry(period)
                .or_insert(0.0) += cost;
        }
        Ok(totals)
    }

    /// Status of each group's chronologically latest row across the whole store.
    fn latest_statuses(&self) -> Result<HashMap<GroupKey, ResourceGroupStatus>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT resource_group, subscription_name, resource_group_status
            FROM costs
            ORDER BY datetime(billing_from) ASC, id ASC
            "#,
        )?;
        let mut rows = stmt.query([])?;
        let mut latest = HashMap::new();
        while let Some(row) = rows.next()? {
            let resource_group: Option<String> = row.get(0)?;
            let subscription_name: Option<String> = row.get(1)?;
            let status: String = row.get(2)?;
            latest.insert(
                (
                    resource_group.unwrap_or_default(),
                    subscription_name.unwrap_or_default(),
                ),
                parse_status(&status)?,
            );
        }
        Ok(latest)
    }
}
