use std::collections::HashSet;

use costs_core::{BillingPeriod, CostRecord, ResourceGroup, ResourceGroupStatus};
use rusqlite::{Connection, params};

use crate::Db;
use crate::error::{DbError, Result};
use crate::helpers::billing_from_text;

impl Db {
    /// Writes one subscription's costs for one billing period, tagging each
    /// row `active` when its resource group is in `current_groups`.
    ///
    /// All rows are written in one transaction. Prior rows for the period are
    /// not touched; call [`Db::delete_period`] first, or use
    /// [`Db::replace_period`], to overwrite.
    pub fn save_costs(
        &mut self,
        records: &[CostRecord],
        current_groups: &[ResourceGroup],
    ) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        ensure_single_batch(records)?;
        let tx = self.conn.transaction()?;
        let inserted = insert_costs(&tx, records, current_groups)?;
        tx.commit()?;
        Ok(inserted)
    }

    /// Deletes whatever is stored for `(subscription_id, period)` and writes
    /// `records` in its place, atomically.
    pub fn replace_period(
        &mut self,
        subscription_id: &str,
        period: &BillingPeriod,
        records: &[CostRecord],
        current_groups: &[ResourceGroup],
    ) -> Result<usize> {
        if let Some(stray) = records
            .iter()
            .find(|record| record.subscription_id != subscription_id || record.billing_period != *period)
        {
            return Err(DbError::MixedBatch {
                expected: format!("{} {}", subscription_id, period),
                found: format!("{} {}", stray.subscription_id, stray.billing_period),
            });
        }
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM costs WHERE subscription_id = ?1 AND billing_period = ?2",
            params![subscription_id, period.to_string()],
        )?;
        let inserted = insert_costs(&tx, records, current_groups)?;
        tx.commit()?;
        Ok(inserted)
    }
}

fn ensure_single_batch(records: &[CostRecord]) -> Result<()> {
    let Some(first) = records.first() else {
        return Ok(());
    };
    if let Some(stray) = records.iter().find(|record| {
        record.subscription_id != first.subscription_id
            || record.billing_period != first.billing_period
    }) {
        return Err(DbError::MixedBatch {
            expected: format!("{} {}", first.subscription_id, first.billing_period),
            found: format!("{} {}", stray.subscription_id, stray.billing_period),
        });
    }
    Ok(())
}

/// Resource group names are case-insensitive in Azure, and the billing API
/// reports them lower-cased.
pub(crate) fn status_for(resource_group: &str, live: &HashSet<String>) -> ResourceGroupStatus {
    if live.contains(&resource_group.to_ascii_lowercase()) {
        ResourceGroupStatus::Active
    } else {
        ResourceGroupStatus::Inactive
    }
}

fn insert_costs(
    conn: &Connection,
    records: &[CostRecord],
    current_groups: &[ResourceGroup],
) -> Result<usize> {
    let live: HashSet<String> = current_groups
        .iter()
        .map(|group| group.name.to_ascii_lowercase())
        .collect();
    let mut stmt = conn.prepare(
        r#"
        INSERT INTO costs (
          billing_from, billing_period, resource_group, resource_group_status,
          subscription_name, subscription_id, cost, cost_usd, currency
        ) VALUES (
          ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9
        )
        "#,
    )?;
    let mut inserted = 0usize;
    for record in records {
        let status = status_for(&record.resource_group, &live);
        inserted += stmt.execute(params![
            billing_from_text(&record.billing_period),
            record.billing_period.to_string(),
            record.resource_group,
            status.as_str(),
            record.subscription_name,
            record.subscription_id,
            record.cost,
            record.cost_usd,
            record.currency,
        ])?;
    }
    Ok(inserted)
}
