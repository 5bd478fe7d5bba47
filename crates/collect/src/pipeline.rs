use std::collections::HashSet;

use costs_core::{BillingPeriod, CostRecord};
use costs_db::Db;
use tracing::{debug, info};

use crate::source::BillingSource;
use crate::types::{CollectRequest, CollectStats, Result};

/// Periods to collect: just `start` when `single`, otherwise every period
/// from `start` through `current` inclusive.
pub fn target_periods(start: BillingPeriod, current: BillingPeriod, single: bool) -> Vec<BillingPeriod> {
    if single {
        return vec![start];
    }
    start.through(current)
}

/// Fetches and stores every requested period that is not already collected.
///
/// Each period is replaced in its own transaction, so a failure part way
/// through leaves the periods before it committed and the run can be resumed.
pub async fn collect<S>(db: &mut Db, source: &S, request: &CollectRequest) -> Result<CollectStats>
where
    S: BillingSource + ?Sized,
{
    let subscription_id = request.subscription_id.as_str();
    let existing: HashSet<String> = db
        .subscription_periods(subscription_id)?
        .into_iter()
        .collect();

    let mut stats = CollectStats::default();
    let mut pending = Vec::new();
    for period in &request.periods {
        if existing.contains(&period.to_string()) && !request.overwrite {
            info!(subscription = subscription_id, period = %period, "period already collected, skipping");
            stats.periods_skipped.push(*period);
        } else {
            pending.push(*period);
        }
    }
    if pending.is_empty() {
        return Ok(stats);
    }

    let groups = source.resource_groups(subscription_id).await?;
    debug!(subscription = subscription_id, groups = groups.len(), "fetched resource groups");

    for period in pending {
        let records = source.resource_group_costs(subscription_id, period).await?;
        let records = align_subscription_id(records, subscription_id);
        let written = db.replace_period(subscription_id, &period, &records, &groups)?;
        info!(
            subscription = subscription_id,
            period = %period,
            rows = written,
            "collected and saved billing data"
        );
        stats.rows_written += written;
        stats.periods_collected.push(period);
    }
    Ok(stats)
}

/// The billing API reports ids in its own casing; store them under the id
/// the caller asked for.
fn align_subscription_id(records: Vec<CostRecord>, subscription_id: &str) -> Vec<CostRecord> {
    records
        .into_iter()
        .map(|mut record| {
            if record.subscription_id.eq_ignore_ascii_case(subscription_id) {
                record.subscription_id = subscription_id.to_string();
            }
            record
        })
        .collect()
}
