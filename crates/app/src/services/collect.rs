use chrono::{DateTime, Utc};
use costs_collect::{BillingSource, CollectRequest, CollectStats, SubscriptionSource};
use costs_core::Subscription;
use costs_db::Db;
use tracing::info;

use crate::config::{CollectOptions, MAX_PICKER_MATCHES};
use crate::error::{AppError, Result};

/// Outcome of resolving a subscription name filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubscriptionChoice {
    Single(Subscription),
    /// Several matches; the caller must pick one.
    Ambiguous(Vec<Subscription>),
}

#[derive(Clone, Debug, Default)]
pub struct CollectService;

impl CollectService {
    /// Looks up subscriptions matching `filter`, sorted by name.
    ///
    /// No match and more than [`MAX_PICKER_MATCHES`] matches are both errors.
    pub async fn resolve_subscription<S>(&self, source: &S, filter: &str) -> Result<SubscriptionChoice>
    where
        S: SubscriptionSource + ?Sized,
    {
        let mut matches = source.find_subscriptions(filter).await?;
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        match matches.len() {
            0 => Err(AppError::NotFound(
                "no subscriptions found matching the provided name".to_string(),
            )),
            1 => Ok(SubscriptionChoice::Single(matches.remove(0))),
            count if count > MAX_PICKER_MATCHES => Err(AppError::InvalidInput(
                "too many subscriptions returned from filter, please try providing a more precise matching term"
                    .to_string(),
            )),
            _ => Ok(SubscriptionChoice::Ambiguous(matches)),
        }
    }

    /// Collects the periods named by `options` for an already resolved subscription id.
    pub async fn run<S>(
        &self,
        db: &mut Db,
        source: &S,
        subscription_id: &str,
        options: &CollectOptions,
        now: DateTime<Utc>,
    ) -> Result<CollectStats>
    where
        S: BillingSource + ?Sized,
    {
        let request = CollectRequest {
            subscription_id: subscription_id.to_string(),
            periods: options.periods(now)?,
            overwrite: options.overwrite,
        };
        let stats = costs_collect::collect(db, source, &request).await?;
        info!(
            subscription = subscription_id,
            collected = stats.periods_collected.len(),
            skipped = stats.periods_skipped.len(),
            rows = stats.rows_written,
            "collection finished"
        );
        Ok(stats)
    }
}
