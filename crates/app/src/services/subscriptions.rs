use std::collections::HashSet;

use costs_collect::SubscriptionSource;
use costs_core::Subscription;
use costs_db::Db;

use crate::error::Result;
use crate::services::column;

/// A subscription visible to the signed-in account, with its local status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionListing {
    pub subscription: Subscription,
    pub collected: bool,
}

#[derive(Clone, Debug, Default)]
pub struct SubscriptionService;

impl SubscriptionService {
    /// Subscriptions sorted by name, optionally narrowed by a fuzzy name filter.
    pub async fn list<S>(
        &self,
        db: &Db,
        source: &S,
        filter: Option<&str>,
    ) -> Result<Vec<SubscriptionListing>>
    where
        S: SubscriptionSource + ?Sized,
    {
        let mut subscriptions = match filter.filter(|value| !value.trim().is_empty()) {
            Some(filter) => source.find_subscriptions(filter).await?,
            None => source.subscriptions().await?,
        };
        subscriptions.sort_by(|a, b| a.name.cmp(&b.name));

        let collected: HashSet<String> = db
            .collected_subscriptions()?
            .into_iter()
            .map(|subscription| subscription.id.to_ascii_lowercase())
            .collect();

        Ok(subscriptions
            .into_iter()
            .map(|subscription| SubscriptionListing {
                collected: collected.contains(&subscription.id.to_ascii_lowercase()),
                subscription,
            })
            .collect())
    }
}

pub fn render_listings(listings: &[SubscriptionListing]) -> String {
    let mut out = format!(
        "{} {} {}\n{} {} {}\n",
        column("Subscription", 50),
        column("Subscription Id", 37),
        "Collected",
        "=".repeat(50),
        "=".repeat(37),
        "=".repeat(10)
    );
    for listing in listings {
        out.push_str(&format!(
            "{} {} {}\n",
            column(&listing.subscription.name, 50),
            column(&listing.subscription.id, 37),
            if listing.collected { "Yes" } else { "No" }
        ));
    }
    out
}
