use async_trait::async_trait;
use costs_core::{BillingPeriod, CostRecord, ResourceGroup, Subscription};

use crate::types::Result;

/// Upstream billing API as seen by the collection pipeline.
#[async_trait]
pub trait BillingSource: Send + Sync {
    /// Per resource group costs for one subscription and billing period.
    async fn resource_group_costs(
        &self,
        subscription_id: &str,
        period: BillingPeriod,
    ) -> Result<Vec<CostRecord>>;

    /// Resource groups that currently exist in the subscription.
    async fn resource_groups(&self, subscription_id: &str) -> Result<Vec<ResourceGroup>>;
}

#[async_trait]
pub trait SubscriptionSource: Send + Sync {
    async fn subscriptions(&self) -> Result<Vec<Subscription>>;

    /// Subscriptions whose display name fuzzily matches `filter`.
    async fn find_subscriptions(&self, filter: &str) -> Result<Vec<Subscription>> {
        let subscriptions = self.subscriptions().await?;
        Ok(subscriptions
            .into_iter()
            .filter(|subscription| crate::matches_subscription_filter(filter, &subscription.name))
            .collect())
    }
}
