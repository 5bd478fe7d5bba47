mod period;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use period::{BillingPeriod, window_start};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid billing period '{0}', expected YYYY-MM")]
    InvalidPeriod(String),
    #[error("invalid month {0}, must be between 1 and 12")]
    InvalidMonth(u32),
    #[error("invalid year {0}")]
    InvalidYear(i32),
    #[error("unknown resource group status '{0}'")]
    InvalidStatus(String),
}

/// Lifecycle snapshot of a resource group, captured when its costs are ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceGroupStatus {
    Active,
    Inactive,
}

impl ResourceGroupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for ResourceGroupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceGroupStatus {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(ParseError::InvalidStatus(other.to_string())),
        }
    }
}

/// Cost of one resource group in one subscription for one billing period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub subscription_id: String,
    pub subscription_name: String,
    pub resource_group: String,
    pub billing_period: BillingPeriod,
    pub cost: f64,
    pub cost_usd: f64,
    pub currency: String,
}

/// A persisted cost row together with its lifecycle snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCost {
    pub id: i64,
    pub record: CostRecord,
    pub status: ResourceGroupStatus,
}

/// A resource group as listed by the live subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub id: String,
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedSubscription {
    pub id: String,
    pub name: String,
}

/// One billing period already present in the store for a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedPeriod {
    pub subscription_name: String,
    pub subscription_id: String,
    pub billing_period: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodCost {
    pub period: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupSummary {
    pub name: String,
    pub subscription_name: String,
    pub active: bool,
    pub costs: Vec<PeriodCost>,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSummary {
    pub name: String,
    pub costs: Vec<PeriodCost>,
    pub total_cost: f64,
}

/// Folds resource group rows into one row per subscription name, ordered by name.
pub fn summarize_subscriptions(groups: &[ResourceGroupSummary]) -> Vec<SubscriptionSummary> {
    let mut by_subscription: BTreeMap<&str, (BTreeMap<&str, f64>, f64)> = BTreeMap::new();
    for group in groups {
        let (periods, total) = by_subscription
            .entry(group.subscription_name.as_str())
            .or_default();
        for cost in &group.costs {
            *periods.entry(cost.period.as_str()).or_insert(0.0) += cost.total;
        }
        *total += group.total_cost;
    }
    by_subscription
        .into_iter()
        .map(|(name, (periods, total_cost))| SubscriptionSummary {
            name: name.to_string(),
            costs: periods
                .into_iter()
                .map(|(period, total)| PeriodCost {
                    period: period.to_string(),
                    total,
                })
                .collect(),
            total_cost,
        })
        .collect()
}
