mod azure;
mod pipeline;
mod source;
mod types;

pub use azure::{AzureClient, TokenProvider, matches_subscription_filter};
pub use pipeline::{collect, target_periods};
pub use source::{BillingSource, SubscriptionSource};
pub use types::{CollectError, CollectRequest, CollectStats, Result};
