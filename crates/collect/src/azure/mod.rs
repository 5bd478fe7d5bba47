//! Client for the Azure Resource Manager endpoints the collector needs:
//! Cost Management queries, resource group listings and subscription listings.

mod costs;
mod listing;
mod token;

use std::time::Duration;

use async_trait::async_trait;
use costs_core::{BillingPeriod, CostRecord, ResourceGroup, Subscription};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::source::{BillingSource, SubscriptionSource};
use crate::types::{CollectError, Result};

pub use listing::matches_subscription_filter;
pub use token::TokenProvider;

pub(crate) const MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";
const RETRY_LIMIT: u32 = 3;
const DEFAULT_RETRY_AFTER_SECS: f64 = 40.0;
const RETRY_AFTER_HEADER: &str = "x-ms-ratelimit-microsoft.costmanagement-entity-retry-after";
const LISTING_TIMEOUT: Duration = Duration::from_secs(10);

pub struct AzureClient {
    http: reqwest::Client,
    endpoint: String,
    token: TokenProvider,
}

impl AzureClient {
    /// Client against the public Azure management endpoint, authenticated
    /// from `AZURE_ACCESS_TOKEN` or the Azure CLI.
    pub fn new() -> Result<Self> {
        Self::with_endpoint(MANAGEMENT_ENDPOINT, TokenProvider::from_env())
    }

    pub fn with_endpoint(endpoint: impl Into<String>, token: TokenProvider) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("azcosts/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Sends the request built by `build`, retrying on HTTP 429 up to
    /// [`RETRY_LIMIT`] attempts. Any other non-success status fails at once.
    async fn send_with_retry<F>(&self, build: F) -> Result<reqwest::Response>
    where
        F: Fn(&str) -> reqwest::RequestBuilder,
    {
        let token = self.token.token().await?;
        for attempt in 1..=RETRY_LIMIT {
            debug!(attempt, "sending management api request");
            let response = build(&token).send().await?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }
            if status == StatusCode::TOO_MANY_REQUESTS {
                let header = response
                    .headers()
                    .get(RETRY_AFTER_HEADER)
                    .and_then(|value| value.to_str().ok());
                let wait = retry_after(header)?;
                warn!(
                    attempt,
                    seconds = wait.as_secs_f64(),
                    "API request throttled, attempting again"
                );
                if attempt < RETRY_LIMIT {
                    tokio::time::sleep(wait).await;
                }
                continue;
            }
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "No response body".to_string());
            return Err(CollectError::Status {
                status: status.to_string(),
                body,
            });
        }
        Err(CollectError::Throttled {
            attempts: RETRY_LIMIT,
        })
    }
}

/// Backoff requested by a throttled response, in (possibly fractional) seconds.
fn retry_after(header: Option<&str>) -> Result<Duration> {
    let seconds = match header.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value.parse::<f64>().map_err(|_| {
            CollectError::Malformed(format!("unable to parse retry duration: {value}"))
        })?,
        None => DEFAULT_RETRY_AFTER_SECS,
    };
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| CollectError::Malformed(format!("unable to parse retry duration: {seconds}")))
}

#[async_trait]
impl BillingSource for AzureClient {
    async fn resource_group_costs(
        &self,
        subscription_id: &str,
        period: BillingPeriod,
    ) -> Result<Vec<CostRecord>> {
        self.query_costs(subscription_id, period).await
    }

    async fn resource_groups(&self, subscription_id: &str) -> Result<Vec<ResourceGroup>> {
        self.list_resource_groups(subscription_id).await
    }
}

#[async_trait]
impl SubscriptionSource for AzureClient {
    async fn subscriptions(&self) -> Result<Vec<Subscription>> {
        self.list_subscriptions().await
    }
}
