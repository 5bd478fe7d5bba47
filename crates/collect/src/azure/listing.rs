use costs_core::{ResourceGroup, Subscription};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{AzureClient, LISTING_TIMEOUT};
use crate::types::{CollectError, Result};

const RESOURCE_GROUP_API_VERSION: &str = "2021-04-01";
const SUBSCRIPTION_API_VERSION: &str = "2022-12-01";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    #[serde(default)]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResourceGroupEntry {
    id: String,
    name: String,
    #[serde(default)]
    location: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionEntry {
    subscription_id: String,
    #[serde(default)]
    tenant_id: String,
    display_name: String,
}

/// True when every character of `filter` appears, in order and ignoring
/// case, within at least one whitespace-separated word of `name`.
pub fn matches_subscription_filter(filter: &str, name: &str) -> bool {
    name.split_whitespace()
        .any(|word| subsequence_fold(filter, word))
}

fn subsequence_fold(needle: &str, haystack: &str) -> bool {
    let mut remaining = haystack.chars().flat_map(char::to_lowercase);
    needle
        .chars()
        .flat_map(char::to_lowercase)
        .all(|wanted| remaining.any(|found| found == wanted))
}

impl AzureClient {
    pub(super) async fn list_resource_groups(
        &self,
        subscription_id: &str,
    ) -> Result<Vec<ResourceGroup>> {
        let url = self.url(&format!(
            "/subscriptions/{subscription_id}/resourcegroups?api-version={RESOURCE_GROUP_API_VERSION}"
        ));
        let entries: Vec<ResourceGroupEntry> = self.list_pages(url).await?;
        Ok(entries
            .into_iter()
            .map(|entry| ResourceGroup {
                id: entry.id,
                name: entry.name,
                location: entry.location,
            })
            .collect())
    }

    pub(super) async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        let url = self.url(&format!(
            "/subscriptions?api-version={SUBSCRIPTION_API_VERSION}"
        ));
        let entries: Vec<SubscriptionEntry> = self.list_pages(url).await?;
        Ok(entries
            .into_iter()
            .map(|entry| Subscription {
                id: entry.subscription_id,
                tenant_id: entry.tenant_id,
                name: entry.display_name,
            })
            .collect())
    }

    /// Follows `nextLink` until the listing is exhausted.
    async fn list_pages<T: DeserializeOwned>(&self, first: String) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(first);
        while let Some(url) = next.take() {
            let response = self
                .send_with_retry(|token| {
                    self.http
                        .get(&url)
                        .bearer_auth(token)
                        .timeout(LISTING_TIMEOUT)
                })
                .await?;
            let page: Page<T> = response.json().await.map_err(|err| {
                CollectError::Malformed(format!("unable to decode listing: {err}"))
            })?;
            items.extend(page.value);
            next = page.next_link.filter(|link| !link.is_empty());
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches_any_word_case_insensitively() {
        assert!(matches_subscription_filter("prod", "Contoso Production"));
        assert!(matches_subscription_filter("PROD", "contoso production"));
        assert!(matches_subscription_filter("cnt", "Contoso Production"));
    }

    #[test]
    fn filter_characters_must_stay_in_one_word_and_in_order() {
        assert!(!matches_subscription_filter("sop", "Contoso Production"));
        assert!(!matches_subscription_filter("dorp", "Contoso Production"));
        assert!(!matches_subscription_filter("staging", "Contoso Production"));
    }

    #[test]
    fn empty_filter_matches_named_subscriptions() {
        assert!(matches_subscription_filter("", "Anything"));
        assert!(!matches_subscription_filter("", "   "));
    }

    #[test]
    fn listing_page_tolerates_missing_fields() {
        let page: Page<SubscriptionEntry> = serde_json::from_str(
            r#"{"value":[{"subscriptionId":"0000","displayName":"Dev","state":"Enabled"}]}"#,
        )
        .expect("page");
        assert_eq!(page.value.len(), 1);
        assert_eq!(page.value[0].tenant_id, "");
        assert!(page.next_link.is_none());
    }
}
