use std::collections::HashMap;

use chrono::SecondsFormat;
use costs_core::{BillingPeriod, CostRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::AzureClient;
use crate::types::{CollectError, Result};

const COST_API_VERSION: &str = "2023-11-01";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CostQuery {
    #[serde(rename = "type")]
    kind: &'static str,
    time_frame: &'static str,
    time_period: TimePeriod,
    data_set: DataSet,
}

#[derive(Debug, Serialize)]
struct TimePeriod {
    from: String,
    to: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DataSet {
    granularity: &'static str,
    aggregation: Aggregation,
    grouping: Vec<Grouping>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Aggregation {
    total_cost: AggregationFunction,
    #[serde(rename = "totalCostUSD")]
    total_cost_usd: AggregationFunction,
}

#[derive(Debug, Serialize)]
struct AggregationFunction {
    name: &'static str,
    function: &'static str,
}

#[derive(Debug, Serialize)]
struct Grouping {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'static str,
}

#[derive(Debug, Deserialize)]
pub(super) struct CostQueryResponse {
    properties: CostQueryProperties,
}

#[derive(Debug, Deserialize)]
struct CostQueryProperties {
    #[serde(default)]
    columns: Vec<Column>,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct Column {
    name: String,
}

fn cost_query(period: BillingPeriod) -> CostQuery {
    let dimension = |name| Grouping {
        kind: "Dimension",
        name,
    };
    CostQuery {
        kind: "ActualCost",
        time_frame: "Custom",
        time_period: TimePeriod {
            from: period.start().to_rfc3339_opts(SecondsFormat::Secs, true),
            to: period.end().to_rfc3339_opts(SecondsFormat::Secs, true),
        },
        data_set: DataSet {
            granularity: "None",
            aggregation: Aggregation {
                total_cost: AggregationFunction {
                    name: "Cost",
                    function: "Sum",
                },
                total_cost_usd: AggregationFunction {
                    name: "CostUSD",
                    function: "Sum",
                },
            },
            grouping: vec![
                dimension("ResourceGroupName"),
                dimension("SubscriptionName"),
                dimension("SubscriptionId"),
            ],
        },
    }
}

/// Maps query rows onto cost records by column name.
pub(super) fn records_from_response(
    response: CostQueryResponse,
    period: BillingPeriod,
) -> Result<Vec<CostRecord>> {
    let columns: HashMap<&str, usize> = response
        .properties
        .columns
        .iter()
        .enumerate()
        .map(|(index, column)| (column.name.as_str(), index))
        .collect();
    let column = |name: &str| {
        columns
            .get(name)
            .copied()
            .ok_or_else(|| CollectError::Malformed(format!("missing column {name}")))
    };
    let subscription_id = column("SubscriptionId")?;
    let subscription_name = column("SubscriptionName")?;
    let resource_group = column("ResourceGroupName")?;
    let cost = column("Cost")?;
    let cost_usd = column("CostUSD")?;
    let currency = column("Currency")?;

    response
        .properties
        .rows
        .iter()
        .map(|row| {
            Ok(CostRecord {
                subscription_id: text_cell(row, subscription_id, "SubscriptionId")?,
                subscription_name: text_cell(row, subscription_name, "SubscriptionName")?,
                resource_group: text_cell(row, resource_group, "ResourceGroupName")?,
                billing_period: period,
                cost: number_cell(row, cost, "Cost")?,
                cost_usd: number_cell(row, cost_usd, "CostUSD")?,
                currency: text_cell(row, currency, "Currency")?,
            })
        })
        .collect()
}

fn text_cell(row: &[Value], index: usize, name: &str) -> Result<String> {
    row.get(index)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CollectError::Malformed(format!("{name} is not a string")))
}

fn number_cell(row: &[Value], index: usize, name: &str) -> Result<f64> {
    row.get(index)
        .and_then(Value::as_f64)
        .ok_or_else(|| CollectError::Malformed(format!("{name} is not a number")))
}

impl AzureClient {
    pub(super) async fn query_costs(
        &self,
        subscription_id: &str,
        period: BillingPeriod,
    ) -> Result<Vec<CostRecord>> {
        let url = self.url(&format!(
            "/subscriptions/{subscription_id}/providers/Microsoft.CostManagement/query"
        ));
        let body = cost_query(period);
        debug!(subscription = subscription_id, period = %period, "querying cost management");
        let response = self
            .send_with_retry(|token| {
                self.http
                    .post(&url)
                    .query(&[("api-version", COST_API_VERSION)])
                    .bearer_auth(token)
                    .header("Accept", "application/json")
                    .header("ClientType", "CostManagementAppV1")
                    .json(&body)
            })
            .await?;
        let parsed: CostQueryResponse = response
            .json()
            .await
            .map_err(|err| CollectError::Malformed(format!("unable to decode response: {err}")))?;
        records_from_response(parsed, period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn period() -> BillingPeriod {
        "2024-02".parse().expect("period")
    }

    fn response(value: Value) -> CostQueryResponse {
        serde_json::from_value(value).expect("response")
    }

    #[test]
    fn query_covers_whole_calendar_month() {
        let body = serde_json::to_value(cost_query(period())).expect("serialize");
        assert_eq!(body["type"], "ActualCost");
        assert_eq!(body["timeFrame"], "Custom");
        assert_eq!(body["timePeriod"]["from"], "2024-02-01T00:00:00Z");
        assert_eq!(body["timePeriod"]["to"], "2024-02-29T23:59:59Z");
        assert_eq!(body["dataSet"]["aggregation"]["totalCostUSD"]["name"], "CostUSD");
        let groupings: Vec<&str> = body["dataSet"]["grouping"]
            .as_array()
            .expect("grouping")
            .iter()
            .filter_map(|item| item["name"].as_str())
            .collect();
        assert_eq!(
            groupings,
            vec!["ResourceGroupName", "SubscriptionName", "SubscriptionId"]
        );
    }

    #[test]
    fn rows_map_by_column_name_not_position() {
        let parsed = records_from_response(
            response(json!({
                "properties": {
                    "columns": [
                        {"name": "Cost", "type": "Number"},
                        {"name": "CostUSD", "type": "Number"},
                        {"name": "ResourceGroupName", "type": "String"},
                        {"name": "SubscriptionName", "type": "String"},
                        {"name": "SubscriptionId", "type": "String"},
                        {"name": "Currency", "type": "String"}
                    ],
                    "rows": [
                        [12.5, 15.75, "web-rg", "Prod", "sub-1", "GBP"],
                        [3, 4, "data-rg", "Prod", "sub-1", "GBP"]
                    ]
                }
            })),
            period(),
        )
        .expect("records");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].resource_group, "web-rg");
        assert_eq!(parsed[0].cost, 12.5);
        assert_eq!(parsed[0].cost_usd, 15.75);
        assert_eq!(parsed[1].cost, 3.0);
        assert_eq!(parsed[1].billing_period, period());
    }

    #[test]
    fn missing_column_is_malformed() {
        let err = records_from_response(
            response(json!({
                "properties": {
                    "columns": [{"name": "Cost"}],
                    "rows": []
                }
            })),
            period(),
        )
        .expect_err("missing columns");
        assert!(matches!(err, CollectError::Malformed(_)));
    }

    #[test]
    fn wrong_cell_type_is_malformed() {
        let err = records_from_response(
            response(json!({
                "properties": {
                    "columns": [
                        {"name": "Cost"}, {"name": "CostUSD"}, {"name": "ResourceGroupName"},
                        {"name": "SubscriptionName"}, {"name": "SubscriptionId"}, {"name": "Currency"}
                    ],
                    "rows": [["lots", 1.0, "rg", "Prod", "sub-1", "GBP"]]
                }
            })),
            period(),
        )
        .expect_err("bad cost");
        assert!(matches!(err, CollectError::Malformed(message) if message.contains("Cost")));
    }

    #[test]
    fn empty_rows_yield_no_records() {
        let parsed = records_from_response(
            response(json!({
                "properties": {
                    "columns": [
                        {"name": "Cost"}, {"name": "CostUSD"}, {"name": "ResourceGroupName"},
                        {"name": "SubscriptionName"}, {"name": "SubscriptionId"}, {"name": "Currency"}
                    ],
                    "rows": []
                }
            })),
            period(),
        )
        .expect("records");
        assert!(parsed.is_empty());
    }
}
