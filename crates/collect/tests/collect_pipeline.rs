use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use costs_collect::{BillingSource, CollectError, CollectRequest, collect};
use costs_core::{BillingPeriod, CostRecord, ResourceGroup, ResourceGroupStatus};
use costs_db::Db;
use tempfile::{TempDir, tempdir};

#[derive(Default)]
struct FakeBilling {
    costs: HashMap<BillingPeriod, Vec<CostRecord>>,
    groups: Vec<ResourceGroup>,
    failing: Option<BillingPeriod>,
    cost_calls: Mutex<Vec<BillingPeriod>>,
    group_calls: Mutex<usize>,
}

impl FakeBilling {
    fn with_costs(mut self, period: &str, rows: &[(&str, f64)]) -> Self {
        let billing_period = parse(period);
        let records = rows
            .iter()
            .map(|(group, cost)| CostRecord {
                subscription_id: SUBSCRIPTION.to_uppercase(),
                subscription_name: "Contoso Prod".to_string(),
                resource_group: group.to_string(),
                billing_period,
                cost: *cost,
                cost_usd: cost * 1.3,
                currency: "GBP".to_string(),
            })
            .collect();
        self.costs.insert(billing_period, records);
        self
    }

    fn with_groups(mut self, names: &[&str]) -> Self {
        self.groups = names
            .iter()
            .map(|name| ResourceGroup {
                id: format!("/subscriptions/{SUBSCRIPTION}/resourceGroups/{name}"),
                name: name.to_string(),
                location: "westeurope".to_string(),
            })
            .collect();
        self
    }

    fn fetched(&self) -> Vec<BillingPeriod> {
        self.cost_calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl BillingSource for FakeBilling {
    async fn resource_group_costs(
        &self,
        _subscription_id: &str,
        period: BillingPeriod,
    ) -> costs_collect::Result<Vec<CostRecord>> {
        self.cost_calls.lock().expect("lock").push(period);
        if self.failing == Some(period) {
            return Err(CollectError::Status {
                status: "500 Internal Server Error".to_string(),
                body: "boom".to_string(),
            });
        }
        Ok(self.costs.get(&period).cloned().unwrap_or_default())
    }

    async fn resource_groups(&self, _subscription_id: &str) -> costs_collect::Result<Vec<ResourceGroup>> {
        *self.group_calls.lock().expect("lock") += 1;
        Ok(self.groups.clone())
    }
}

const SUBSCRIPTION: &str = "6f1d2c7e-1b7a-4c43-9d0e-2f3a1b4c5d6e";

fn parse(value: &str) -> BillingPeriod {
    value.parse().expect("period")
}

fn open_db() -> (TempDir, Db) {
    let dir = tempdir().expect("temp dir");
    let mut db = Db::open(dir.path().join("costs.db")).expect("open db");
    db.migrate().expect("migrate db");
    (dir, db)
}

fn request(periods: &[&str], overwrite: bool) -> CollectRequest {
    CollectRequest {
        subscription_id: SUBSCRIPTION.to_string(),
        periods: periods.iter().map(|value| parse(value)).collect(),
        overwrite,
    }
}

#[tokio::test]
async fn collects_each_pending_period_and_tags_status() {
    let (_dir, mut db) = open_db();
    let source = FakeBilling::default()
        .with_groups(&["web-rg"])
        .with_costs("2024-01", &[("web-rg", 10.0), ("old-rg", 4.0)])
        .with_costs("2024-02", &[("web-rg", 12.0)]);

    let stats = collect(&mut db, &source, &request(&["2024-01", "2024-02"], false))
        .await
        .expect("collect");

    assert_eq!(stats.periods_collected, vec![parse("2024-01"), parse("2024-02")]);
    assert!(stats.periods_skipped.is_empty());
    assert_eq!(stats.rows_written, 3);
    assert_eq!(*source.group_calls.lock().expect("lock"), 1);

    let stored = db
        .costs_for_period(SUBSCRIPTION, &parse("2024-01"))
        .expect("stored");
    let statuses: Vec<(&str, ResourceGroupStatus)> = stored
        .iter()
        .map(|row| (row.record.resource_group.as_str(), row.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("web-rg", ResourceGroupStatus::Active),
            ("old-rg", ResourceGroupStatus::Inactive),
        ]
    );
    assert_eq!(stored[0].record.subscription_id, SUBSCRIPTION);
}

#[tokio::test]
async fn skips_collected_periods_without_overwrite() {
    let (_dir, mut db) = open_db();
    let source = FakeBilling::default()
        .with_groups(&["web-rg"])
        .with_costs("2024-01", &[("web-rg", 10.0)])
        .with_costs("2024-02", &[("web-rg", 12.0)]);
    collect(&mut db, &source, &request(&["2024-01"], false))
        .await
        .expect("first run");

    let stats = collect(&mut db, &source, &request(&["2024-01", "2024-02"], false))
        .await
        .expect("second run");

    assert_eq!(stats.periods_skipped, vec![parse("2024-01")]);
    assert_eq!(stats.periods_collected, vec![parse("2024-02")]);
    assert_eq!(
        source.fetched(),
        vec![parse("2024-01"), parse("2024-02")]
    );
    assert_eq!(db.count_costs().expect("count"), 2);
}

#[tokio::test]
async fn nothing_pending_fetches_nothing() {
    let (_dir, mut db) = open_db();
    let source = FakeBilling::default().with_costs("2024-01", &[("web-rg", 10.0)]);
    collect(&mut db, &source, &request(&["2024-01"], false))
        .await
        .expect("first run");

    let stats = collect(&mut db, &source, &request(&["2024-01"], false))
        .await
        .expect("second run");
    assert_eq!(stats.periods_skipped.len(), 1);
    assert_eq!(*source.group_calls.lock().expect("lock"), 1);
}

#[tokio::test]
async fn overwrite_replaces_period_without_duplicates() {
    let (_dir, mut db) = open_db();
    let source = FakeBilling::default()
        .with_groups(&["web-rg", "data-rg"])
        .with_costs("2024-03", &[("web-rg", 10.0), ("data-rg", 2.0)]);

    collect(&mut db, &source, &request(&["2024-03"], false))
        .await
        .expect("first run");
    let stats = collect(&mut db, &source, &request(&["2024-03"], true))
        .await
        .expect("overwrite run");

    assert_eq!(stats.periods_collected, vec![parse("2024-03")]);
    assert_eq!(db.count_costs().expect("count"), 2);
}

#[tokio::test]
async fn failure_keeps_earlier_periods_committed() {
    let (_dir, mut db) = open_db();
    let mut source = FakeBilling::default()
        .with_costs("2024-01", &[("web-rg", 10.0)])
        .with_costs("2024-02", &[("web-rg", 11.0)])
        .with_costs("2024-03", &[("web-rg", 12.0)]);
    source.failing = Some(parse("2024-02"));

    let err = collect(
        &mut db,
        &source,
        &request(&["2024-01", "2024-02", "2024-03"], false),
    )
    .await
    .expect_err("second period fails");
    assert!(matches!(err, CollectError::Status { .. }));

    assert_eq!(
        db.subscription_periods(SUBSCRIPTION).expect("periods"),
        vec!["2024-01".to_string()]
    );

    // Rerunning resumes from the failed period.
    source.failing = None;
    let stats = collect(
        &mut db,
        &source,
        &request(&["2024-01", "2024-02", "2024-03"], false),
    )
    .await
    .expect("resume");
    assert_eq!(stats.periods_skipped, vec![parse("2024-01")]);
    assert_eq!(stats.periods_collected, vec![parse("2024-02"), parse("2024-03")]);
}
