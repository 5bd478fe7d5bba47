#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use costs_core::{BillingPeriod, CostRecord, ResourceGroup};
use costs_db::Db;
use tempfile::TempDir;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("costs.db");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn period(value: &str) -> BillingPeriod {
    value.parse().expect("billing period")
}

/// Fixed clock used by window-sensitive tests.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0)
        .single()
        .expect("fixed now")
}

pub fn make_record(
    subscription_id: &str,
    subscription_name: &str,
    resource_group: &str,
    billing_period: &str,
    cost: f64,
) -> CostRecord {
    CostRecord {
        subscription_id: subscription_id.to_string(),
        subscription_name: subscription_name.to_string(),
        resource_group: resource_group.to_string(),
        billing_period: period(billing_period),
        cost,
        cost_usd: cost * 1.25,
        currency: "GBP".to_string(),
    }
}

pub fn groups(names: &[&str]) -> Vec<ResourceGroup> {
    names
        .iter()
        .map(|name| ResourceGroup {
            id: format!("/subscriptions/sub/resourceGroups/{name}"),
            name: name.to_string(),
            location: "uksouth".to_string(),
        })
        .collect()
}

/// Deletes then re-ingests the period, the way the collector does.
pub fn collect(db: &mut Db, records: Vec<CostRecord>, live: &[&str]) {
    let first = records.first().expect("at least one record");
    let subscription_id = first.subscription_id.clone();
    let billing_period = first.billing_period.to_string();
    db.delete_period(&subscription_id, &billing_period)
        .expect("delete period");
    db.save_costs(&records, &groups(live)).expect("save costs");
}
