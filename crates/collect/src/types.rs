use costs_core::BillingPeriod;
use serde::Serialize;

/// What one `collect` run should fetch.
#[derive(Debug, Clone)]
pub struct CollectRequest {
    pub subscription_id: String,
    /// Target periods, oldest first.
    pub periods: Vec<BillingPeriod>,
    /// Re-collect periods that are already stored instead of skipping them.
    pub overwrite: bool,
}

/// Collection summary returned after a run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectStats {
    pub periods_collected: Vec<BillingPeriod>,
    pub periods_skipped: Vec<BillingPeriod>,
    pub rows_written: usize,
}

/// Errors emitted by the collection pipeline and the Azure client.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("db error: {0}")]
    Db(#[from] costs_db::DbError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid request. {status}: {body}")]
    Status { status: String, body: String },
    #[error("unable to successfully query cost management api after {attempts} attempt(s)")]
    Throttled { attempts: u32 },
    #[error("unexpected response: {0}")]
    Malformed(String),
    #[error("unable to acquire token: {0}")]
    Token(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CollectError>;
