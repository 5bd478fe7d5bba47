#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid stored value: {0}")]
    Parse(#[from] costs_core::ParseError),
    #[error("no cost data has been collected")]
    NoData,
    #[error("no cost data has been collected within the last {months} month(s)")]
    EmptyWindow { months: u32 },
    #[error("cost batch must cover a single subscription and period: expected {expected}, found {found}")]
    MixedBatch { expected: String, found: String },
    #[error("store schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: i64, supported: i64 },
}

pub type Result<T> = std::result::Result<T, DbError>;
