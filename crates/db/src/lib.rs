mod error;
mod helpers;
mod ingest;
mod migrations;
mod periods;
mod summary;

use std::path::Path;

use rusqlite::Connection;

pub use error::{DbError, Result};
pub use migrations::CURRENT_SCHEMA_VERSION;

/// Handle to the local cost store.
///
/// One handle is opened per process and dropped once at the end; the
/// connection is closed when the handle goes out of scope.
pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        conn.pragma_update(None, "cache_size", -20_000)?;
        Ok(Self { conn })
    }

    /// Closes the connection, surfacing any error from sqlite.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| DbError::from(err))
    }
}
