use rusqlite::Connection;

use crate::Db;
use crate::error::{DbError, Result};

const MIGRATION_0001: &str = include_str!("../migrations/0001_init.sql");
const MIGRATION_0002: &str = include_str!("../migrations/0002_add_resource_group_status.sql");
const MIGRATION_0003: &str = include_str!("../migrations/0003_add_period_indexes.sql");

const MIGRATIONS: &[(&str, &str)] = &[
    ("0001_init", MIGRATION_0001),
    ("0002_add_resource_group_status", MIGRATION_0002),
    ("0003_add_period_indexes", MIGRATION_0003),
];

/// Schema version a fully migrated store reports.
pub const CURRENT_SCHEMA_VERSION: i64 = MIGRATIONS.len() as i64;

impl Db {
    /// Version recorded in the store header; a store that was never versioned reports 0.
    pub fn schema_version(&self) -> Result<i64> {
        read_user_version(&self.conn)
    }

    /// Brings the store up to [`CURRENT_SCHEMA_VERSION`].
    ///
    /// Each pending step runs in its own transaction together with the
    /// version bump, so an interrupted upgrade resumes from the last
    /// committed step. Steps only add tables, columns and indexes.
    pub fn migrate(&mut self) -> Result<()> {
        let stored = self.schema_version()?;
        if stored > CURRENT_SCHEMA_VERSION {
            return Err(DbError::UnsupportedSchema {
                found: stored,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }
        for (index, (name, sql)) in MIGRATIONS.iter().enumerate() {
            let version = index as i64 + 1;
            if version <= stored {
                continue;
            }
            let tx = self.conn.transaction()?;
            apply_migration(&tx, name, sql)?;
            tx.pragma_update(None, "user_version", version)?;
            tx.commit()?;
        }
        Ok(())
    }
}

fn apply_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    if name == "0002_add_resource_group_status"
        && table_has_column(conn, "costs", "resource_group_status")?
    {
        return Ok(());
    }
    conn.execute_batch(sql)?;
    Ok(())
}

fn read_user_version(conn: &Connection) -> Result<i64> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
