use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::services::AppServices;
use costs_db::Db;
use tracing::info;

/// Paths needed to run the local cost store.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
}

/// Application state handed to the command line front end.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db_path: PathBuf) -> Self {
        let config = AppConfig { db_path };
        Self {
            config,
            services: AppServices::new(),
        }
    }

    /// Opens the store for the rest of the command, creating or upgrading it
    /// first and removing it beforehand when `truncate` is set.
    pub fn initialize(&self, truncate: bool) -> Result<Db> {
        if truncate {
            self.reset_store()?;
        }
        open_migrated(&self.config.db_path)
            .map_err(|err| AppError::Message(format!("initialize db: {}", err)))
    }

    /// Deletes the store file along with its WAL side files.
    pub fn reset_store(&self) -> Result<()> {
        remove_store_files(&self.config.db_path)
    }
}

pub fn open_migrated(path: &Path) -> Result<Db> {
    let mut db = Db::open(path)?;
    db.migrate()?;
    Ok(db)
}

fn remove_store_files(path: &Path) -> Result<()> {
    let mut removed = false;
    for suffix in ["", "-wal", "-shm"] {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        let candidate = PathBuf::from(name);
        match std::fs::remove_file(&candidate) {
            Ok(()) => removed = true,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
    }
    if removed {
        info!(path = %path.display(), "truncated cost store");
    }
    Ok(())
}
