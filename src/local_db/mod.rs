//! # Local Database Module
//!
//! Durable entry store for activities created while the remote endpoint may
//! be unreachable. Backed by SQLite through `sqlx`.
//!
//! ## Handle lifecycle
//!
//! The connection pool is created lazily on first use and memoized for the
//! lifetime of the [`EntryStore`]. Initialization is single-flight: the first
//! caller opens the database and runs the schema upgrade, concurrent callers
//! await that same result. [`EntryStore::reset`] closes the pool, deletes the
//! database, and drops the memoized handle so the next call starts over.
//!
//! ## Failure policy
//!
//! - reads (`list_all`, `count`) never fail: a missing collection or any
//!   database error yields an empty result and a warning
//! - writes (`create`, `delete_by_id`) fail with
//!   [`StoreError::Unavailable`] when the collection is missing
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ecotravel::local_db::EntryStore;
//! use ecotravel::shared::{ActivityType, NewActivity};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = EntryStore::open_file("/tmp/ecotravel/activities.db");
//! let id = store.create(&NewActivity::new("Heron at the lagoon", ActivityType::Sighting)?).await?;
//! let pending = store.list_all().await;
//! # Ok(())
//! # }
//! ```

pub mod activities;
pub mod schema;

use crate::error::StoreError;
use crate::shared::config::AppConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

/// Result type for local database operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Where the store keeps its data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// SQLite database file
    File(PathBuf),
    /// Private in-memory database, lost on reset or drop
    Memory,
}

/// Durable entry store
#[derive(Debug)]
pub struct EntryStore {
    location: StoreLocation,
    handle: RwLock<Arc<OnceCell<SqlitePool>>>,
}

impl EntryStore {
    pub fn new(location: StoreLocation) -> Self {
        Self {
            location,
            handle: RwLock::new(Arc::new(OnceCell::new())),
        }
    }

    pub fn open_file(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreLocation::File(path.into()))
    }

    pub fn in_memory() -> Self {
        Self::new(StoreLocation::Memory)
    }

    /// Store at the configured (or platform default) database path
    pub fn from_config(config: &AppConfig) -> Self {
        Self::open_file(config.database_path())
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Memoized connection pool, opened on first use
    pub async fn pool(&self) -> StoreResult<SqlitePool> {
        let cell = Arc::clone(&*self.handle.read().await);
        let pool = cell.get_or_try_init(|| self.connect()).await?;
        Ok(pool.clone())
    }

    async fn connect(&self) -> StoreResult<SqlitePool> {
        let pool = match &self.location {
            StoreLocation::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal)
                    .foreign_keys(true);
                SqlitePoolOptions::new()
                    .max_connections(4)
                    .connect_with(options)
                    .await?
            }
            StoreLocation::Memory => {
                // every connection to :memory: is its own database, so pin one
                let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options)
                    .await?
            }
        };

        if let Err(err) = schema::migrate(&pool).await {
            tracing::error!("[Store] failed to prepare schema: {}", err);
            pool.close().await;
            return Err(err);
        }
        tracing::info!("[Store] opened {:?}", self.location);
        Ok(pool)
    }

    /// Destroy and recreate the whole store, losing all data
    pub async fn reset(&self) -> StoreResult<()> {
        let mut handle = self.handle.write().await;
        if let Some(pool) = handle.get() {
            pool.close().await;
        }
        *handle = Arc::new(OnceCell::new());

        if let StoreLocation::File(path) = &self.location {
            for file in [path.clone(), side_file(path, "-wal"), side_file(path, "-shm")] {
                match tokio::fs::remove_file(&file).await {
                    Ok(()) => {}
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                    Err(err) => return Err(err.into()),
                }
            }
        }

        tracing::warn!("[Store] store reset, all entries discarded");
        Ok(())
    }
}

fn side_file(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
