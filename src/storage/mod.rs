//! Storage module for persisting the crawl graph
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Insert-if-absent page and edge persistence
//! - Graph reads for the rank engine and the search server
//! - Crawl run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, StorageError> {
    SqliteStorage::new(path)
}

/// Locks a storage handle shared between crawl tasks
///
/// Every storage call is a complete statement or transaction, so a panic
/// in another holder cannot leave the connection half-written.
pub fn lock<S>(storage: &Mutex<S>) -> MutexGuard<'_, S> {
    storage
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Represents a page in the database
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub content: String,
    /// `None` until the rank engine has run for the partition
    pub rank: Option<f64>,
}

/// Represents a link between two URLs of the same partition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeRecord {
    pub source: String,
    pub dest: String,
}

/// Represents one crawl of one partition
#[derive(Debug, Clone)]
pub struct CrawlRunRecord {
    pub id: i64,
    pub partition: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub pages_stored: u64,
    pub fetch_failures: u64,
    pub rank_iterations: Option<u32>,
}

impl CrawlRunRecord {
    /// Wall-clock duration of a finished run
    pub fn duration(&self) -> Option<chrono::Duration> {
        let started = self.started_at.parse::<chrono::DateTime<chrono::Utc>>().ok()?;
        let finished = self
            .finished_at
            .as_ref()?
            .parse::<chrono::DateTime<chrono::Utc>>()
            .ok()?;
        Some(finished - started)
    }
}
