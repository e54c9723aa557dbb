//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{CrawlRunRecord, EdgeRecord, PageRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Run not found: {0}")]
    RunNotFound(i64),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Every operation is scoped to a partition; no call ever reads or writes
/// rows of another partition.
pub trait Storage {
    // ===== Pages =====

    /// Inserts a page unless one already exists for the URL
    ///
    /// Title and content are first-write-wins.
    ///
    /// # Returns
    ///
    /// `true` if a new row was created
    fn insert_page(
        &mut self,
        partition: &str,
        url: &str,
        title: &str,
        content: &str,
    ) -> StorageResult<bool>;

    /// Gets a page by URL
    fn get_page(&self, partition: &str, url: &str) -> StorageResult<Option<PageRecord>>;

    /// Lists all pages in storage enumeration (insertion) order
    fn list_pages(&self, partition: &str) -> StorageResult<Vec<PageRecord>>;

    /// Lists page URLs in the same order as [`Storage::list_pages`]
    fn list_page_urls(&self, partition: &str) -> StorageResult<Vec<String>>;

    /// Writes rank scores for the given URLs in one transaction
    fn update_ranks(&mut self, partition: &str, ranks: &[(String, f64)]) -> StorageResult<()>;

    /// Counts pages in a partition
    fn count_pages(&self, partition: &str) -> StorageResult<u64>;

    /// Counts pages that have a rank score
    fn count_ranked_pages(&self, partition: &str) -> StorageResult<u64>;

    // ===== Edges =====

    /// Inserts an edge, silently absorbing duplicates
    ///
    /// # Returns
    ///
    /// `true` if a new row was created
    fn insert_edge(&mut self, partition: &str, source: &str, dest: &str) -> StorageResult<bool>;

    /// Lists every edge of a partition
    fn list_edges(&self, partition: &str) -> StorageResult<Vec<EdgeRecord>>;

    /// Sources of all edges pointing at `url`
    fn incoming_links(&self, partition: &str, url: &str) -> StorageResult<Vec<String>>;

    /// Destinations of all edges leaving `url`
    fn outgoing_links(&self, partition: &str, url: &str) -> StorageResult<Vec<String>>;

    /// Counts edges in a partition
    fn count_edges(&self, partition: &str) -> StorageResult<u64>;

    // ===== Maintenance =====

    /// Deletes all pages and edges of a partition
    fn clear_partition(&mut self, partition: &str) -> StorageResult<()>;

    // ===== Crawl runs =====

    /// Records the start of a partition crawl
    fn create_run(&mut self, partition: &str, config_hash: &str) -> StorageResult<i64>;

    /// Records the outcome of a partition crawl
    fn finish_run(
        &mut self,
        run_id: i64,
        pages_stored: u64,
        fetch_failures: u64,
        rank_iterations: Option<u32>,
    ) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<CrawlRunRecord>;

    /// Gets the most recent run of a partition
    fn latest_run(&self, partition: &str) -> StorageResult<Option<CrawlRunRecord>>;
}
