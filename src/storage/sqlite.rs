//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{CrawlRunRecord, EdgeRecord, PageRecord};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA mmap_size = 268435456;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn count(&self, sql: &str, partition: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, params![partition], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn strings(&self, sql: &str, partition: &str, url: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(sql)?;
        let values = stmt
            .query_map(params![partition, url], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(values)
    }
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        url: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        rank: row.get(3)?,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<CrawlRunRecord> {
    Ok(CrawlRunRecord {
        id: row.get(0)?,
        partition: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        pages_stored: row.get::<_, i64>(5)? as u64,
        fetch_failures: row.get::<_, i64>(6)? as u64,
        rank_iterations: row.get(7)?,
    })
}

const RUN_COLUMNS: &str = "id, partition, started_at, finished_at, config_hash, pages_stored, \
                           fetch_failures, rank_iterations";

impl Storage for SqliteStorage {
    // ===== Page Management =====

    fn insert_page(
        &mut self,
        partition: &str,
        url: &str,
        title: &str,
        content: &str,
    ) -> StorageResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO pages (partition, url, title, content) VALUES (?1, ?2, ?3, ?4)",
            params![partition, url, title, content],
        )?;
        Ok(inserted > 0)
    }

    fn get_page(&self, partition: &str, url: &str) -> StorageResult<Option<PageRecord>> {
        let page = self
            .conn
            .query_row(
                "SELECT url, title, content, rank FROM pages WHERE partition = ?1 AND url = ?2",
                params![partition, url],
                page_from_row,
            )
            .optional()?;
        Ok(page)
    }

    fn list_pages(&self, partition: &str) -> StorageResult<Vec<PageRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, title, content, rank FROM pages WHERE partition = ?1 ORDER BY rowid",
        )?;

        let pages = stmt
            .query_map(params![partition], page_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pages)
    }

    fn list_page_urls(&self, partition: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url FROM pages WHERE partition = ?1 ORDER BY rowid")?;

        let urls = stmt
            .query_map(params![partition], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(urls)
    }

    fn update_ranks(&mut self, partition: &str, ranks: &[(String, f64)]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("UPDATE pages SET rank = ?1 WHERE partition = ?2 AND url = ?3")?;
            for (url, rank) in ranks {
                stmt.execute(params![rank, partition, url])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn count_pages(&self, partition: &str) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM pages WHERE partition = ?1", partition)
    }

    fn count_ranked_pages(&self, partition: &str) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM pages WHERE partition = ?1 AND rank IS NOT NULL",
            partition,
        )
    }

    // ===== Edge Management =====

    fn insert_edge(&mut self, partition: &str, source: &str, dest: &str) -> StorageResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO edges (partition, source, dest) VALUES (?1, ?2, ?3)",
            params![partition, source, dest],
        )?;
        Ok(inserted > 0)
    }

    fn list_edges(&self, partition: &str) -> StorageResult<Vec<EdgeRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT source, dest FROM edges WHERE partition = ?1 ORDER BY rowid")?;

        let edges = stmt
            .query_map(params![partition], |row| {
                Ok(EdgeRecord {
                    source: row.get(0)?,
                    dest: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(edges)
    }

    fn incoming_links(&self, partition: &str, url: &str) -> StorageResult<Vec<String>> {
        self.strings(
            "SELECT source FROM edges WHERE partition = ?1 AND dest = ?2 ORDER BY rowid",
            partition,
            url,
        )
    }

    fn outgoing_links(&self, partition: &str, url: &str) -> StorageResult<Vec<String>> {
        self.strings(
            "SELECT dest FROM edges WHERE partition = ?1 AND source = ?2 ORDER BY rowid",
            partition,
            url,
        )
    }

    fn count_edges(&self, partition: &str) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM edges WHERE partition = ?1", partition)
    }

    // ===== Maintenance =====

    fn clear_partition(&mut self, partition: &str) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM pages WHERE partition = ?1", params![partition])?;
        tx.execute("DELETE FROM edges WHERE partition = ?1", params![partition])?;
        tx.commit()?;
        Ok(())
    }

    // ===== Run Management =====

    fn create_run(&mut self, partition: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO crawl_runs (partition, started_at, config_hash) VALUES (?1, ?2, ?3)",
            params![partition, now, config_hash],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        pages_stored: u64,
        fetch_failures: u64,
        rank_iterations: Option<u32>,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE crawl_runs SET finished_at = ?1, pages_stored = ?2, fetch_failures = ?3,
             rank_iterations = ?4 WHERE id = ?5",
            params![
                now,
                pages_stored as i64,
                fetch_failures as i64,
                rank_iterations,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<CrawlRunRecord> {
        let sql = format!("SELECT {} FROM crawl_runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn latest_run(&self, partition: &str) -> StorageResult<Option<CrawlRunRecord>> {
        let sql = format!(
            "SELECT {} FROM crawl_runs WHERE partition = ?1 ORDER BY id DESC LIMIT 1",
            RUN_COLUMNS
        );
        let run = self
            .conn
            .query_row(&sql, params![partition], run_from_row)
            .optional()?;
        Ok(run)
    }
}
