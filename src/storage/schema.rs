//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the linkrank database.
//! Every partition shares the same tables; rows are scoped by the `partition`
//! column.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Fetched HTML pages, one row per (partition, url)
CREATE TABLE IF NOT EXISTS pages (
    partition TEXT NOT NULL,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    rank REAL,
    PRIMARY KEY (partition, url)
);

-- Link relationships; dest may never receive a page row
CREATE TABLE IF NOT EXISTS edges (
    partition TEXT NOT NULL,
    source TEXT NOT NULL,
    dest TEXT NOT NULL,
    UNIQUE(partition, source, dest)
);

CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(partition, source);
CREATE INDEX IF NOT EXISTS idx_edges_dest ON edges(partition, dest);

-- One row per partition crawl
CREATE TABLE IF NOT EXISTS crawl_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    partition TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    pages_stored INTEGER NOT NULL DEFAULT 0,
    fetch_failures INTEGER NOT NULL DEFAULT 0,
    rank_iterations INTEGER
);

CREATE INDEX IF NOT EXISTS idx_crawl_runs_partition ON crawl_runs(partition);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
