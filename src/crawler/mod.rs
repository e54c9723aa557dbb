//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and content-type filtering
//! - HTML parsing and link extraction
//! - Per-partition frontiers with dedup and page quotas
//! - Concurrent, rate-limited dispatch
//! - Partition-by-partition coordination and ranking

mod coordinator;
mod dispatcher;
mod fetcher;
mod frontier;
mod graph;
mod parser;

pub use coordinator::{clear_partitions, rank_all, run_crawl, Coordinator, PartitionReport};
pub use dispatcher::{DispatchReport, DispatchSettings, Dispatcher};
pub use fetcher::{build_http_client, fetch_url, FetchResult, Fetcher, HttpFetcher};
pub use frontier::{Frontiers, PartitionFrontier};
pub use graph::{record_page, PageOutcome};
pub use parser::{parse_html, ParsedPage};
