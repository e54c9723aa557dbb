//! Crawler coordinator - partition-by-partition orchestration
//!
//! This module drives the whole pipeline for each configured partition in
//! order:
//! - Recording a crawl run
//! - Seeding the partition's frontier
//! - Draining it through the fetch dispatcher
//! - Ranking the partition once it has drained
//!
//! A partition starts only after the previous one has been crawled and
//! ranked. URLs discovered for a later partition wait in its frontier.

use crate::config::Config;
use crate::crawler::dispatcher::{DispatchReport, DispatchSettings, Dispatcher};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::frontier::Frontiers;
use crate::rank::{rank_partition, RankOutcome};
use crate::storage::{self, SqliteStorage, Storage};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Outcome of crawling and ranking one partition
#[derive(Debug, Clone)]
pub struct PartitionReport {
    pub partition: String,
    pub run_id: i64,
    pub seeded: usize,
    pub dispatch: DispatchReport,
    /// `None` when ranking failed
    pub rank: Option<RankOutcome>,
}

/// Main crawler coordinator structure
pub struct Coordinator<F> {
    config: Arc<Config>,
    config_hash: String,
    storage: Arc<Mutex<SqliteStorage>>,
    frontiers: Arc<Frontiers>,
    fetcher: Arc<F>,
}

impl<F> Coordinator<F>
where
    F: Fetcher + Send + Sync + 'static,
{
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `config_hash` - Hash of the configuration file, stored with each run
    /// * `storage` - Shared storage handle
    /// * `fetcher` - Fetcher used for every request
    pub fn new(
        config: Config,
        config_hash: String,
        storage: Arc<Mutex<SqliteStorage>>,
        fetcher: F,
    ) -> Self {
        let frontiers = Arc::new(Frontiers::new(&config));
        Self {
            config: Arc::new(config),
            config_hash,
            storage,
            frontiers,
            fetcher: Arc::new(fetcher),
        }
    }

    pub fn frontiers(&self) -> &Frontiers {
        &self.frontiers
    }

    /// Crawls and ranks every partition in configuration order
    pub async fn run(&self) -> crate::Result<Vec<PartitionReport>> {
        let start_time = Instant::now();
        let mut reports = Vec::with_capacity(self.frontiers.len());

        for index in 0..self.frontiers.len() {
            reports.push(self.crawl_partition(index).await?);
        }

        tracing::info!(
            "Crawl completed: {} partitions in {:?}",
            reports.len(),
            start_time.elapsed()
        );
        Ok(reports)
    }

    /// Crawls one partition until its frontier drains, then ranks it
    pub async fn crawl_partition(&self, index: usize) -> crate::Result<PartitionReport> {
        let name = self.frontiers.name(index).to_string();
        let start_time = Instant::now();

        let run_id = storage::lock(&self.storage).create_run(&name, &self.config_hash)?;
        let seeded = self.frontiers.seed(index);
        tracing::info!(
            "Crawling partition '{}' (run {}, {} seeds, {} already queued)",
            name,
            run_id,
            seeded,
            self.frontiers.lock(index).queued()
        );

        let dispatcher = Dispatcher::new(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.storage),
            Arc::clone(&self.frontiers),
            DispatchSettings::from_config(&self.config.crawler),
        );
        let dispatch = dispatcher.drain(index).await;
        self.frontiers.lock(index).finish();

        tracing::info!(
            "Partition '{}' drained in {:?}: {} fetched, {} stored, {} failed, {} skipped, {} discarded",
            name,
            start_time.elapsed(),
            dispatch.fetched,
            dispatch.stored,
            dispatch.failed,
            dispatch.skipped,
            dispatch.discarded
        );

        let rank = {
            let mut storage = storage::lock(&self.storage);
            match rank_partition(&mut *storage, &name, &self.config.rank) {
                Ok(outcome) => {
                    tracing::info!(
                        "Ranked '{}': {} pages in {} iterations",
                        name,
                        outcome.pages,
                        outcome.iterations
                    );
                    Some(outcome)
                }
                Err(e) => {
                    tracing::error!("Ranking '{}' failed: {}", name, e);
                    None
                }
            }
        };

        storage::lock(&self.storage).finish_run(
            run_id,
            dispatch.stored,
            dispatch.failed,
            rank.map(|r| r.iterations),
        )?;

        Ok(PartitionReport {
            partition: name,
            run_id,
            seeded,
            dispatch,
            rank,
        })
    }
}

/// Deletes stored pages and edges of every configured partition
pub fn clear_partitions(storage: &mut SqliteStorage, config: &Config) -> crate::Result<()> {
    for name in config.partition_names() {
        storage.clear_partition(&name)?;
        tracing::info!("Cleared partition '{}'", name);
    }
    Ok(())
}

/// Recomputes rank scores for every partition without crawling
pub fn rank_all(
    storage: &mut SqliteStorage,
    config: &Config,
) -> crate::Result<Vec<(String, RankOutcome)>> {
    let mut outcomes = Vec::new();
    for name in config.partition_names() {
        let outcome = rank_partition(storage, &name, &config.rank)?;
        tracing::info!(
            "Ranked '{}': {} pages in {} iterations",
            name,
            outcome.pages,
            outcome.iterations
        );
        outcomes.push((name, outcome));
    }
    Ok(outcomes)
}

/// Runs the main crawl operation
///
/// Opens the database named in the config, optionally clears previous
/// results, and crawls every partition over HTTP.
///
/// # Example
///
/// ```no_run
/// use linkrank::config::load_config_with_hash;
/// use linkrank::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("config.toml"))?;
/// run_crawl(config, hash, false).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    config_hash: String,
    fresh: bool,
) -> crate::Result<Vec<PartitionReport>> {
    let mut storage = SqliteStorage::new(Path::new(&config.storage.database_path))?;
    if fresh {
        clear_partitions(&mut storage, &config)?;
    }

    let fetcher = HttpFetcher::from_config(&config)?;
    let storage = Arc::new(Mutex::new(storage));
    let coordinator = Coordinator::new(config, config_hash, storage, fetcher);
    coordinator.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::crawler::fetcher::FetchResult;
    use std::future::Future;
    use url::Url;

    /// Two tiny sites; the first links into the second
    struct TwoSites;

    impl Fetcher for TwoSites {
        fn fetch(&self, url: &Url) -> impl Future<Output = FetchResult> + Send {
            let body = match url.as_str() {
                "https://a.test/fruitgraph/N-0.html" => Some(
                    r#"<title>N-0</title><a href="N-1.html">1</a><a href="https://b.test/">b</a>"#,
                ),
                "https://a.test/fruitgraph/N-1.html" => {
                    Some(r#"<title>N-1</title><a href="N-0.html">0</a>"#)
                }
                "https://b.test/" => Some(r#"<title>B</title><a href="/about">about</a>"#),
                "https://b.test/about" => Some(
                    r#"<title>About</title><a href="https://a.test/fruitgraph/N-2.html">back</a>"#,
                ),
                _ => None,
            };
            let url = url.clone();
            async move {
                match body {
                    Some(body) => FetchResult::Success {
                        final_url: url,
                        status_code: 200,
                        content_type: "text/html".to_string(),
                        body: body.to_string(),
                    },
                    None => FetchResult::HttpError { status_code: 404 },
                }
            }
        }
    }

    fn config() -> Config {
        parse_config(
            r#"
            [crawler]
            rate-limit-ms = 0

            [user-agent]
            crawler-name = "TestCrawler"
            crawler-version = "1.0"
            contact-url = "https://example.com/about"

            [storage]
            database-path = "unused.db"

            [[partition]]
            name = "fruits"
            url-patterns = ["fruitgraph"]
            seeds = ["https://a.test/fruitgraph/N-0.html"]

            [[partition]]
            name = "other"
            "#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_partitions_crawled_in_order_and_ranked() {
        let storage = Arc::new(Mutex::new(SqliteStorage::new_in_memory().unwrap()));
        let coordinator =
            Coordinator::new(config(), "hash".to_string(), Arc::clone(&storage), TwoSites);

        let reports = coordinator.run().await.unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].partition, "fruits");
        assert_eq!(reports[0].dispatch.stored, 2);
        assert_eq!(reports[1].partition, "other");
        // The second partition has no seeds of its own; its work came from
        // links found while crawling the first
        assert_eq!(reports[1].seeded, 0);
        assert_eq!(reports[1].dispatch.stored, 2);

        // Links back into a drained partition are seen but never queued
        let fruits = coordinator.frontiers().lock(0);
        assert!(fruits.is_finished());
        assert!(fruits.is_seen("https://a.test/fruitgraph/N-2.html"));
        assert_eq!(fruits.queued(), 0);
        drop(fruits);

        let storage = storage.lock().unwrap();
        assert_eq!(storage.count_ranked_pages("fruits").unwrap(), 2);
        assert_eq!(storage.count_ranked_pages("other").unwrap(), 2);
        assert!(storage.get_page("fruits", "https://b.test/").unwrap().is_none());

        let run = storage.latest_run("other").unwrap().unwrap();
        assert_eq!(run.pages_stored, 2);
        assert_eq!(run.config_hash, "hash");
        assert!(run.rank_iterations.is_some());
    }

    #[test]
    fn test_clear_and_rank_all() {
        let config = config();
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.insert_page("fruits", "a", "", "").unwrap();
        storage.insert_page("other", "b", "", "").unwrap();

        let outcomes = rank_all(&mut storage, &config).unwrap();
        assert_eq!(outcomes.len(), 2);
        let rank = storage.get_page("fruits", "a").unwrap().unwrap().rank.unwrap();
        assert!((rank - 1.0).abs() < 1e-9);

        clear_partitions(&mut storage, &config).unwrap();
        assert_eq!(storage.count_pages("fruits").unwrap(), 0);
        assert_eq!(storage.count_pages("other").unwrap(), 0);
    }
}
