//! Fetch dispatcher
//!
//! Drains one partition's frontier through a bounded pool of fetch tasks.
//! Request starts are paced pool-wide; each fetch runs under its own
//! timeout. The pool is drained once the queue is empty and no task is in
//! flight, and that state is always reached, quota or not.

use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::crawler::frontier::Frontiers;
use crate::crawler::graph::{record_page, PageOutcome};
use crate::crawler::parser::parse_html;
use crate::storage::Storage;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{Interval, MissedTickBehavior};
use url::Url;

/// Counters for one drained partition
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// HTML documents received
    pub fetched: u64,
    /// New page rows written
    pub stored: u64,
    /// Transport errors, timeouts, non-success statuses, storage failures
    pub failed: u64,
    /// Non-HTML responses
    pub skipped: u64,
    /// HTML documents received after the quota was spent
    pub discarded: u64,
}

impl DispatchReport {
    fn absorb(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Recorded { inserted } => {
                self.fetched += 1;
                if inserted {
                    self.stored += 1;
                }
            }
            TaskOutcome::Discarded => {
                self.fetched += 1;
                self.discarded += 1;
            }
            TaskOutcome::Skipped => self.skipped += 1,
            TaskOutcome::Failed => self.failed += 1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum TaskOutcome {
    Recorded { inserted: bool },
    Discarded,
    Skipped,
    Failed,
}

/// Pool settings
#[derive(Debug, Clone, Copy)]
pub struct DispatchSettings {
    pub max_connections: usize,
    pub rate_limit: Duration,
    pub request_timeout: Duration,
}

impl DispatchSettings {
    pub fn from_config(config: &crate::config::CrawlerConfig) -> Self {
        Self {
            max_connections: config.max_connections.max(1) as usize,
            rate_limit: Duration::from_millis(config.rate_limit_ms),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

/// Bounded, rate-limited pool of fetch tasks
pub struct Dispatcher<F, S> {
    fetcher: Arc<F>,
    storage: Arc<Mutex<S>>,
    frontiers: Arc<Frontiers>,
    settings: DispatchSettings,
}

impl<F, S> Dispatcher<F, S>
where
    F: Fetcher + Send + Sync + 'static,
    S: Storage + Send + 'static,
{
    pub fn new(
        fetcher: Arc<F>,
        storage: Arc<Mutex<S>>,
        frontiers: Arc<Frontiers>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            fetcher,
            storage,
            frontiers,
            settings,
        }
    }

    /// Fetches queued URLs of one partition until its frontier drains
    ///
    /// Links discovered along the way may land in other partitions'
    /// frontiers; those are left for their own turn.
    pub async fn drain(&self, partition: usize) -> DispatchReport {
        let mut report = DispatchReport::default();
        let mut tasks = JoinSet::new();
        let mut pacer = pacer(self.settings.rate_limit);

        loop {
            while tasks.len() < self.settings.max_connections {
                let next = self.frontiers.lock(partition).dequeue();
                let Some(url) = next else {
                    break;
                };

                if let Some(pacer) = pacer.as_mut() {
                    pacer.tick().await;
                }

                tasks.spawn(process_url(
                    Arc::clone(&self.fetcher),
                    Arc::clone(&self.storage),
                    Arc::clone(&self.frontiers),
                    partition,
                    url,
                    self.settings.request_timeout,
                ));
            }

            match tasks.join_next().await {
                Some(Ok(outcome)) => report.absorb(outcome),
                Some(Err(e)) => {
                    tracing::error!("Fetch task failed: {}", e);
                    report.failed += 1;
                }
                // Queue empty and nothing in flight
                None => break,
            }
        }

        report
    }
}

fn pacer(rate_limit: Duration) -> Option<Interval> {
    if rate_limit.is_zero() {
        return None;
    }
    let mut interval = tokio::time::interval(rate_limit);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(interval)
}

async fn process_url<F, S>(
    fetcher: Arc<F>,
    storage: Arc<Mutex<S>>,
    frontiers: Arc<Frontiers>,
    partition: usize,
    url: Url,
    request_timeout: Duration,
) -> TaskOutcome
where
    F: Fetcher + Send + Sync,
    S: Storage + Send,
{
    tracing::debug!("Fetching {}", url);

    let result = match tokio::time::timeout(request_timeout, fetcher.fetch(&url)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Timed out fetching {}", url);
            return TaskOutcome::Failed;
        }
    };

    tracing::trace!("Fetched {} ({})", url, result.kind());

    let (final_url, body) = match result {
        FetchResult::Success {
            final_url, body, ..
        } => (final_url, body),
        FetchResult::ContentMismatch { content_type } => {
            tracing::debug!("Skipping non-HTML content at {} ({})", url, content_type);
            return TaskOutcome::Skipped;
        }
        FetchResult::HttpError { status_code } => {
            tracing::warn!("HTTP {} fetching {}", status_code, url);
            return TaskOutcome::Failed;
        }
        FetchResult::NetworkError { error } => {
            tracing::warn!("Fetch error for {}: {}", url, error);
            return TaskOutcome::Failed;
        }
    };

    // A redirect target is as good as fetched
    if final_url != url && frontiers.mark_seen(&final_url).is_some() {
        tracing::debug!("{} redirected to {}", url, final_url);
    }

    let parsed = parse_html(&body, &final_url);

    match record_page(&storage, &frontiers, partition, &url, &parsed) {
        Ok(PageOutcome::Recorded { inserted, .. }) => TaskOutcome::Recorded { inserted },
        Ok(PageOutcome::Discarded { .. }) => TaskOutcome::Discarded,
        Err(e) => {
            tracing::error!("Failed to record {}: {}", url, e);
            TaskOutcome::Failed
        }
    }
}
