//! Per-partition frontier, dedup set and quota
//!
//! Each partition owns one [`PartitionFrontier`] behind its own mutex. The
//! seen-check and the insert happen under a single lock acquisition, so two
//! workers discovering the same new URL produce exactly one enqueue.

use crate::config::{Config, PartitionEntry};
use crate::url::classify_partition;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use url::Url;

/// Work queue, dedup set and page quota of one partition
#[derive(Debug)]
pub struct PartitionFrontier {
    queue: VecDeque<Url>,
    seen: HashSet<String>,
    visited_count: u32,
    cap: u32,
    finished: bool,
    disallowed: Arc<HashSet<String>>,
}

impl PartitionFrontier {
    pub fn new(cap: u32, disallowed: Arc<HashSet<String>>) -> Self {
        Self {
            queue: VecDeque::new(),
            seen: HashSet::new(),
            visited_count: 0,
            cap,
            finished: false,
            disallowed,
        }
    }

    /// Appends a URL unless it is disallowed or was seen before
    ///
    /// Seen URLs stay seen for the lifetime of the frontier, whether or not
    /// they were ever fetched. A frontier that is exhausted or finished
    /// still marks new URLs seen but no longer queues them.
    ///
    /// # Returns
    ///
    /// `true` if the URL was newly queued
    pub fn enqueue(&mut self, url: Url) -> bool {
        if self.disallowed.contains(url.as_str()) {
            tracing::debug!("Not queueing disallowed URL {}", url);
            return false;
        }

        if !self.seen.insert(url.as_str().to_string()) {
            return false;
        }

        if self.finished || self.is_exhausted() {
            return false;
        }

        self.queue.push_back(url);
        true
    }

    /// Marks a URL seen without queueing it
    ///
    /// Used for redirect targets: a pending entry for the same URL is
    /// dropped, since its document has already been fetched.
    ///
    /// # Returns
    ///
    /// `true` if the URL was not seen before
    pub fn mark_seen(&mut self, url: &Url) -> bool {
        if self.seen.insert(url.as_str().to_string()) {
            return true;
        }
        self.queue.retain(|queued| queued != url);
        false
    }

    /// Closes the frontier once its partition has drained
    pub fn finish(&mut self) {
        self.finished = true;
        self.queue.clear();
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Pops the next URL to fetch
    ///
    /// Once the quota is spent the remaining entries are dropped unfetched.
    pub fn dequeue(&mut self) -> Option<Url> {
        if self.is_exhausted() {
            if !self.queue.is_empty() {
                tracing::debug!(
                    "Quota reached, dropping {} queued URLs",
                    self.queue.len()
                );
                self.queue.clear();
            }
            return None;
        }
        self.queue.pop_front()
    }

    /// Claims one unit of the page quota
    ///
    /// # Returns
    ///
    /// `true` if the caller may store a page; `visited_count` never exceeds
    /// the cap.
    pub fn try_claim(&mut self) -> bool {
        if self.visited_count < self.cap {
            self.visited_count += 1;
            true
        } else {
            false
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.visited_count >= self.cap
    }

    pub fn is_seen(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn visited_count(&self) -> u32 {
        self.visited_count
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

/// The frontiers of every configured partition
///
/// Owned by the crawl controller and shared by reference with the
/// dispatcher and the graph builder.
#[derive(Debug)]
pub struct Frontiers {
    partitions: Vec<PartitionEntry>,
    frontiers: Vec<Mutex<PartitionFrontier>>,
}

impl Frontiers {
    /// Creates empty frontiers for every partition in the config
    pub fn new(config: &Config) -> Self {
        let disallowed: Arc<HashSet<String>> = Arc::new(
            config
                .disallow
                .iter()
                .map(|entry| match Url::parse(entry) {
                    Ok(url) => url.to_string(),
                    Err(_) => entry.clone(),
                })
                .collect(),
        );

        let frontiers = config
            .partitions
            .iter()
            .map(|_| {
                Mutex::new(PartitionFrontier::new(
                    config.crawler.max_pages_per_partition,
                    Arc::clone(&disallowed),
                ))
            })
            .collect();

        Self {
            partitions: config.partitions.clone(),
            frontiers,
        }
    }

    pub fn len(&self) -> usize {
        self.frontiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frontiers.is_empty()
    }

    /// Name of the partition at `index`
    pub fn name(&self, index: usize) -> &str {
        &self.partitions[index].name
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.partitions.iter().position(|p| p.name == name)
    }

    /// Partition that owns a URL, if any
    pub fn classify(&self, url: &Url) -> Option<usize> {
        classify_partition(url.as_str(), &self.partitions)
    }

    /// Locks the frontier of one partition
    ///
    /// A poisoned lock is recovered; frontier state stays consistent
    /// because every mutation completes before the guard is released.
    pub fn lock(&self, index: usize) -> MutexGuard<'_, PartitionFrontier> {
        self.frontiers[index]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Classifies a URL and queues it in the owning partition
    ///
    /// # Returns
    ///
    /// The partition index if the URL was newly queued
    pub fn enqueue(&self, url: Url) -> Option<usize> {
        let index = self.classify(&url)?;
        self.lock(index).enqueue(url).then_some(index)
    }

    /// Marks a URL seen in the partition that owns it
    ///
    /// # Returns
    ///
    /// The owning partition index, if any
    pub fn mark_seen(&self, url: &Url) -> Option<usize> {
        let index = self.classify(url)?;
        self.lock(index).mark_seen(url);
        Some(index)
    }

    /// Queues the configured seeds of one partition
    ///
    /// # Returns
    ///
    /// Number of seeds newly queued
    pub fn seed(&self, index: usize) -> usize {
        let mut frontier = self.lock(index);
        self.partitions[index]
            .seeds
            .iter()
            .filter_map(|seed| Url::parse(seed).ok())
            .filter(|url| frontier.enqueue(url.clone()))
            .count()
    }
}
