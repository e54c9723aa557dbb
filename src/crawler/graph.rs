//! Link graph builder
//!
//! Turns one parsed HTML document into a page row, its outgoing edges and
//! new frontier entries.

use crate::crawler::frontier::Frontiers;
use crate::crawler::parser::ParsedPage;
use crate::storage::{self, Storage, StorageResult};
use std::sync::Mutex;
use url::Url;

/// What happened to a fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page was recorded; `inserted` is false when a row already existed
    Recorded { inserted: bool, new_urls: usize },

    /// The partition's quota was spent before the page could be claimed;
    /// `new_urls` counts links queued for other partitions
    Discarded { new_urls: usize },
}

/// Records a fetched page and its links
///
/// The quota is claimed first. A page that cannot be claimed writes no page
/// row and no edges, and queues nothing in its own partition; its links into
/// other partitions are still queued there. Otherwise the page is inserted
/// (first write wins), every link becomes an edge of the source's partition,
/// and each link target is queued in whichever partition owns it.
///
/// The frontier lock and the storage lock are never held together.
///
/// # Arguments
///
/// * `storage` - Shared storage handle
/// * `frontiers` - Frontiers of every partition
/// * `partition` - Index of the partition the page was queued in
/// * `url` - The URL the page was queued under
/// * `page` - The parsed document
pub fn record_page<S: Storage>(
    storage: &Mutex<S>,
    frontiers: &Frontiers,
    partition: usize,
    url: &Url,
    page: &ParsedPage,
) -> StorageResult<PageOutcome> {
    if !frontiers.lock(partition).try_claim() {
        let new_urls = page
            .links
            .iter()
            .filter(|link| frontiers.classify(link).is_some_and(|owner| owner != partition))
            .filter(|link| frontiers.enqueue((*link).clone()).is_some())
            .count();
        tracing::debug!(
            "Quota reached for '{}', discarding {} ({} links queued elsewhere)",
            frontiers.name(partition),
            url,
            new_urls
        );
        return Ok(PageOutcome::Discarded { new_urls });
    }

    let name = frontiers.name(partition);
    let inserted = {
        let mut storage = storage::lock(storage);
        let inserted = storage.insert_page(name, url.as_str(), &page.title, &page.content)?;
        for link in &page.links {
            storage.insert_edge(name, url.as_str(), link.as_str())?;
        }
        inserted
    };

    let new_urls = page
        .links
        .iter()
        .filter(|link| frontiers.enqueue((*link).clone()).is_some())
        .count();

    tracing::debug!(
        "Recorded {} in '{}' ({} links, {} new)",
        url,
        name,
        page.links.len(),
        new_urls
    );

    Ok(PageOutcome::Recorded { inserted, new_urls })
}
