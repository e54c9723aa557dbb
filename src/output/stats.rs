//! Statistics generation from the crawl database
//!
//! This module provides functionality for extracting and displaying
//! per-partition statistics from the storage layer.

use crate::storage::{CrawlRunRecord, Storage, StorageResult};

/// Number of top-ranked pages listed per partition
const TOP_PAGES: usize = 5;

/// Statistics of one partition
#[derive(Debug, Clone)]
pub struct PartitionStatistics {
    pub partition: String,

    /// Pages stored
    pub pages: u64,

    /// Pages carrying a rank score
    pub ranked_pages: u64,

    /// Distinct edges recorded
    pub edges: u64,

    /// Highest-ranked pages as (url, rank), best first
    pub top_pages: Vec<(String, f64)>,

    /// Most recent crawl run, if any
    pub latest_run: Option<CrawlRunRecord>,
}

/// Statistics of every configured partition
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    pub partitions: Vec<PartitionStatistics>,
}

impl CrawlStatistics {
    pub fn total_pages(&self) -> u64 {
        self.partitions.iter().map(|p| p.pages).sum()
    }

    pub fn total_edges(&self) -> u64 {
        self.partitions.iter().map(|p| p.edges).sum()
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `partitions` - Partition names, in the order they should be reported
pub fn load_statistics(
    storage: &dyn Storage,
    partitions: &[String],
) -> StorageResult<CrawlStatistics> {
    let mut stats = Vec::with_capacity(partitions.len());

    for name in partitions {
        let mut top_pages: Vec<(String, f64)> = storage
            .list_pages(name)?
            .into_iter()
            .filter_map(|page| page.rank.map(|rank| (page.url, rank)))
            .collect();
        top_pages.sort_by(|a, b| b.1.total_cmp(&a.1));
        top_pages.truncate(TOP_PAGES);

        stats.push(PartitionStatistics {
            partition: name.clone(),
            pages: storage.count_pages(name)?,
            ranked_pages: storage.count_ranked_pages(name)?,
            edges: storage.count_edges(name)?,
            top_pages,
            latest_run: storage.latest_run(name)?,
        });
    }

    Ok(CrawlStatistics { partitions: stats })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Partitions: {}", stats.partitions.len());
    println!("  Total pages: {}", stats.total_pages());
    println!("  Total links: {}", stats.total_edges());
    println!();

    for partition in &stats.partitions {
        println!("Partition '{}':", partition.partition);
        println!("  Pages: {}", partition.pages);
        println!("  Links: {}", partition.edges);

        let coverage = if partition.pages > 0 {
            (partition.ranked_pages as f64 / partition.pages as f64) * 100.0
        } else {
            0.0
        };
        println!(
            "  Ranked: {} ({:.1}%)",
            partition.ranked_pages, coverage
        );

        match &partition.latest_run {
            Some(run) => {
                println!("  Latest run: #{} started {}", run.id, run.started_at);
                match run.duration() {
                    Some(duration) => println!(
                        "    Finished in {}s: {} stored, {} failed, {}",
                        duration.num_seconds(),
                        run.pages_stored,
                        run.fetch_failures,
                        run.rank_iterations
                            .map(|n| format!("ranked in {} iterations", n))
                            .unwrap_or_else(|| "not ranked".to_string())
                    ),
                    None => println!("    Did not finish"),
                }
            }
            None => println!("  Never crawled"),
        }

        if !partition.top_pages.is_empty() {
            println!("  Top pages:");
            for (url, rank) in &partition.top_pages {
                println!("    {:.6}  {}", rank, url);
            }
        }
        println!();
    }
}
