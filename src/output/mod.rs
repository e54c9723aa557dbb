//! Output module for operator-facing crawl reports
//!
//! This module handles:
//! - Per-partition statistics for the `--stats` mode
//! - Summaries of a finished crawl

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStatistics, PartitionStatistics};

use crate::crawler::PartitionReport;

/// Prints the outcome of a crawl to stdout
pub fn print_crawl_summary(reports: &[PartitionReport]) {
    println!("=== Crawl Summary ===\n");
    for report in reports {
        let dispatch = &report.dispatch;
        println!("Partition '{}' (run #{}):", report.partition, report.run_id);
        println!("  Seeds queued: {}", report.seeded);
        println!(
            "  Fetched: {}  Stored: {}  Failed: {}  Skipped: {}  Discarded: {}",
            dispatch.fetched, dispatch.stored, dispatch.failed, dispatch.skipped, dispatch.discarded
        );
        match &report.rank {
            Some(rank) if rank.pages == 0 => println!("  Rank: nothing to rank"),
            Some(rank) => println!(
                "  Rank: {} pages, {} iterations{}",
                rank.pages,
                rank.iterations,
                if rank.converged { "" } else { " (not converged)" }
            ),
            None => println!("  Rank: failed"),
        }
        println!();
    }
}
