//! Rank engine
//!
//! Computes a damped power-iteration importance score for every page of a
//! partition and writes it back to storage. Runs once per partition, after
//! its frontier has drained.
//!
//! The matrix is dense, so memory and time grow with the square of the
//! page count; partitions larger than `max-pages` are refused rather than
//! ranked approximately.

mod matrix;

pub use matrix::{distance, link_matrix, power_iterate, transition_matrix, Iteration, Matrix};

use crate::config::RankConfig;
use crate::storage::{EdgeRecord, Storage, StorageError};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur while ranking a partition
#[derive(Debug, Error)]
pub enum RankError {
    #[error("Partition has {pages} pages, more than the dense limit of {max}")]
    TooManyPages { pages: usize, max: usize },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Summary of one rank computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankOutcome {
    pub pages: usize,
    pub iterations: u32,
    pub converged: bool,
}

/// Scores pages from their link structure
///
/// Pages are indexed in the order given; edges whose source or destination
/// is not a page are ignored.
///
/// # Returns
///
/// One score per page, in page order, summing to 1. Empty input yields an
/// empty iteration.
pub fn compute_ranks(
    urls: &[String],
    edges: &[EdgeRecord],
    config: &RankConfig,
) -> Result<Iteration, RankError> {
    let n = urls.len();
    if n == 0 {
        return Ok(Iteration {
            vector: Vec::new(),
            iterations: 0,
            converged: true,
        });
    }
    if n > config.max_pages {
        return Err(RankError::TooManyPages {
            pages: n,
            max: config.max_pages,
        });
    }

    let index: HashMap<&str, usize> = urls
        .iter()
        .enumerate()
        .map(|(i, url)| (url.as_str(), i))
        .collect();

    let pairs: Vec<(usize, usize)> = edges
        .iter()
        .filter_map(|edge| {
            let source = index.get(edge.source.as_str())?;
            let dest = index.get(edge.dest.as_str())?;
            Some((*source, *dest))
        })
        .collect();

    let links = link_matrix(n, &pairs);
    let p = transition_matrix(&links, config.damping);
    Ok(power_iterate(&p, config.tolerance, config.max_iterations))
}

/// Ranks one partition and stores the scores
///
/// A partition without pages is a no-op. Scores are written exactly as
/// computed, without renormalization.
pub fn rank_partition<S: Storage>(
    storage: &mut S,
    partition: &str,
    config: &RankConfig,
) -> Result<RankOutcome, RankError> {
    let urls = storage.list_page_urls(partition)?;
    if urls.is_empty() {
        tracing::info!("Partition '{}' has no pages, skipping rank", partition);
        return Ok(RankOutcome {
            pages: 0,
            iterations: 0,
            converged: true,
        });
    }

    let edges = storage.list_edges(partition)?;
    tracing::info!(
        "Ranking '{}': {} pages, {} edges",
        partition,
        urls.len(),
        edges.len()
    );

    let result = compute_ranks(&urls, &edges, config)?;
    if !result.converged {
        tracing::warn!(
            "Rank for '{}' did not converge within {} iterations",
            partition,
            result.iterations
        );
    }

    let scores: Vec<(String, f64)> = urls.into_iter().zip(result.vector).collect();
    storage.update_ranks(partition, &scores)?;

    Ok(RankOutcome {
        pages: scores.len(),
        iterations: result.iterations,
        converged: result.converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;

    fn urls(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn edge(source: &str, dest: &str) -> EdgeRecord {
        EdgeRecord {
            source: source.to_string(),
            dest: dest.to_string(),
        }
    }

    fn strict() -> RankConfig {
        RankConfig {
            tolerance: 1e-12,
            ..RankConfig::default()
        }
    }

    #[test]
    fn test_star_with_dangling_leaves_matches_closed_form() {
        // A -> B, A -> C, A -> D; B, C, D have no outlinks.
        // Fixed point: a = 0.675b + 0.025 and a + 3b = 1, so
        // b = 0.975 / 3.675 and a = 1 - 3b.
        let pages = urls(&["A", "B", "C", "D"]);
        let edges = vec![edge("A", "B"), edge("A", "C"), edge("A", "D")];

        let result = compute_ranks(&pages, &edges, &strict()).unwrap();

        let b = 0.975 / 3.675;
        let a = 1.0 - 3.0 * b;
        assert!(result.converged);
        assert!((result.vector[0] - a).abs() < 1e-9);
        for score in &result.vector[1..] {
            assert!((score - b).abs() < 1e-9);
        }
        assert!(result.vector[1] > 0.0);
    }

    #[test]
    fn test_default_tolerance_is_close_to_fixed_point() {
        let pages = urls(&["A", "B", "C", "D"]);
        let edges = vec![edge("A", "B"), edge("A", "C"), edge("A", "D")];

        let result = compute_ranks(&pages, &edges, &RankConfig::default()).unwrap();

        let b = 0.975 / 3.675;
        for score in &result.vector[1..] {
            assert!((score - b).abs() < 1e-3);
        }
        let sum: f64 = result.vector.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_edges_outside_page_set_ignored() {
        let pages = urls(&["A", "B"]);
        let with_external = vec![edge("A", "B"), edge("A", "X"), edge("Y", "B")];
        let without = vec![edge("A", "B")];

        let a = compute_ranks(&pages, &with_external, &strict()).unwrap();
        let b = compute_ranks(&pages, &without, &strict()).unwrap();
        assert_eq!(a.vector, b.vector);
    }

    #[test]
    fn test_empty_partition() {
        let result = compute_ranks(&[], &[], &RankConfig::default()).unwrap();
        assert!(result.vector.is_empty());
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_too_many_pages() {
        let config = RankConfig {
            max_pages: 3,
            ..RankConfig::default()
        };
        let result = compute_ranks(&urls(&["a", "b", "c", "d"]), &[], &config);
        assert!(matches!(
            result,
            Err(RankError::TooManyPages { pages: 4, max: 3 })
        ));
    }

    #[test]
    fn test_iteration_cap() {
        let config = RankConfig {
            tolerance: 0.0,
            max_iterations: 7,
            ..RankConfig::default()
        };
        let pages = urls(&["A", "B", "C"]);
        let result = compute_ranks(&pages, &[edge("A", "B"), edge("B", "C")], &config).unwrap();

        assert!(!result.converged);
        assert_eq!(result.iterations, 7);
    }

    #[test]
    fn test_rank_partition_writes_scores() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        for url in ["A", "B", "C", "D"] {
            storage.insert_page("p", url, url, "").unwrap();
        }
        for dest in ["B", "C", "D", "Z"] {
            storage.insert_edge("p", "A", dest).unwrap();
        }
        storage.insert_page("q", "A", "other", "").unwrap();

        let outcome = rank_partition(&mut storage, "p", &RankConfig::default()).unwrap();

        assert_eq!(outcome.pages, 4);
        assert!(outcome.converged);
        assert_eq!(storage.count_ranked_pages("p").unwrap(), 4);
        assert_eq!(storage.count_ranked_pages("q").unwrap(), 0);

        let total: f64 = storage
            .list_pages("p")
            .unwrap()
            .iter()
            .filter_map(|page| page.rank)
            .sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rank_empty_partition_is_noop() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let outcome = rank_partition(&mut storage, "p", &RankConfig::default()).unwrap();
        assert_eq!(outcome.pages, 0);
    }
}
