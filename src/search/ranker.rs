//! Fuses textual relevance with stored rank scores

use crate::search::index::TextIndex;
use crate::storage::PageRecord;
use serde::Serialize;

/// Default number of results
pub const DEFAULT_LIMIT: usize = 10;

/// Largest number of results a query may ask for
pub const MAX_LIMIT: usize = 50;

/// A search request against one partition
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub boost: bool,
    pub limit: usize,
}

impl SearchQuery {
    /// Builds a query with the limit clamped into `[1, MAX_LIMIT]`
    pub fn new(text: impl Into<String>, boost: bool, limit: usize) -> Self {
        Self {
            text: text.into(),
            boost,
            limit: clamp_limit(limit),
        }
    }
}

/// Clamps a requested result count into `[1, MAX_LIMIT]`
pub fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_LIMIT)
}

/// Parses a raw `limit` parameter
///
/// Missing or non-numeric values fall back to [`DEFAULT_LIMIT`];
/// everything else, zero included, is clamped.
pub fn parse_limit(raw: Option<&str>) -> usize {
    let parsed = raw
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_LIMIT as i64);
    clamp_limit(parsed.clamp(1, MAX_LIMIT as i64) as usize)
}

/// One ranked result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub score: f64,
    pub rank: Option<f64>,
}

/// Orders matching pages for a query
///
/// With `boost`, each relevance score is multiplied by the page's rank
/// (an unranked page counts as 0) and results are stably re-sorted by the
/// product. Without it the index order is kept. Truncation happens last.
pub fn rank_results<I: TextIndex>(
    index: &I,
    pages: &[PageRecord],
    query: &SearchQuery,
) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = index
        .search(&query.text)
        .into_iter()
        .filter_map(|m| {
            let page = pages.get(m.doc)?;
            let factor = if query.boost {
                page.rank.unwrap_or(0.0)
            } else {
                1.0
            };
            Some(SearchHit {
                url: page.url.clone(),
                title: page.title.clone(),
                score: m.score * factor,
                rank: page.rank,
            })
        })
        .collect();

    if query.boost {
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    }

    hits.truncate(query.limit);
    hits
}
