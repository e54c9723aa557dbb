//! Search over a crawled partition
//!
//! This module contains:
//! - A field-boosted TF-IDF text index
//! - The ranker that fuses relevance with stored rank scores
//! - Word frequency counts for the page-detail view

mod index;
mod ranker;
mod words;

pub use index::{tokenize, Match, TextIndex, TfIdfIndex, CONTENT_BOOST, TITLE_BOOST};
pub use ranker::{
    clamp_limit, parse_limit, rank_results, SearchHit, SearchQuery, DEFAULT_LIMIT, MAX_LIMIT,
};
pub use words::word_frequency;

use crate::storage::{PageRecord, Storage, StorageResult};
use scraper::Html;

/// Snapshot of one partition's pages with a text index over them
#[derive(Debug)]
pub struct PartitionSearch {
    pages: Vec<PageRecord>,
    index: TfIdfIndex,
}

impl PartitionSearch {
    /// Indexes pages; content is reduced to its visible text first
    pub fn new(pages: Vec<PageRecord>) -> Self {
        let texts: Vec<String> = pages.iter().map(|p| visible_text(&p.content)).collect();
        let index = TfIdfIndex::new(
            pages
                .iter()
                .zip(&texts)
                .map(|(page, text)| (page.title.as_str(), text.as_str())),
        );
        Self { pages, index }
    }

    /// Loads and indexes every page of a partition
    pub fn load<S: Storage>(storage: &S, partition: &str) -> StorageResult<Self> {
        Ok(Self::new(storage.list_pages(partition)?))
    }

    pub fn search(&self, query: &SearchQuery) -> Vec<SearchHit> {
        rank_results(&self.index, &self.pages, query)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Text nodes of an HTML fragment, space separated
fn visible_text(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    fragment.root_element().text().collect::<Vec<_>>().join(" ")
}
