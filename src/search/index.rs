//! Full-text index over page titles and content

use std::collections::{HashMap, HashSet};

/// Relative weight of a title hit
pub const TITLE_BOOST: f64 = 3.0;

/// Relative weight of a content hit
pub const CONTENT_BOOST: f64 = 1.0;

/// One document matching a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    /// Position of the document in the indexed sequence
    pub doc: usize,
    /// Relevance, higher is better
    pub score: f64,
}

/// Source of textual relevance
pub trait TextIndex {
    /// Documents matching every query term, by descending relevance
    fn search(&self, query: &str) -> Vec<Match>;
}

/// Splits text into lower-cased alphanumeric runs
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

#[derive(Debug, Default)]
struct DocTerms {
    title: HashMap<String, u32>,
    content: HashMap<String, u32>,
}

fn count_terms(text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

/// Two-field TF-IDF index with AND semantics
///
/// Score of a document is
/// `Σ_field boost × Σ_term √tf × idf`, with `idf = 1 + ln(N / (1 + df))`.
#[derive(Debug, Default)]
pub struct TfIdfIndex {
    docs: Vec<DocTerms>,
    doc_freq: HashMap<String, usize>,
}

impl TfIdfIndex {
    /// Indexes `(title, text)` pairs; document ids follow iteration order
    pub fn new<'a>(docs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut index = Self::default();
        for (title, text) in docs {
            let terms = DocTerms {
                title: count_terms(title),
                content: count_terms(text),
            };

            let distinct: HashSet<&String> = terms.title.keys().chain(terms.content.keys()).collect();
            for term in distinct {
                *index.doc_freq.entry(term.clone()).or_insert(0) += 1;
            }

            index.docs.push(terms);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    fn idf(&self, term: &str) -> f64 {
        let df = self.doc_freq.get(term).copied().unwrap_or(0);
        1.0 + (self.docs.len() as f64 / (1.0 + df as f64)).ln()
    }
}

impl TextIndex for TfIdfIndex {
    fn search(&self, query: &str) -> Vec<Match> {
        let mut terms: Vec<String> = tokenize(query).collect();
        terms.sort();
        terms.dedup();
        if terms.is_empty() {
            return Vec::new();
        }

        // Every term must occur somewhere in the corpus for any doc to match
        if terms.iter().any(|t| !self.doc_freq.contains_key(t)) {
            return Vec::new();
        }

        let idf: Vec<f64> = terms.iter().map(|t| self.idf(t)).collect();

        let mut matches: Vec<Match> = self
            .docs
            .iter()
            .enumerate()
            .filter_map(|(doc, fields)| {
                let mut score = 0.0;
                for (term, idf) in terms.iter().zip(&idf) {
                    let title_tf = fields.title.get(term).copied().unwrap_or(0);
                    let content_tf = fields.content.get(term).copied().unwrap_or(0);
                    if title_tf == 0 && content_tf == 0 {
                        return None;
                    }
                    score += TITLE_BOOST * f64::from(title_tf).sqrt() * idf
                        + CONTENT_BOOST * f64::from(content_tf).sqrt() * idf;
                }
                Some(Match { doc, score })
            })
            .collect();

        // Stable: equal scores keep document order
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches
    }
}
