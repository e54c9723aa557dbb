use crate::config::PartitionEntry;

/// Checks if a URL matches any of a partition's patterns
///
/// Patterns are plain substrings of the URL text, so `"fruitgraph"` claims
/// every URL that mentions it anywhere in host or path.
///
/// # Examples
///
/// ```
/// use linkrank::url::matches_any;
///
/// let patterns = vec!["fruitgraph".to_string()];
/// assert!(matches_any(&patterns, "https://example.com/~u/fruitgraph/N-0.html"));
/// assert!(!matches_any(&patterns, "https://example.com/blog"));
/// ```
pub fn matches_any(patterns: &[String], url: &str) -> bool {
    patterns.iter().any(|pattern| url.contains(pattern.as_str()))
}

/// Classifies a URL into a partition
///
/// The first partition, in configuration order, with a matching pattern
/// wins. A partition with no patterns is the catch-all and receives every
/// URL no other partition claims.
///
/// # Returns
///
/// * `Some(index)` - Index of the owning partition
/// * `None` - No partition claims the URL
pub fn classify_partition(url: &str, partitions: &[PartitionEntry]) -> Option<usize> {
    let explicit = partitions
        .iter()
        .position(|p| !p.url_patterns.is_empty() && matches_any(&p.url_patterns, url));

    explicit.or_else(|| partitions.iter().position(|p| p.url_patterns.is_empty()))
}
