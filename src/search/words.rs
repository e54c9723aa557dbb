use std::collections::BTreeMap;

/// Counts word occurrences in a page's stored content
///
/// Splits on every character outside `[A-Za-z0-9_]`, lower-cases, and
/// drops empty tokens. Markup is counted like any other text.
///
/// # Examples
///
/// ```
/// use linkrank::search::word_frequency;
///
/// let counts = word_frequency("<p>Apple, apple & banana</p>");
/// assert_eq!(counts["apple"], 2);
/// assert_eq!(counts["p"], 2);
/// ```
pub fn word_frequency(content: &str) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for word in content
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
    {
        *counts.entry(word.to_ascii_lowercase()).or_insert(0) += 1;
    }
    counts
}
