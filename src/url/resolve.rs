use crate::{UrlError, UrlResult};
use url::Url;

/// Schemes that never name a fetchable resource
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Resolves a possibly-relative reference against the page it was found on
///
/// Standard URL resolution applies: scheme and host are inherited from
/// `base`, `.` and `..` segments are collapsed, query and fragment of the
/// reference are kept as written.
///
/// # Arguments
///
/// * `base` - The URL of the page the reference was found on
/// * `href` - The raw reference, absolute or relative
///
/// # Returns
///
/// * `Ok(Url)` - The absolute HTTP(S) URL
/// * `Err(UrlError)` - The reference could not be resolved or is not HTTP(S)
///
/// # Examples
///
/// ```
/// use linkrank::url::resolve;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/a/b/page.html").unwrap();
/// let url = resolve(&base, "../c/other.html?x=1#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/a/c/other.html?x=1#top");
/// ```
pub fn resolve(base: &Url, href: &str) -> UrlResult<Url> {
    let url = base
        .join(href.trim())
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }

    Ok(url)
}

/// Parses an absolute HTTP(S) URL
pub fn parse_http_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(format!("{}: {}", url_str, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }

    Ok(url)
}

/// Returns true if an href should be followed at all
///
/// Excludes empty references, same-document fragments and
/// non-resource schemes such as `mailto:`.
pub fn is_followable(href: &str) -> bool {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return false;
    }

    let lower = href.to_ascii_lowercase();
    !SKIPPED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}
