//! Utility functions for URL handling and cache paths

use crate::error::FetchError;

/// Extract the cache file name from a URL: its last non-empty path segment
///
/// Query strings and fragments are ignored, so two URLs pointing at the same
/// server image share one cache entry.
///
/// # Examples
///
/// ```
/// use asset_daemon::utils::filename_from_url;
///
/// assert_eq!(
///     filename_from_url("https://cdn.example.com/thumbs/abc/small.webp?v=2").as_deref(),
///     Some("small.webp")
/// );
/// assert_eq!(filename_from_url("https://cdn.example.com/"), None);
/// ```
#[must_use]
pub fn filename_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let last = parsed.path_segments()?.rev().find(|s| !s.is_empty())?;

    // Path traversal through an encoded segment is not a valid cache name
    if last == "." || last == ".." {
        return None;
    }
    Some(last.to_string())
}

/// Resolve a possibly relative URL against the server base URL
///
/// A leading slash on `path` is tolerated, so both `avatars/a.jpg` and
/// `/avatars/a.jpg` land under the server root.
pub fn join_server_url(base: &str, path: &str) -> std::result::Result<String, FetchError> {
    let base = url::Url::parse(base).map_err(|e| FetchError::InvalidUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;
    base.join(path)
        .map(String::from)
        .map_err(|e| FetchError::InvalidUrl {
            url: path.to_string(),
            reason: e.to_string(),
        })
}

/// Append an API path to the server base URL, keeping any path prefix the
/// base already carries
///
/// ```
/// use asset_daemon::utils::api_url;
///
/// assert_eq!(
///     api_url("https://host.test/blenderkit/", "/api/v1/me/").unwrap(),
///     "https://host.test/blenderkit/api/v1/me/"
/// );
/// ```
pub fn api_url(base: &str, path: &str) -> std::result::Result<String, FetchError> {
    url::Url::parse(base).map_err(|e| FetchError::InvalidUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;
    Ok(format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}
