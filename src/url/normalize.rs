use crate::UrlError;
use url::Url;

/// Normalizes a URL into the crawler's deduplication key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Take the host, with the port appended when one is given explicitly
///    (the `url` crate drops ports that equal the scheme default)
/// 3. Take the path and strip a single trailing slash (`/` becomes empty)
/// 4. Drop scheme, query string and fragment
/// 5. Concatenate host and path with no separator
///
/// URLs that differ only in query, fragment, or a trailing slash therefore
/// collapse to the same key.
///
/// # Arguments
///
/// * `url_str` - The absolute URL string to normalize
///
/// # Returns
///
/// * `Ok(String)` - Normalized key
/// * `Err(UrlError)` - The input could not be parsed or has no host
///
/// # Examples
///
/// ```
/// use sitecrawl::url::normalize_url;
///
/// assert_eq!(normalize_url("https://example.com/page/?q=1#top").unwrap(), "example.com/page");
/// assert_eq!(normalize_url("https://example.com/").unwrap(), "example.com");
/// ```
pub fn normalize_url(url_str: &str) -> Result<String, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(&url)
}

/// Normalizes an already parsed URL
pub fn normalize_parsed(url: &Url) -> Result<String, UrlError> {
    let host = match url.host_str() {
        Some(h) if !h.is_empty() => h,
        _ => return Err(UrlError::MissingHost),
    };

    let path = url.path();
    let path = path.strip_suffix('/').unwrap_or(path);

    Ok(match url.port() {
        Some(port) => format!("{}:{}{}", host, port, path),
        None => format!("{}{}", host, path),
    })
}
