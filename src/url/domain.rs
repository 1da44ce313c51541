use url::Url;

/// Extracts the hostname from a URL
///
/// This function retrieves the host portion of a URL (without port) and converts
/// it to lowercase. URLs without a host, such as `mailto:` links, yield `None`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitecrawl::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM:8443/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Returns true when `candidate` has the given hostname
///
/// Only hostnames are compared; scheme and port are ignored.
pub fn is_same_host(candidate: &Url, host: &str) -> bool {
    extract_domain(candidate).is_some_and(|h| h == host)
}
