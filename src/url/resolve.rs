use url::Url;

/// Resolves a possibly relative reference against a base URL
///
/// References that cannot be resolved are skipped: the skip is logged at
/// debug level and `None` is returned, so the caller can carry on with the
/// remaining references on the page. No scheme filtering happens here; the
/// crawler's host filter decides what is followed.
///
/// # Arguments
///
/// * `reference` - The raw `href`/`src` attribute value
/// * `base` - The URL the reference is relative to
///
/// # Examples
///
/// ```
/// use sitecrawl::url::resolve_reference;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/").unwrap();
/// assert_eq!(
///     resolve_reference("intro", &base).as_deref(),
///     Some("https://example.com/docs/intro")
/// );
/// ```
pub fn resolve_reference(reference: &str, base: &Url) -> Option<String> {
    match base.join(reference) {
        Ok(absolute) => Some(absolute.to_string()),
        Err(e) => {
            tracing::debug!("Skipping unresolvable reference {:?} on {}: {}", reference, base, e);
            None
        }
    }
}

/// Resolves every reference, dropping the ones that fail, keeping order and duplicates
pub fn resolve_all<'a, I>(references: I, base: &Url) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    references
        .into_iter()
        .filter_map(|reference| resolve_reference(reference, base))
        .collect()
}
