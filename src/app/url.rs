//! URL helpers for item identity and image sources.

use url::Url;

/// Resolves `href` against `base` and drops the query string and fragment.
///
/// Returns `None` for hrefs that do not resolve to an http(s) URL
/// (`javascript:` links, malformed input).
///
/// # Arguments
///
/// * `base` - Site base URL
/// * `href` - Raw `href` attribute (relative, absolute, or protocol-relative)
pub fn canonical_url(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_query(None);
    url.set_fragment(None);
    Some(url)
}

/// Last non-empty path segment (the item code for path-identified items).
pub fn path_tail(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}

/// Resolves an image `src` against the page it was found on.
///
/// Absolute sources are returned unchanged; relative and protocol-relative
/// ones (`//cdn.example/x.jpg`) take the page's scheme and host. `data:` URIs
/// and non-http schemes are rejected.
pub fn resolve_src(page_url: &str, src: &str) -> Option<String> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }
    let resolved = match Url::parse(src) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(page_url).ok()?.join(src).ok()?,
        Err(_) => return None,
    };
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// Replaces every `{id}` in `template` with `id`.
pub fn fill_template(template: &str, id: &str) -> String {
    template.replace("{id}", id)
}
