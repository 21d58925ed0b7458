use url::Url;

/// Resolve an `href` found on a page to an absolute posting link.
///
/// Fragments, query-only references and `javascript:` handlers are not links.
/// Tracking parameters are kept: dedup works on the exact string.
pub fn resolve_link(reference: &str, base: Option<&Url>) -> Option<String> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with('?') || lower.starts_with("javascript:") {
        return None;
    }
    let url = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(_) => base?.join(trimmed).ok()?,
    };
    matches!(url.scheme(), "http" | "https").then(|| url.into())
}

/// Fill `{keywords}` in a search url template with the url-encoded term.
pub fn search_url(template: &str, search_term: &str) -> Option<Url> {
    let keywords: String = url::form_urlencoded::byte_serialize(search_term.as_bytes()).collect();
    Url::parse(&template.replace("{keywords}", &keywords)).ok()
}
