//! Slugs for minted identifiers

/// Lowercase ASCII alphanumerics joined by single hyphens
///
/// `"Melville, Herman, 1819-1891"` becomes `"melville-herman-1819-1891"`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Local name of a class IRI: the part after the last `#` or `/`
pub fn local_name(iri: &str) -> &str {
    iri.rsplit(|c| c == '#' || c == '/').next().unwrap_or(iri)
}
