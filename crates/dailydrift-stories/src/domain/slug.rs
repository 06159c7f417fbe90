//! URL slugs for story sets.

/// Derives a URL slug from a title.
///
/// Lowercases, drops everything except ASCII letters, digits, whitespace
/// and hyphens, then joins words with single hyphens.
#[must_use]
pub fn generate_slug(title: &str) -> String {
    let filtered: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();

    filtered
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
