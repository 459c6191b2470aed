//! Shared utility functions used across multiple modules.

use std::sync::OnceLock;

use regex::Regex;

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Truncate text to at most 180 characters for error messages.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

/// Syntactic email check matching what a browser `type="email"` input accepts:
/// a non-empty local part, a single `@`, and a dotted or single-label domain.
pub fn is_valid_email(value: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
        )
        .expect("Invalid regex")
    });
    re.is_match(value.trim())
}
