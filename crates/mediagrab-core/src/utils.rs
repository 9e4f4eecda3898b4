//! Small string helpers shared across the crate.

/// Truncate a string to at most `max_chars` characters.
///
/// Cuts on character boundaries, so multi-byte text never panics.
///
/// # Examples
///
/// ```
/// use mediagrab_core::utils::truncate_str;
///
/// assert_eq!(truncate_str("привет мир", 6), "привет");
/// assert_eq!(truncate_str("short", 10), "short");
/// ```
#[must_use]
pub fn truncate_str(s: impl AsRef<str>, max_chars: usize) -> String {
    let s = s.as_ref();
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    s.char_indices()
        .nth(max_chars)
        .map_or_else(|| s.to_string(), |(pos, _)| s[..pos].to_string())
}

/// Owned copy of `value` unless it is missing or blank.
#[must_use]
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(ToString::to_string)
}
