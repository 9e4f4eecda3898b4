//! Link classifier
//!
//! Finds the first supported social-media link in a message and turns it into
//! a canonical URL tagged with its provider.
//!
//! Only the first matching candidate is ever considered; any further links in
//! the same message are ignored. This is the intended behavior.

use crate::providers::Provider;
use lazy_regex::lazy_regex;

/// Instagram post, reel and TV links. The `url` group excludes query and fragment.
static RE_INSTAGRAM: lazy_regex::Lazy<regex::Regex> = lazy_regex!(
    r"(?i)^(?P<url>(?:https?://)?(?:www\.|m\.)?(?:instagram\.com|instagr\.am)/(?:p|reels?|tv)/[A-Za-z0-9_-]+/?)(?:\?[^\s#]*)?(?:#\S*)?$"
);

/// TikTok canonical, short-token and vanity short links.
static RE_TIKTOK: lazy_regex::Lazy<regex::Regex> = lazy_regex!(
    r"(?i)^(?P<url>(?:https?://)?(?:www\.|m\.|vm\.|vt\.)?tiktok\.com/(?:@[^/\s?#]+/video/\d+|\w+/\d+(?:\.html)?|[A-Za-z0-9_-]+/?))(?:\?[^\s#]*)?(?:#\S*)?$"
);

/// Characters stripped from both ends of a candidate before matching.
const WRAPPING_CHARS: &[char] = &['(', ')', '[', ']', '<', '>', '"', '\'', '«', '»'];

/// Sentence punctuation stripped from the end of a candidate.
///
/// `?` is absent: an empty query already matches it.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', '!', ';', ':'];

/// A recognized link, consumed right away by the matching resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLink {
    /// Provider owning the link
    pub provider: Provider,
    /// Normalized link used as the resolver input
    pub canonical_url: String,
}

/// Return the first supported link in `text`, or `None` when there is none.
///
/// The text is scanned left to right as whitespace-separated candidates and
/// each candidate must match a provider pattern in full.
///
/// # Examples
///
/// ```
/// use mediagrab_core::classifier::classify;
/// use mediagrab_core::providers::Provider;
///
/// let link = classify("look: instagram.com/p/ABC123?igsh=x").unwrap();
/// assert_eq!(link.provider, Provider::Instagram);
/// assert_eq!(link.canonical_url, "https://instagram.com/p/ABC123");
///
/// assert!(classify("nothing to see here").is_none());
/// ```
#[must_use]
pub fn classify(text: &str) -> Option<ClassifiedLink> {
    text.split_whitespace()
        .map(|token| {
            token.trim_start_matches(WRAPPING_CHARS).trim_end_matches(|c: char| {
                WRAPPING_CHARS.contains(&c) || TRAILING_PUNCTUATION.contains(&c)
            })
        })
        .filter(|candidate| !candidate.is_empty())
        .find_map(classify_candidate)
}

fn classify_candidate(candidate: &str) -> Option<ClassifiedLink> {
    [
        (Provider::Instagram, &*RE_INSTAGRAM),
        (Provider::TikTok, &*RE_TIKTOK),
    ]
    .into_iter()
    .find_map(|(provider, re)| {
        let url = re.captures(candidate)?.name("url")?.as_str();
        Some(ClassifiedLink {
            provider,
            canonical_url: canonicalize(url),
        })
    })
}

fn canonicalize(url: &str) -> String {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}
