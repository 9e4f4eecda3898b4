//! Error model for resolution and delivery.
//!
//! Expected resolution failures are plain values: a raw upstream error text is
//! classified into a closed [`ErrorKind`] by one ordered rule table and then
//! worded per provider. Nothing here is ever retried.

use crate::providers::Provider;
use thiserror::Error;

/// Classification of a resolution failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Content is private or needs an authenticated session
    PrivateOrAuthRequired,
    /// Content does not exist (deleted or invalid link)
    NotFound,
    /// Upstream throttled the request
    RateLimited,
    /// Anything else
    Generic,
}

/// Ordered classification rules: first rule with a matching needle wins.
const CLASSIFICATION_RULES: &[(ErrorKind, &[&str])] = &[
    (ErrorKind::PrivateOrAuthRequired, &["private", "login"]),
    (ErrorKind::NotFound, &["404", "not found"]),
    (ErrorKind::RateLimited, &["rate limit"]),
];

impl ErrorKind {
    /// Classify a raw upstream error text for the given provider.
    ///
    /// Rules a provider does not support are skipped, so the same text can
    /// land in different kinds for different providers.
    #[must_use]
    pub fn classify(provider: Provider, raw: &str) -> Self {
        let lower = raw.to_lowercase();
        CLASSIFICATION_RULES
            .iter()
            .filter(|(kind, _)| provider.supports(*kind))
            .find(|(_, needles)| needles.iter().any(|needle| lower.contains(needle)))
            .map_or(Self::Generic, |(kind, _)| *kind)
    }

    /// Glyph shown in front of the message in chat.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::PrivateOrAuthRequired => "🔒",
            Self::NotFound | Self::RateLimited | Self::Generic => "❌",
        }
    }
}

/// A classified resolution failure with its final human-readable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveError {
    /// Failure classification
    pub kind: ErrorKind,
    /// Provider-worded message
    pub message: String,
}

impl ResolveError {
    /// Create a new resolution error.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify `raw` and word it with the provider's template for that kind.
    #[must_use]
    pub fn classified(provider: Provider, raw: &str) -> Self {
        let kind = ErrorKind::classify(provider, raw);
        Self::new(kind, provider.failure_message(kind))
    }

    /// Message as rendered in chat, prefixed with the kind glyph.
    #[must_use]
    pub fn user_message(&self) -> String {
        format!("{} {}", self.kind.glyph(), self.message)
    }
}

/// Failure reported by an extraction client.
///
/// The `Display` text is the raw input to [`ErrorKind::classify`].
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("Network error: {0}")]
    Network(String),
    /// Extraction service answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status {
        /// Numeric HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },
    /// Response body could not be decoded
    #[error("JSON error: {0}")]
    Json(String),
    /// Extraction service reported an error in its payload
    #[error("Upstream error: {0}")]
    Upstream(String),
}

/// Send-time failure at the chat surface boundary.
///
/// Never shown to users; only logged.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// A media URL could not be turned into a sendable reference
    #[error("Invalid media URL: {0}")]
    InvalidUrl(String),
    /// The platform rejected or failed the send
    #[error("Send failed: {0}")]
    Send(String),
}
