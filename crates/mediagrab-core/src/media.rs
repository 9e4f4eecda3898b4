//! Unified media model produced by every provider resolver.

use crate::error::ResolveError;
use serde::{Deserialize, Serialize};

/// Kind of a media item; decides how the item is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image
    Photo,
    /// Video clip
    Video,
}

impl MediaKind {
    /// Guess the kind of a direct media URL from its extension or path.
    ///
    /// Anything without a video marker is treated as a photo.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let lower = url.to_lowercase();
        if lower.contains(".mp4") || lower.contains(".mov") || lower.contains("video") {
            Self::Video
        } else {
            Self::Photo
        }
    }
}

/// A single directly fetchable media resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Direct resource location (never an HTML page)
    pub url: String,
    /// Photo or video
    pub kind: MediaKind,
    /// Optional preview image location
    pub thumbnail_url: Option<String>,
    /// Optional caption text
    pub caption: Option<String>,
}

impl MediaItem {
    /// Create a photo item without thumbnail or caption.
    #[must_use]
    pub fn photo(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: MediaKind::Photo,
            thumbnail_url: None,
            caption: None,
        }
    }

    /// Create a video item without thumbnail or caption.
    #[must_use]
    pub fn video(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: MediaKind::Video,
            thumbnail_url: None,
            caption: None,
        }
    }

    /// Attach a thumbnail location.
    #[must_use]
    pub fn with_thumbnail(mut self, thumbnail_url: Option<String>) -> Self {
        self.thumbnail_url = thumbnail_url;
        self
    }

    /// Attach a caption.
    #[must_use]
    pub fn with_caption(mut self, caption: Option<String>) -> Self {
        self.caption = caption;
        self
    }
}

/// Outcome of resolving one canonical URL.
///
/// A resolved result always holds at least one item; a failed one holds
/// none and always carries a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    /// Ordered, non-empty media list
    Resolved(Vec<MediaItem>),
    /// Classified failure with its user-facing text
    Failed(ResolveError),
}

impl ResolutionResult {
    /// Wrap normalized items, turning an empty list into `empty_error`.
    #[must_use]
    pub fn from_items(items: Vec<MediaItem>, empty_error: ResolveError) -> Self {
        if items.is_empty() {
            Self::Failed(empty_error)
        } else {
            Self::Resolved(items)
        }
    }

    /// Whether resolution produced media.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Resolved items in delivery order (empty on failure).
    #[must_use]
    pub fn items(&self) -> &[MediaItem] {
        match self {
            Self::Resolved(items) => items,
            Self::Failed(_) => &[],
        }
    }

    /// Failure text, if resolution failed.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Resolved(_) => None,
            Self::Failed(err) => Some(&err.message),
        }
    }

    /// Failure details, if resolution failed.
    #[must_use]
    pub const fn error(&self) -> Option<&ResolveError> {
        match self {
            Self::Resolved(_) => None,
            Self::Failed(err) => Some(err),
        }
    }
}
