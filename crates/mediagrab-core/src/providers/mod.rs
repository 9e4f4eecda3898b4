//! Provider resolvers
//!
//! One resolver per upstream platform. A resolver orchestrates a single call
//! to its extraction client and normalizes the response into [`MediaItem`]s.
//!
//! [`MediaItem`]: crate::media::MediaItem

pub mod instagram;
pub mod tiktok;

mod http;

pub use instagram::{HttpInstagramClient, InstagramClient, InstagramPayload, InstagramResolver};
pub use tiktok::{
    HttpTikTokClient, TikTokClient, TikTokResolver, TikTokResponse, TikTokVersion,
};

use crate::classifier::ClassifiedLink;
use crate::config::ExtractorSettings;
use crate::error::ErrorKind;
use crate::media::ResolutionResult;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Supported upstream platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Instagram posts, reels and TV
    Instagram,
    /// TikTok videos and slideshows
    TikTok,
}

impl Provider {
    /// Display name used in logs
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::TikTok => "tiktok",
        }
    }

    /// Whether the provider has a notion of the given failure kind.
    ///
    /// TikTok content is never treated as private in this pipeline.
    #[must_use]
    pub const fn supports(self, kind: ErrorKind) -> bool {
        !matches!(
            (self, kind),
            (Self::TikTok, ErrorKind::PrivateOrAuthRequired)
        )
    }

    /// Provider wording for a classified failure.
    #[must_use]
    pub const fn failure_message(self, kind: ErrorKind) -> &'static str {
        match (self, kind) {
            (Self::Instagram, ErrorKind::PrivateOrAuthRequired) => {
                "This Instagram post is private or requires login. I cannot download it."
            }
            (Self::Instagram, ErrorKind::NotFound) => {
                "Instagram post not found. The link may be invalid or deleted."
            }
            (Self::Instagram, ErrorKind::RateLimited) => {
                "Instagram rate limit reached. Please try again later."
            }
            (Self::Instagram, ErrorKind::Generic) => {
                "Failed to download Instagram media. Please check the link and try again."
            }
            (Self::TikTok, ErrorKind::NotFound) => {
                "TikTok video not found. The link may be invalid or deleted."
            }
            (Self::TikTok, ErrorKind::RateLimited) => {
                "TikTok rate limit reached. Please try again later."
            }
            (Self::TikTok, ErrorKind::PrivateOrAuthRequired | ErrorKind::Generic) => {
                "Failed to download TikTok video. Please check the link and try again."
            }
        }
    }

    /// Wording used when extraction succeeded but yielded no media.
    #[must_use]
    pub const fn no_media_message(self) -> &'static str {
        match self {
            Self::Instagram => "No media found in Instagram post",
            Self::TikTok => "No video found in TikTok link",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Converts a canonical URL into a normalized media result.
///
/// Implementations never fail: every expected failure comes back as a
/// [`ResolutionResult::Failed`] with its message already worded.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Provider this resolver serves
    fn provider(&self) -> Provider;

    /// Resolve a canonical URL
    async fn resolve(&self, canonical_url: &str) -> ResolutionResult;
}

/// One resolver per provider, looked up by a classified link.
#[derive(Clone)]
pub struct Resolvers {
    instagram: Arc<dyn MediaResolver>,
    tiktok: Arc<dyn MediaResolver>,
}

impl Resolvers {
    /// Create a registry from explicit resolvers.
    #[must_use]
    pub fn new(instagram: Arc<dyn MediaResolver>, tiktok: Arc<dyn MediaResolver>) -> Self {
        Self { instagram, tiktok }
    }

    /// Build the HTTP-backed resolvers described by `settings`.
    #[must_use]
    pub fn from_settings(settings: &ExtractorSettings) -> Self {
        let timeout = settings.timeout();
        let instagram_client = HttpInstagramClient::new(&settings.instagram_api_url, timeout);
        let tiktok_client = HttpTikTokClient::new(&settings.tiktok_api_url, timeout);

        Self::new(
            Arc::new(InstagramResolver::new(Arc::new(instagram_client))),
            Arc::new(TikTokResolver::new(
                Arc::new(tiktok_client),
                settings.tiktok_version(),
            )),
        )
    }

    /// Resolver for `provider`
    #[must_use]
    pub fn get(&self, provider: Provider) -> &Arc<dyn MediaResolver> {
        match provider {
            Provider::Instagram => &self.instagram,
            Provider::TikTok => &self.tiktok,
        }
    }

    /// Resolve a classified link with its provider's resolver.
    pub async fn resolve(&self, link: &ClassifiedLink) -> ResolutionResult {
        self.get(link.provider).resolve(&link.canonical_url).await
    }
}
