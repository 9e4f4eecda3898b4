//! Instagram resolver
//!
//! Fetches direct media URLs for posts, reels and TV links from an extraction
//! service and normalizes them into [`MediaItem`]s.

use super::http::ExtractorHttp;
use super::{MediaResolver, Provider};
use crate::error::{ErrorKind, ExtractionError, ResolveError};
use crate::media::{MediaItem, MediaKind, ResolutionResult};
use crate::utils::non_empty;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Raw extraction response for an Instagram link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InstagramPayload {
    /// Direct media URLs in post order
    #[serde(default)]
    pub url_list: Vec<String>,
    /// Post thumbnail
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Post caption
    #[serde(default)]
    pub caption: Option<String>,
    /// Extended post metadata; its caption is used when `caption` is absent
    #[serde(default)]
    pub post_info: Option<InstagramPostInfo>,
    /// Error text reported by the extraction service
    #[serde(default)]
    pub error: Option<String>,
}

/// Extended post metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InstagramPostInfo {
    /// Post caption
    #[serde(default)]
    pub caption: Option<String>,
}

impl InstagramPayload {
    /// Caption from the top level, falling back to `post_info`.
    #[must_use]
    pub fn caption(&self) -> Option<String> {
        non_empty(self.caption.as_deref()).or_else(|| {
            self.post_info
                .as_ref()
                .and_then(|info| non_empty(info.caption.as_deref()))
        })
    }
}

/// Extraction client for Instagram links.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InstagramClient: Send + Sync {
    /// Fetch the raw payload for `url`; `Ok(None)` means no payload.
    async fn fetch(&self, url: &str) -> Result<Option<InstagramPayload>, ExtractionError>;
}

/// [`InstagramClient`] backed by an HTTP extraction service.
pub struct HttpInstagramClient {
    http: ExtractorHttp,
}

impl HttpInstagramClient {
    /// Create a client for the extraction endpoint at `endpoint`.
    #[must_use]
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        Self {
            http: ExtractorHttp::new(endpoint, timeout),
        }
    }
}

#[async_trait]
impl InstagramClient for HttpInstagramClient {
    async fn fetch(&self, url: &str) -> Result<Option<InstagramPayload>, ExtractionError> {
        self.http.get_json(&[("url", url)]).await
    }
}

/// Resolver for Instagram links.
pub struct InstagramResolver {
    client: Arc<dyn InstagramClient>,
}

impl InstagramResolver {
    /// Create a resolver over `client`.
    #[must_use]
    pub fn new(client: Arc<dyn InstagramClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MediaResolver for InstagramResolver {
    fn provider(&self) -> Provider {
        Provider::Instagram
    }

    async fn resolve(&self, canonical_url: &str) -> ResolutionResult {
        info!(url = %canonical_url, "Fetching Instagram media");

        let payload = match self.client.fetch(canonical_url).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                warn!(url = %canonical_url, "Instagram extraction returned no payload");
                return ResolutionResult::Failed(no_media());
            }
            Err(e) => {
                error!(url = %canonical_url, error = %e, "Instagram download error");
                return ResolutionResult::Failed(ResolveError::classified(
                    Provider::Instagram,
                    &e.to_string(),
                ));
            }
        };

        if let Some(reason) = non_empty(payload.error.as_deref()) {
            error!(url = %canonical_url, error = %reason, "Instagram extraction reported failure");
            return ResolutionResult::Failed(ResolveError::classified(Provider::Instagram, &reason));
        }

        let items = normalize(payload);
        if items.is_empty() {
            warn!(url = %canonical_url, "No media found in Instagram post");
        } else {
            info!(url = %canonical_url, items = items.len(), "Instagram media resolved");
        }
        ResolutionResult::from_items(items, no_media())
    }
}

/// Map an Instagram payload to media items, one per URL in list order.
///
/// Blank URLs are skipped. Caption and thumbnail are copied onto every item.
#[must_use]
pub fn normalize(payload: InstagramPayload) -> Vec<MediaItem> {
    let caption = payload.caption();
    let thumbnail = non_empty(payload.thumbnail.as_deref());

    payload
        .url_list
        .into_iter()
        .filter(|url| !url.trim().is_empty())
        .map(|url| MediaItem {
            kind: MediaKind::from_url(&url),
            url,
            thumbnail_url: thumbnail.clone(),
            caption: caption.clone(),
        })
        .collect()
}

fn no_media() -> ResolveError {
    ResolveError::new(ErrorKind::Generic, Provider::Instagram.no_media_message())
}
