//! TikTok resolver
//!
//! Handles both regular videos and photo slideshows. Video downloads prefer
//! the standard-definition variant and never pick the watermarked one.

use super::http::ExtractorHttp;
use super::{MediaResolver, Provider};
use crate::error::{ErrorKind, ExtractionError, ResolveError};
use crate::media::{MediaItem, ResolutionResult};
use crate::utils::non_empty;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Message used when the service gives no usable answer and no error text.
const FETCH_FAILED: &str = "Failed to fetch TikTok video";

/// Extraction backend version understood by the TikTok service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TikTokVersion {
    /// First generation backend
    V1,
    /// Second generation backend
    V2,
    /// Third generation backend (most reliable)
    #[default]
    V3,
}

impl TikTokVersion {
    /// Wire value of the version selector
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
            Self::V3 => "v3",
        }
    }
}

impl fmt::Display for TikTokVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TikTokVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" => Ok(Self::V1),
            "v2" => Ok(Self::V2),
            "v3" => Ok(Self::V3),
            other => Err(format!("Unknown TikTok extractor version: {other}")),
        }
    }
}

/// Status reported by the TikTok extraction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TikTokStatus {
    /// Extraction succeeded
    Success,
    /// Any other status value
    #[default]
    #[serde(other)]
    Error,
}

/// Raw extraction response for a TikTok link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TikTokResponse {
    /// Overall status
    #[serde(default)]
    pub status: TikTokStatus,
    /// Error text accompanying a non-success status
    #[serde(default)]
    pub message: Option<String>,
    /// Extracted post data
    #[serde(default)]
    pub result: Option<TikTokData>,
}

/// Post data: either a video or a list of slideshow images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TikTokData {
    /// Standard-definition video, no watermark
    #[serde(default, rename = "videoSD")]
    pub video_sd: Option<String>,
    /// High-definition video, no watermark
    #[serde(default, rename = "videoHD")]
    pub video_hd: Option<String>,
    /// Watermarked video; never delivered
    #[serde(default, rename = "videoWatermark")]
    pub video_watermark: Option<String>,
    /// Slideshow images in order
    #[serde(default)]
    pub images: Option<Vec<String>>,
    /// Post author
    #[serde(default)]
    pub author: Option<TikTokAuthor>,
}

/// Post author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TikTokAuthor {
    /// Avatar image, used as the thumbnail of every item
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Extraction client for TikTok links.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TikTokClient: Send + Sync {
    /// Fetch the raw response for `url` using the given backend version.
    async fn fetch(
        &self,
        url: &str,
        version: TikTokVersion,
    ) -> Result<Option<TikTokResponse>, ExtractionError>;
}

/// [`TikTokClient`] backed by an HTTP extraction service.
pub struct HttpTikTokClient {
    http: ExtractorHttp,
}

impl HttpTikTokClient {
    /// Create a client for the extraction endpoint at `endpoint`.
    #[must_use]
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        Self {
            http: ExtractorHttp::new(endpoint, timeout),
        }
    }
}

#[async_trait]
impl TikTokClient for HttpTikTokClient {
    async fn fetch(
        &self,
        url: &str,
        version: TikTokVersion,
    ) -> Result<Option<TikTokResponse>, ExtractionError> {
        self.http
            .get_json(&[("url", url), ("version", version.as_str())])
            .await
    }
}

/// Resolver for TikTok links.
pub struct TikTokResolver {
    client: Arc<dyn TikTokClient>,
    version: TikTokVersion,
}

impl TikTokResolver {
    /// Create a resolver over `client` using backend `version`.
    #[must_use]
    pub fn new(client: Arc<dyn TikTokClient>, version: TikTokVersion) -> Self {
        Self { client, version }
    }
}

#[async_trait]
impl MediaResolver for TikTokResolver {
    fn provider(&self) -> Provider {
        Provider::TikTok
    }

    async fn resolve(&self, canonical_url: &str) -> ResolutionResult {
        info!(url = %canonical_url, version = %self.version, "Fetching TikTok video");

        let response = match self.client.fetch(canonical_url, self.version).await {
            Ok(Some(response)) => response,
            Ok(None) => {
                warn!(url = %canonical_url, "TikTok extraction returned no payload");
                return ResolutionResult::Failed(ResolveError::new(
                    ErrorKind::Generic,
                    FETCH_FAILED,
                ));
            }
            Err(e) => {
                error!(url = %canonical_url, error = %e, "TikTok download error");
                return ResolutionResult::Failed(ResolveError::classified(
                    Provider::TikTok,
                    &e.to_string(),
                ));
            }
        };

        if response.status != TikTokStatus::Success {
            let failure = match non_empty(response.message.as_deref()) {
                Some(reason) => {
                    error!(url = %canonical_url, error = %reason, "TikTok extraction reported failure");
                    ResolveError::classified(Provider::TikTok, &reason)
                }
                None => {
                    error!(url = %canonical_url, "TikTok extraction failed without details");
                    ResolveError::new(ErrorKind::Generic, FETCH_FAILED)
                }
            };
            return ResolutionResult::Failed(failure);
        }

        let items = response.result.map(normalize).unwrap_or_default();
        if items.is_empty() {
            warn!(url = %canonical_url, "No video found in TikTok link");
        } else {
            info!(url = %canonical_url, items = items.len(), "TikTok media resolved");
        }
        ResolutionResult::from_items(
            items,
            ResolveError::new(ErrorKind::Generic, Provider::TikTok.no_media_message()),
        )
    }
}

/// Map TikTok post data to media items.
///
/// A video yields exactly one item (SD first, then HD). Without a video each
/// slideshow image yields a photo, in order. The author avatar is the
/// thumbnail of every item.
#[must_use]
pub fn normalize(data: TikTokData) -> Vec<MediaItem> {
    let avatar = data
        .author
        .as_ref()
        .and_then(|author| non_empty(author.avatar.as_deref()));

    let video = non_empty(data.video_sd.as_deref()).or_else(|| non_empty(data.video_hd.as_deref()));
    if let Some(url) = video {
        return vec![MediaItem::video(url).with_thumbnail(avatar)];
    }

    data.images
        .unwrap_or_default()
        .into_iter()
        .filter(|url| !url.is_empty())
        .map(|url| MediaItem::photo(url).with_thumbnail(avatar.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mock_tiktok_returning;

    fn success(data: TikTokData) -> TikTokResponse {
        TikTokResponse {
            status: TikTokStatus::Success,
            message: None,
            result: Some(data),
        }
    }

    #[tokio::test]
    async fn test_video_with_avatar_thumbnail() -> Result<(), serde_json::Error> {
        let response: TikTokResponse = serde_json::from_str(
            r#"{"status":"success","result":{"videoSD":"https://x/v.mp4","author":{"avatar":"https://x/a.png"}}}"#,
        )?;
        let resolver = TikTokResolver::new(
            Arc::new(mock_tiktok_returning(Some(response))),
            TikTokVersion::V3,
        );

        let result = resolver.resolve("https://vt.tiktok.com/ZSabc/").await;
        assert_eq!(
            result.items(),
            &[MediaItem::video("https://x/v.mp4").with_thumbnail(Some("https://x/a.png".to_string()))]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_slideshow_keeps_order() -> Result<(), serde_json::Error> {
        let response: TikTokResponse = serde_json::from_str(
            r#"{"status":"success","result":{"images":["https://x/1.jpg","https://x/2.jpg"]}}"#,
        )?;
        let resolver = TikTokResolver::new(
            Arc::new(mock_tiktok_returning(Some(response))),
            TikTokVersion::V3,
        );

        let result = resolver.resolve("https://vt.tiktok.com/ZSabc/").await;
        assert_eq!(
            result.items(),
            &[
                MediaItem::photo("https://x/1.jpg"),
                MediaItem::photo("https://x/2.jpg")
            ]
        );
        Ok(())
    }

    #[test]
    fn test_prefers_sd_and_skips_watermark() {
        let items = normalize(TikTokData {
            video_sd: Some("https://x/sd.mp4".to_string()),
            video_hd: Some("https://x/hd.mp4".to_string()),
            video_watermark: Some("https://x/wm.mp4".to_string()),
            ..TikTokData::default()
        });
        assert_eq!(items, vec![MediaItem::video("https://x/sd.mp4")]);

        let items = normalize(TikTokData {
            video_sd: Some(String::new()),
            video_hd: Some("https://x/hd.mp4".to_string()),
            video_watermark: Some("https://x/wm.mp4".to_string()),
            ..TikTokData::default()
        });
        assert_eq!(items, vec![MediaItem::video("https://x/hd.mp4")]);
    }

    #[test]
    fn test_watermark_only_yields_nothing() {
        let items = normalize(TikTokData {
            video_watermark: Some("https://x/wm.mp4".to_string()),
            ..TikTokData::default()
        });
        assert!(items.is_empty());
    }

    #[test]
    fn test_video_wins_over_images() {
        let items = normalize(TikTokData {
            video_sd: Some("https://x/sd.mp4".to_string()),
            images: Some(vec!["https://x/1.jpg".to_string()]),
            ..TikTokData::default()
        });
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "https://x/sd.mp4");
    }

    #[tokio::test]
    async fn test_requests_configured_version() {
        let mut client = MockTikTokClient::new();
        client
            .expect_fetch()
            .withf(|_, version| *version == TikTokVersion::V2)
            .times(1)
            .returning(|_, _| Ok(Some(success(TikTokData {
                video_hd: Some("https://x/hd.mp4".to_string()),
                ..TikTokData::default()
            }))));
        let resolver = TikTokResolver::new(Arc::new(client), TikTokVersion::V2);

        assert!(resolver.resolve("https://vt.tiktok.com/ZSabc/").await.succeeded());
    }

    #[tokio::test]
    async fn test_failure_status_is_classified() -> Result<(), serde_json::Error> {
        let response: TikTokResponse =
            serde_json::from_str(r#"{"status":"error","message":"Video not found"}"#)?;
        let resolver = TikTokResolver::new(
            Arc::new(mock_tiktok_returning(Some(response))),
            TikTokVersion::V3,
        );

        let result = resolver.resolve("https://vt.tiktok.com/ZSabc/").await;
        assert_eq!(result.error().map(|e| e.kind), Some(ErrorKind::NotFound));
        assert_eq!(
            result.error_message(),
            Some("TikTok video not found. The link may be invalid or deleted.")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_status_without_message() {
        let resolver = TikTokResolver::new(
            Arc::new(mock_tiktok_returning(Some(TikTokResponse::default()))),
            TikTokVersion::V3,
        );

        let result = resolver.resolve("https://vt.tiktok.com/ZSabc/").await;
        assert_eq!(result.error_message(), Some(FETCH_FAILED));
    }

    #[tokio::test]
    async fn test_success_without_media() {
        let resolver = TikTokResolver::new(
            Arc::new(mock_tiktok_returning(Some(success(TikTokData::default())))),
            TikTokVersion::V3,
        );

        let result = resolver.resolve("https://vt.tiktok.com/ZSabc/").await;
        assert_eq!(result.error_message(), Some("No video found in TikTok link"));
    }

    #[tokio::test]
    async fn test_login_text_is_generic_for_tiktok() {
        let mut client = MockTikTokClient::new();
        client
            .expect_fetch()
            .returning(|_, _| Err(ExtractionError::Upstream("please login".to_string())));
        let resolver = TikTokResolver::new(Arc::new(client), TikTokVersion::V3);

        let result = resolver.resolve("https://vt.tiktok.com/ZSabc/").await;
        assert_eq!(result.error().map(|e| e.kind), Some(ErrorKind::Generic));
    }

    #[test]
    fn test_version_parsing() {
        assert_eq!("V1".parse::<TikTokVersion>(), Ok(TikTokVersion::V1));
        assert_eq!(" v3 ".parse::<TikTokVersion>(), Ok(TikTokVersion::V3));
        assert!("v9".parse::<TikTokVersion>().is_err());
    }
}
