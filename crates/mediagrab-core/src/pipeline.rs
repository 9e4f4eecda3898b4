//! Per-message handling cycle: classify, resolve, plan, deliver.
//!
//! Every value produced here is owned by one cycle and dropped when it ends;
//! the pipeline itself is read-only and can be shared across tasks.

use crate::classifier::classify;
use crate::delivery::{deliver, plan_delivery, send_text, ChatSurface};
use crate::error::ErrorKind;
use crate::media::ResolutionResult;
use crate::providers::Resolvers;
use tracing::info;

/// What happened to one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// No supported link; the caller should hand the message on
    NoMatch,
    /// Media was sent
    Delivered,
    /// Resolution failed and the error text was sent
    ResolutionFailed(ErrorKind),
    /// Sending failed and the generic failure text was sent
    DeliveryFailed,
}

/// Link-to-media pipeline.
#[derive(Clone)]
pub struct MediaPipeline {
    resolvers: Resolvers,
}

impl MediaPipeline {
    /// Create a pipeline over the given resolvers.
    #[must_use]
    pub const fn new(resolvers: Resolvers) -> Self {
        Self { resolvers }
    }

    /// Handle one message's text, replying on `surface`.
    ///
    /// `message_id` is the originating message; when present every reply is
    /// threaded to it.
    pub async fn handle(
        &self,
        text: &str,
        message_id: Option<i32>,
        surface: &dyn ChatSurface,
    ) -> HandleOutcome {
        let Some(link) = classify(text) else {
            return HandleOutcome::NoMatch;
        };
        info!(provider = %link.provider, url = %link.canonical_url, "Supported link received");

        match self.resolvers.resolve(&link).await {
            ResolutionResult::Resolved(items) => {
                let plan = plan_delivery(items, message_id);
                if deliver(surface, &plan, message_id).await {
                    HandleOutcome::Delivered
                } else {
                    HandleOutcome::DeliveryFailed
                }
            }
            ResolutionResult::Failed(err) => {
                send_text(surface, &err.user_message(), message_id).await;
                HandleOutcome::ResolutionFailed(err.kind)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::SendInstruction;
    use crate::media::MediaKind;
    use crate::providers::{InstagramResolver, TikTokResolver, TikTokVersion};
    use crate::testing::{
        instagram_payload, mock_instagram_returning, mock_tiktok_returning, RecordingSurface,
    };
    use std::sync::Arc;

    fn pipeline_with_instagram(
        payload: Option<crate::providers::InstagramPayload>,
    ) -> MediaPipeline {
        MediaPipeline::new(Resolvers::new(
            Arc::new(InstagramResolver::new(Arc::new(mock_instagram_returning(
                payload,
            )))),
            Arc::new(TikTokResolver::new(
                Arc::new(mock_tiktok_returning(None)),
                TikTokVersion::V3,
            )),
        ))
    }

    #[tokio::test]
    async fn test_plain_text_is_not_handled() {
        let pipeline = pipeline_with_instagram(None);
        let surface = RecordingSurface::default();

        let outcome = pipeline.handle("just chatting", Some(1), &surface).await;

        assert_eq!(outcome, HandleOutcome::NoMatch);
        assert!(surface.sent().is_empty());
    }

    #[tokio::test]
    async fn test_instagram_photo_is_delivered_as_reply() {
        let mut payload = instagram_payload(&["https://x/a.jpg"]);
        payload.caption = Some("hi".to_string());
        let pipeline = pipeline_with_instagram(Some(payload));
        let surface = RecordingSurface::default();

        let outcome = pipeline
            .handle("https://www.instagram.com/p/ABC123/", Some(10), &surface)
            .await;

        assert_eq!(outcome, HandleOutcome::Delivered);
        assert_eq!(
            surface.sent(),
            vec![SendInstruction::Single {
                kind: MediaKind::Photo,
                url: "https://x/a.jpg".to_string(),
                caption: Some("hi".to_string()),
                reply_to: Some(10),
            }]
        );
    }

    #[tokio::test]
    async fn test_resolution_failure_sends_worded_error() {
        let pipeline = pipeline_with_instagram(None);
        let surface = RecordingSurface::default();

        let outcome = pipeline
            .handle("https://vt.tiktok.com/ZSabc/", None, &surface)
            .await;

        assert_eq!(outcome, HandleOutcome::ResolutionFailed(ErrorKind::Generic));
        assert_eq!(
            surface.sent(),
            vec![SendInstruction::Text {
                text: "❌ Failed to fetch TikTok video".to_string(),
                reply_to: None,
            }]
        );
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported() {
        let pipeline = pipeline_with_instagram(Some(instagram_payload(&[
            "https://x/1.jpg",
            "https://x/2.jpg",
        ])));
        let surface = RecordingSurface::failing_media();

        let outcome = pipeline
            .handle("https://instagram.com/p/ABC/", Some(3), &surface)
            .await;

        assert_eq!(outcome, HandleOutcome::DeliveryFailed);
        assert_eq!(surface.sent().len(), 1);
    }
}
