//! Testing helpers and mock utilities.
//!
//! Provides convenient constructors for mocked extraction clients and a
//! chat surface that records what it was asked to send.

use crate::delivery::{ChatSurface, SendInstruction};
use crate::error::DeliveryError;
use crate::providers::instagram::MockInstagramClient;
use crate::providers::tiktok::MockTikTokClient;
use crate::providers::{InstagramPayload, TikTokResponse};
use async_trait::async_trait;
use std::sync::Mutex;

/// Instagram payload with the given URLs and nothing else.
#[must_use]
pub fn instagram_payload(urls: &[&str]) -> InstagramPayload {
    InstagramPayload {
        url_list: urls.iter().map(ToString::to_string).collect(),
        ..InstagramPayload::default()
    }
}

/// Mock Instagram client that answers every fetch with `payload`.
#[must_use]
pub fn mock_instagram_returning(payload: Option<InstagramPayload>) -> MockInstagramClient {
    let mut mock = MockInstagramClient::new();
    mock.expect_fetch()
        .returning(move |_| Ok(payload.clone()));
    mock
}

/// Mock TikTok client that answers every fetch with `response`.
#[must_use]
pub fn mock_tiktok_returning(response: Option<TikTokResponse>) -> MockTikTokClient {
    let mut mock = MockTikTokClient::new();
    mock.expect_fetch()
        .returning(move |_, _| Ok(response.clone()));
    mock
}

/// Chat surface that records successful sends.
///
/// With `fail_media` set, photo/video/album sends fail and only text goes
/// through.
#[derive(Default)]
pub struct RecordingSurface {
    sent: Mutex<Vec<SendInstruction>>,
    fail_media: bool,
}

impl RecordingSurface {
    /// Surface that rejects every media send.
    #[must_use]
    pub fn failing_media() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_media: true,
        }
    }

    /// Instructions sent so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<SendInstruction> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatSurface for RecordingSurface {
    async fn send(&self, instruction: &SendInstruction) -> Result<(), DeliveryError> {
        if self.fail_media && !matches!(instruction, SendInstruction::Text { .. }) {
            return Err(DeliveryError::Send("file is too big".to_string()));
        }
        self.sent
            .lock()
            .map_err(|e| DeliveryError::Send(e.to_string()))?
            .push(instruction.clone());
        Ok(())
    }
}
