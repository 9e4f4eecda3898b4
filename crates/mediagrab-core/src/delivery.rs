//! Delivery formatter
//!
//! Turns an ordered media list into send instructions for the chat surface
//! and executes them, replacing any send failure with one generic message.

use crate::error::DeliveryError;
use crate::media::{MediaItem, MediaKind};
use crate::utils::{non_empty, truncate_str};
use async_trait::async_trait;
use tracing::{error, info, warn};

/// Telegram caption limit in characters.
pub const MAX_CAPTION_CHARS: usize = 1024;

/// Telegram media group limit.
pub const MAX_ALBUM_SIZE: usize = 10;

/// Text sent instead of media when the send itself fails.
pub const DELIVERY_FAILED_MESSAGE: &str =
    "❌ Failed to send media. The file might be too large or unavailable.";

/// One slot of an album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumEntry {
    /// Photo or video
    pub kind: MediaKind,
    /// Direct media URL
    pub url: String,
    /// Caption; only ever set on the first slot
    pub caption: Option<String>,
}

/// A single platform send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendInstruction {
    /// Standalone photo or video
    Single {
        /// Photo or video
        kind: MediaKind,
        /// Direct media URL
        url: String,
        /// Caption shown under the media
        caption: Option<String>,
        /// Message to reply to
        reply_to: Option<i32>,
    },
    /// Grouped album, in order
    Album {
        /// Album slots
        entries: Vec<AlbumEntry>,
        /// Message to reply to
        reply_to: Option<i32>,
    },
    /// Plain text reply
    Text {
        /// Message text
        text: String,
        /// Message to reply to
        reply_to: Option<i32>,
    },
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatSurface: Send + Sync {
    /// Perform one send.
    async fn send(&self, instruction: &SendInstruction) -> Result<(), DeliveryError>;
}

/// Plan how to deliver `items`, replying to `reply_to` when known.
///
/// One item becomes a single media send. Several items become an album in
/// the original order, split into consecutive albums of at most
/// [`MAX_ALBUM_SIZE`]; a trailing chunk of one is sent as a single media.
///
/// Only position 0 carries a caption: the first caption found among the
/// items, whichever item held it. Returns an empty plan for no items.
#[must_use]
pub fn plan_delivery(items: Vec<MediaItem>, reply_to: Option<i32>) -> Vec<SendInstruction> {
    let mut caption = items
        .iter()
        .find_map(|item| non_empty(item.caption.as_deref()))
        .map(|caption| truncate_str(caption, MAX_CAPTION_CHARS));

    items
        .chunks(MAX_ALBUM_SIZE)
        .map(|chunk| match chunk {
            [item] => SendInstruction::Single {
                kind: item.kind,
                url: item.url.clone(),
                caption: caption.take(),
                reply_to,
            },
            _ => SendInstruction::Album {
                entries: chunk
                    .iter()
                    .map(|item| AlbumEntry {
                        kind: item.kind,
                        url: item.url.clone(),
                        caption: caption.take(),
                    })
                    .collect(),
                reply_to,
            },
        })
        .collect()
}

/// Execute a delivery plan on `surface`.
///
/// Stops at the first failed send, logs the cause and posts
/// [`DELIVERY_FAILED_MESSAGE`] instead. Returns whether every send succeeded.
pub async fn deliver(
    surface: &dyn ChatSurface,
    plan: &[SendInstruction],
    reply_to: Option<i32>,
) -> bool {
    for instruction in plan {
        if let Err(e) = surface.send(instruction).await {
            error!(error = %e, "Error sending media to chat");
            send_text(surface, DELIVERY_FAILED_MESSAGE, reply_to).await;
            return false;
        }
    }
    info!(sends = plan.len(), "Media delivered");
    true
}

/// Send a plain text reply, logging instead of failing.
pub async fn send_text(surface: &dyn ChatSurface, text: &str, reply_to: Option<i32>) {
    let instruction = SendInstruction::Text {
        text: text.to_string(),
        reply_to,
    };
    if let Err(e) = surface.send(&instruction).await {
        warn!(error = %e, "Error sending text message");
    }
}
