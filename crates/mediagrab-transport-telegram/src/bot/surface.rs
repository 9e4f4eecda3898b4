//! Outbound chat surface backed by the Telegram Bot API.
//!
//! Media is sent by URL; Telegram fetches it from the CDN itself.

use async_trait::async_trait;
use mediagrab_core::delivery::{AlbumEntry, ChatSurface, SendInstruction};
use mediagrab_core::error::DeliveryError;
use mediagrab_core::media::MediaKind;
use teloxide::prelude::*;
use teloxide::types::{
    InputFile, InputMedia, InputMediaPhoto, InputMediaVideo, MessageId, ReplyParameters,
};
use teloxide::RequestError;
use tracing::debug;

/// Sends delivery instructions into one chat.
pub struct TelegramSurface {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramSurface {
    /// Surface for `chat_id`
    #[must_use]
    pub const fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }

    async fn send_single(
        &self,
        kind: MediaKind,
        url: &str,
        caption: Option<&str>,
        reply_to: Option<i32>,
    ) -> Result<(), DeliveryError> {
        let file = input_file(url)?;
        let result = match kind {
            MediaKind::Photo => {
                let mut req = self.bot.send_photo(self.chat_id, file);
                if let Some(caption) = caption {
                    req = req.caption(caption);
                }
                if let Some(params) = reply_parameters(reply_to) {
                    req = req.reply_parameters(params);
                }
                req.await
            }
            MediaKind::Video => {
                let mut req = self.bot.send_video(self.chat_id, file);
                if let Some(caption) = caption {
                    req = req.caption(caption);
                }
                if let Some(params) = reply_parameters(reply_to) {
                    req = req.reply_parameters(params);
                }
                req.await
            }
        };
        result.map_err(send_error)?;
        debug!(chat_id = %self.chat_id, ?kind, "Single media sent");
        Ok(())
    }

    async fn send_album(
        &self,
        entries: &[AlbumEntry],
        reply_to: Option<i32>,
    ) -> Result<(), DeliveryError> {
        let media = album_media(entries)?;
        let mut req = self.bot.send_media_group(self.chat_id, media);
        if let Some(params) = reply_parameters(reply_to) {
            req = req.reply_parameters(params);
        }
        req.await.map_err(send_error)?;
        debug!(chat_id = %self.chat_id, items = entries.len(), "Album sent");
        Ok(())
    }

    async fn send_text(&self, text: &str, reply_to: Option<i32>) -> Result<(), DeliveryError> {
        let mut req = self.bot.send_message(self.chat_id, text);
        if let Some(params) = reply_parameters(reply_to) {
            req = req.reply_parameters(params);
        }
        req.await.map_err(send_error)?;
        Ok(())
    }
}

#[async_trait]
impl ChatSurface for TelegramSurface {
    async fn send(&self, instruction: &SendInstruction) -> Result<(), DeliveryError> {
        match instruction {
            SendInstruction::Single {
                kind,
                url,
                caption,
                reply_to,
            } => {
                self.send_single(*kind, url, caption.as_deref(), *reply_to)
                    .await
            }
            SendInstruction::Album { entries, reply_to } => {
                self.send_album(entries, *reply_to).await
            }
            SendInstruction::Text { text, reply_to } => self.send_text(text, *reply_to).await,
        }
    }
}

/// Reply linkage to the originating message.
///
/// The send still goes through if that message was deleted meanwhile.
#[must_use]
pub fn reply_parameters(reply_to: Option<i32>) -> Option<ReplyParameters> {
    reply_to.map(|id| ReplyParameters::new(MessageId(id)).allow_sending_without_reply())
}

/// Convert album entries into Telegram media group items, keeping order.
///
/// # Errors
///
/// Returns [`DeliveryError::InvalidUrl`] if any entry's URL does not parse.
pub fn album_media(entries: &[AlbumEntry]) -> Result<Vec<InputMedia>, DeliveryError> {
    entries
        .iter()
        .map(|entry| {
            let file = input_file(&entry.url)?;
            let media = match entry.kind {
                MediaKind::Photo => {
                    let mut photo = InputMediaPhoto::new(file);
                    if let Some(caption) = &entry.caption {
                        photo = photo.caption(caption.clone());
                    }
                    InputMedia::Photo(photo)
                }
                MediaKind::Video => {
                    let mut video = InputMediaVideo::new(file);
                    if let Some(caption) = &entry.caption {
                        video = video.caption(caption.clone());
                    }
                    InputMedia::Video(video)
                }
            };
            Ok(media)
        })
        .collect()
}

fn input_file(url: &str) -> Result<InputFile, DeliveryError> {
    url.parse()
        .map(InputFile::url)
        .map_err(|e| DeliveryError::InvalidUrl(format!("{url}: {e}")))
}

fn send_error(e: RequestError) -> DeliveryError {
    DeliveryError::Send(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: MediaKind, url: &str, caption: Option<&str>) -> AlbumEntry {
        AlbumEntry {
            kind,
            url: url.to_string(),
            caption: caption.map(ToString::to_string),
        }
    }

    #[test]
    fn test_reply_parameters_target_origin_message() {
        assert!(reply_parameters(None).is_none());

        let params = reply_parameters(Some(42));
        assert_eq!(params.map(|p| p.message_id), Some(MessageId(42)));
    }

    #[test]
    fn test_album_media_keeps_order_and_caption() -> Result<(), DeliveryError> {
        let media = album_media(&[
            entry(MediaKind::Photo, "https://cdn.x/1.jpg", Some("first")),
            entry(MediaKind::Video, "https://cdn.x/2.mp4", None),
        ])?;

        assert_eq!(media.len(), 2);
        match &media[..] {
            [InputMedia::Photo(photo), InputMedia::Video(video)] => {
                assert_eq!(photo.caption.as_deref(), Some("first"));
                assert!(video.caption.is_none());
            }
            other => panic!("unexpected media group: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_album_media_rejects_bad_url() {
        let result = album_media(&[entry(MediaKind::Photo, "not a url", None)]);
        assert!(matches!(result, Err(DeliveryError::InvalidUrl(_))));
    }
}
