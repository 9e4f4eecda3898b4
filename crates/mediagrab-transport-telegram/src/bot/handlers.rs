use crate::bot::TelegramSurface;
use anyhow::Result;
use mediagrab_core::classifier::classify;
use mediagrab_core::pipeline::{HandleOutcome, MediaPipeline};
use std::sync::Arc;
use teloxide::{
    prelude::*,
    types::{ChatMemberUpdated, ParseMode},
    utils::command::BotCommands,
};
use tracing::{debug, info};

// Helper function to get user name from Message
fn get_user_name(msg: &Message) -> String {
    if let Some(ref user) = msg.from {
        if let Some(ref username) = user.username {
            return username.clone();
        }
        if !user.first_name.is_empty() {
            return user.first_name.clone();
        }
    }
    "Unknown".to_string()
}

/// Safe extraction of user ID from a message.
/// Returns 0 if the user information is missing.
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// Supported commands for the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Show the welcome message
    #[command(description = "Start the bot.")]
    Start,
    /// Show supported links
    #[command(description = "Show supported links.")]
    Help,
}

/// Usage text listing the supported link shapes.
///
/// # Examples
///
/// ```
/// use mediagrab_transport_telegram::bot::handlers::usage_text;
/// assert!(usage_text().contains("instagram.com/p/"));
/// ```
#[must_use]
pub fn usage_text() -> String {
    "👋 <b>Send me a link and I will reply with the media.</b>\n\n\
     <b>Instagram</b>\n\
     • https://www.instagram.com/p/…\n\
     • https://www.instagram.com/reel/…\n\
     • https://www.instagram.com/tv/…\n\n\
     <b>TikTok</b>\n\
     • https://www.tiktok.com/@user/video/…\n\
     • https://vm.tiktok.com/… and https://vt.tiktok.com/…\n\n\
     <i>Works in private chats and in groups.</i>"
        .to_string()
}

/// Start and help handler
///
/// # Errors
///
/// Returns an error if the usage message cannot be sent.
pub async fn usage(bot: Bot, msg: Message) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    let user_name = get_user_name(&msg);
    info!("User {user_id} ({user_name}) asked for usage.");

    bot.send_message(msg.chat.id, usage_text())
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Whether a message text carries a supported link.
///
/// Used as the dispatcher filter, so other text is left for later branches.
#[must_use]
pub fn has_media_link(text: Option<&str>) -> bool {
    text.is_some_and(|text| classify(text).is_some())
}

/// Run a text message through the media pipeline.
///
/// Replies go into the message's chat, threaded to the message.
pub async fn handle_text(bot: Bot, msg: Message, pipeline: Arc<MediaPipeline>) -> HandleOutcome {
    let Some(text) = msg.text() else {
        return HandleOutcome::NoMatch;
    };

    let surface = TelegramSurface::new(bot, msg.chat.id);
    let outcome = pipeline.handle(text, Some(msg.id.0), &surface).await;

    match outcome {
        HandleOutcome::NoMatch => debug!(chat_id = %msg.chat.id, "No supported link in message"),
        _ => info!(
            chat_id = %msg.chat.id,
            user_id = get_user_id_safe(&msg),
            ?outcome,
            "Message handled"
        ),
    }
    outcome
}

/// Log the bot being added to or removed from a chat.
pub fn my_chat_member(update: &ChatMemberUpdated) {
    let chat_title = update.chat.title().unwrap_or("private chat");
    if update.new_chat_member.kind.is_present() {
        info!(chat_id = %update.chat.id, "Bot added to chat \"{chat_title}\"");
    } else {
        info!(chat_id = %update.chat.id, "Bot removed from chat \"{chat_title}\"");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_parse() {
        assert_eq!(Command::parse("/start", "mediagrab_bot").ok(), Some(Command::Start));
        assert_eq!(
            Command::parse("/help@mediagrab_bot", "mediagrab_bot").ok(),
            Some(Command::Help)
        );
        assert!(Command::parse("/clear", "mediagrab_bot").is_err());
    }

    #[test]
    fn test_only_link_text_is_claimed() {
        assert!(has_media_link(Some("look https://vt.tiktok.com/ZSabcDEF/.")));
        assert!(has_media_link(Some("https://www.instagram.com/p/ABC123/")));
        assert!(!has_media_link(Some("good morning everyone")));
        assert!(!has_media_link(Some("https://example.com/p/ABC123/")));
        assert!(!has_media_link(None));
    }

    #[test]
    fn test_usage_lists_both_providers() {
        let text = usage_text();
        assert!(text.contains("Instagram"));
        assert!(text.contains("TikTok"));
        assert!(text.contains("vt.tiktok.com"));
    }
}
