use crate::bot;
use crate::bot::handlers::Command;
use crate::config::BotSettings;
use mediagrab_core::pipeline::MediaPipeline;
use mediagrab_core::providers::Resolvers;
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::ChatMemberUpdated;
use tracing::{debug, error, info};

/// Run the Telegram transport runtime.
pub async fn run_bot(settings: Arc<BotSettings>) {
    let pipeline = init_pipeline(&settings);

    let bot = Bot::new(settings.telegram.telegram_token.clone());
    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![pipeline, settings])
        .default_handler(|upd| async move {
            debug!(update_id = ?upd.id, "Update not handled");
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn init_pipeline(settings: &BotSettings) -> Arc<MediaPipeline> {
    let extractor = settings.extractor.as_ref();
    info!(
        "Initializing media pipeline (instagram: {}, tiktok: {} {}, timeout: {}s)",
        extractor.instagram_api_url,
        extractor.tiktok_api_url,
        extractor.tiktok_version(),
        extractor.extractor_timeout_secs
    );

    Arc::new(MediaPipeline::new(Resolvers::from_settings(extractor)))
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_my_chat_member().endpoint(handle_my_chat_member))
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_command),
                )
                .branch(
                    dptree::filter(|msg: Message| bot::handlers::has_media_link(msg.text()))
                        .endpoint(handle_text),
                ),
        )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
) -> Result<(), teloxide::RequestError> {
    let res = match cmd {
        Command::Start | Command::Help => bot::handlers::usage(bot, msg).await,
    };
    if let Err(e) = res {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_text(
    bot: Bot,
    msg: Message,
    pipeline: Arc<MediaPipeline>,
) -> Result<(), teloxide::RequestError> {
    bot::handlers::handle_text(bot, msg, pipeline).await;
    respond(())
}

async fn handle_my_chat_member(update: ChatMemberUpdated) -> Result<(), teloxide::RequestError> {
    bot::handlers::my_chat_member(&update);
    respond(())
}
