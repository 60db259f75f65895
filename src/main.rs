//! # Daily Poll Bot Main Entry Point
//!
//! Initializes logging, loads configuration, starts the broadcast scheduler,
//! and runs the Telegram dispatch loop until shutdown.

use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::update_listeners::polling_default;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bot;
mod config;
mod services;
mod storage;
mod utils;

use crate::bot::delivery::{TelegramTransport, Transport};
use crate::bot::handlers::error::UpdateErrorHandler;
use crate::bot::handlers::BotHandler;
use crate::config::Config;
use crate::services::broadcast::BroadcastService;
use crate::storage::GroupStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daily_poll_bot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; a missing BOT_TOKEN aborts here, before any loop.
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Daily Poll Bot v{}", env!("CARGO_PKG_VERSION"));
    info!("Groups file: {}", config.groups_file.display());

    let store = GroupStore::new(&config.groups_file);
    let bot = Bot::new(&config.bot_token);
    let transport: Arc<dyn Transport> = Arc::new(TelegramTransport::new(bot.clone()));

    // Start the daily broadcast scheduler
    let mut broadcast_service = BroadcastService::new(transport.clone(), store.clone()).await?;
    broadcast_service.start().await?;

    // Drop any webhook left over from a previous deployment; long polling
    // and a webhook cannot coexist.
    bot.delete_webhook().drop_pending_updates(true).await?;

    let handler = BotHandler::new(store, transport);
    let listener = polling_default(bot.clone()).await;

    info!("Bot started. Waiting to be added to groups...");

    let mut dispatcher = Dispatcher::builder(bot, handler.schema())
        .error_handler(Arc::new(UpdateErrorHandler))
        .enable_ctrlc_handler()
        .build();
    dispatcher
        .dispatch_with_listener(listener, Arc::new(UpdateErrorHandler))
        .await;

    if let Err(e) = broadcast_service.stop().await {
        tracing::warn!("Error stopping broadcast service: {}", e);
    }

    info!("Application stopped");
    Ok(())
}
