//! Frame bisect bot
//!
//! A Telegram bot that finds the frame of a launch video where the rocket
//! takes off, by asking the user yes/no questions and bisecting the frames.

mod config;
mod frames;
mod runtime;
mod state_machine;
mod telegram;

use config::{BotConfig, RunMode};
use frames::FrameXSource;
use runtime::{
    ConversationController, ConversationDispatcher, MemorySessionStore, ProductionController,
};
use std::net::SocketAddr;
use std::sync::Arc;
use telegram::TelegramGateway;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "frame_bisect=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = BotConfig::from_env()?;

    let frames = FrameXSource::new(&config.framex)?;
    tracing::info!(
        api = %config.framex.api_domain,
        video = %config.framex.video_name,
        "Frame source configured"
    );

    let gateway = Arc::new(TelegramGateway::new(&config.telegram)?);
    let controller: ProductionController =
        ConversationController::new(gateway.clone(), frames, MemorySessionStore::new());
    let dispatcher = Arc::new(ConversationDispatcher::new(Arc::new(controller)));

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                return;
            }
            tracing::info!("Shutdown requested");
            shutdown.cancel();
        }
    });

    match config.mode {
        RunMode::Polling { timeout } => {
            telegram::run_polling(&gateway, &dispatcher, timeout, shutdown).await;
        }
        RunMode::Webhook { port, public_url } => {
            let hook_url = format!(
                "{}/{}",
                public_url.trim_end_matches('/'),
                config.telegram.token
            );
            gateway.set_webhook(&hook_url).await?;
            tracing::info!(url = %public_url, "Webhook registered");

            let router = telegram::create_router(dispatcher, &config.telegram.token);
            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            let listener = tokio::net::TcpListener::bind(addr).await?;
            telegram::serve(listener, router, shutdown).await?;
        }
    }

    tracing::info!("Bot stopped");
    Ok(())
}
