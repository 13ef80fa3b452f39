//! # Running List Bot Main Entry Point
//!
//! Initializes logging, loads configuration, sets up the database,
//! starts the digest scheduler and the health server, and runs the
//! Telegram bot.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use running_list_bot::bot::handlers::{BotHandler, State};
use running_list_bot::config::Config;
use running_list_bot::database::DatabaseManager;
use running_list_bot::services::{DigestService, HealthService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "running_list_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Running List Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}, Digest hour: {:02}:00 UTC",
        config.database_url, config.http_port, config.digest_hour
    );

    if let Some(parent) = config
        .database_url
        .strip_prefix("sqlite:")
        .map(|path| path.trim_start_matches("//"))
        .and_then(|path| Path::new(path).parent())
    {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating database directory {}", parent.display());
            std::fs::create_dir_all(parent)?;
        }
    }

    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    info!("Running database migrations...");
    db_manager.run_migrations().await?;
    let db = Arc::new(db_manager);
    info!("Database initialized successfully");

    let bot = Bot::new(&config.telegram_bot_token);
    let handler = BotHandler::new(db.clone());

    let mut digest_service = DigestService::new(bot.clone(), handler.tasks.clone(), config.digest_hour)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create digest service: {}", e))?;
    if let Err(e) = digest_service.start().await {
        tracing::error!("Failed to start digest service: {}", e);
    }

    let health_service = HealthService::new(db.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;
    info!("Health check server starting on port {}", config.http_port);

    let bot_task = tokio::spawn(async move {
        let storage = InMemStorage::<State>::new();
        Dispatcher::builder(bot, handler.schema())
            .dependencies(handler.dependencies(storage))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    tokio::select! {
        result = bot_task => {
            if let Err(e) = result {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result = health_task => {
            if let Err(e) = result {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    if let Err(e) = digest_service.stop().await {
        tracing::warn!("Error stopping digest service: {}", e);
    }

    info!("Application stopped");
    Ok(())
}
