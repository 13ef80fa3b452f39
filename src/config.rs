use anyhow::{anyhow, Result};
use std::env;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/running_list.db";
pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_DIGEST_HOUR: u32 = 8;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_url: String,
    pub http_port: u16,
    /// Hour (UTC) of the daily digest.
    pub digest_hour: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = non_blank("TELEGRAM_BOT_TOKEN")
            .or_else(|| non_blank("BOT_TOKEN"))
            .ok_or_else(|| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        let http_port = match non_blank("HTTP_PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow!("Invalid HTTP_PORT '{}'", port))?,
            None => DEFAULT_HTTP_PORT,
        };

        let digest_hour = match non_blank("DIGEST_HOUR") {
            Some(hour) => hour
                .parse::<u32>()
                .ok()
                .filter(|h| *h < 24)
                .ok_or_else(|| anyhow!("Invalid DIGEST_HOUR '{}', expected 0-23", hour))?,
            None => DEFAULT_DIGEST_HOUR,
        };

        Ok(Config {
            telegram_bot_token: token,
            database_url: database_url_from_env(),
            http_port,
            digest_hour,
        })
    }
}

/// Database location alone, for tools that never talk to Telegram.
pub fn database_url_from_env() -> String {
    non_blank("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

fn non_blank(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
