//! Process configuration, read from the environment at start-up

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_FRAMEX_API: &str = "https://framex-dev.wadrid.net";
pub const DEFAULT_VIDEO_NAME: &str = "Falcon Heavy Test Flight (Hosted Webcast)-wbSwFU6tY1c";
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

const DEFAULT_PORT: u16 = 8443;
const DEFAULT_FRAMEX_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("unknown MODE {0:?} (expected \"dev\" or \"prod\")")]
    UnknownMode(String),
}

/// How updates reach the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Long-poll `getUpdates` (MODE=dev)
    Polling { timeout: Duration },
    /// Receive updates on `POST /{token}` (MODE=prod)
    Webhook { port: u16, public_url: String },
}

/// Where frames come from
#[derive(Debug, Clone)]
pub struct FrameXConfig {
    pub api_domain: String,
    pub video_name: String,
    pub timeout: Duration,
}

/// Telegram Bot API access
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub api_base: String,
}

impl TelegramConfig {
    /// Per-bot method endpoint prefix, `{api}/bot{token}`
    pub fn bot_url(&self) -> String {
        format!("{}/bot{}", self.api_base.trim_end_matches('/'), self.token)
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub mode: RunMode,
    pub framex: FrameXConfig,
    pub telegram: TelegramConfig,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = non_empty(&lookup, "TOKEN").ok_or(ConfigError::Missing("TOKEN"))?;

        let mode = match non_empty(&lookup, "MODE").as_deref() {
            Some("dev") => RunMode::Polling {
                timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "POLL_TIMEOUT_SECS",
                    DEFAULT_POLL_TIMEOUT_SECS,
                )?),
            },
            Some("prod") => RunMode::Webhook {
                port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
                public_url: non_empty(&lookup, "WEBHOOK_URL")
                    .ok_or(ConfigError::Missing("WEBHOOK_URL"))?,
            },
            Some(other) => return Err(ConfigError::UnknownMode(other.to_string())),
            None => return Err(ConfigError::Missing("MODE")),
        };

        let framex = FrameXConfig {
            api_domain: non_empty(&lookup, "FRAMEX_API")
                .unwrap_or_else(|| DEFAULT_FRAMEX_API.to_string()),
            video_name: non_empty(&lookup, "VIDEO_NAME")
                .unwrap_or_else(|| DEFAULT_VIDEO_NAME.to_string()),
            timeout: Duration::from_secs(parse_or(
                &lookup,
                "FRAMEX_TIMEOUT_SECS",
                DEFAULT_FRAMEX_TIMEOUT_SECS,
            )?),
        };

        let telegram = TelegramConfig {
            token,
            api_base: non_empty(&lookup, "TELEGRAM_API_BASE")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API.to_string()),
        };

        Ok(Self {
            mode,
            framex,
            telegram,
        })
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match non_empty(lookup, key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
