use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::collections::BTreeSet;
use std::env;
use std::fmt;

/// Prices, in Telegram Stars, a mini app may request an invoice for.
pub const ALLOWED_AMOUNTS: [i64; 3] = [25, 50, 100];

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_MINI_APP_BUTTON: &str = "Открыть мини-приложение";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub server_address: String,
    pub bot_token: String,
    pub mini_app_url: String,
    pub mini_app_button: String,
    pub telegram_api_url: String,
    pub poll_timeout_secs: u64,
    pub allowed_amounts: BTreeSet<i64>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let mini_app_url = ["MINI_APP_URL", "WEB_APP_URL", "APP_PUBLIC_URL"]
            .iter()
            .find_map(|name| get_env_opt(name))
            .ok_or_else(|| {
                Error::Config(
                    "Missing environment variable: WEB_APP_URL (or MINI_APP_URL / APP_PUBLIC_URL)"
                        .to_string(),
                )
            })?;

        let host = get_env_or("API_HOST", "0.0.0.0");
        let port: u16 = get_env_parse_or("API_PORT", 8080)?;

        Ok(Self {
            server_address: format!("{}:{}", host, port),
            bot_token: get_env("BOT_TOKEN")?,
            mini_app_url,
            mini_app_button: get_env_or("MINI_APP_BUTTON", DEFAULT_MINI_APP_BUTTON),
            telegram_api_url: get_env_or("TELEGRAM_API_URL", DEFAULT_TELEGRAM_API_URL),
            poll_timeout_secs: get_env_parse_or("POLL_TIMEOUT_SECS", 30)?,
            allowed_amounts: ALLOWED_AMOUNTS.into_iter().collect(),
            log_format: get_env_parse_or("LOG_FORMAT", LogFormat::Text)?,
        })
    }

    /// Configuration for tests and embedding, with every optional value at its default.
    pub fn new(bot_token: impl Into<String>, mini_app_url: impl Into<String>) -> Self {
        Self {
            server_address: "127.0.0.1:8080".to_string(),
            bot_token: bot_token.into(),
            mini_app_url: mini_app_url.into(),
            mini_app_button: DEFAULT_MINI_APP_BUTTON.to_string(),
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
            poll_timeout_secs: 30,
            allowed_amounts: ALLOWED_AMOUNTS.into_iter().collect(),
            log_format: LogFormat::Text,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_address", &self.server_address)
            .field("bot_token", &"****")
            .field("mini_app_url", &self.mini_app_url)
            .field("mini_app_button", &self.mini_app_button)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("allowed_amounts", &self.allowed_amounts)
            .field("log_format", &self.log_format)
            .finish()
    }
}

fn get_env(name: &str) -> Result<String> {
    get_env_opt(name).ok_or_else(|| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or(name: &str, default: &str) -> String {
    get_env_opt(name).unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}
