use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_QUESTIONS_PATH: &str = "questions.json";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Where Telegram should deliver updates when long polling is not used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Webhook {
    pub url: Url,
    pub address: SocketAddr,
}

#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub questions_path: PathBuf,
    /// Port of the liveness endpoint.
    pub port: u16,
    pub log_level: String,
    pub webhook: Option<Webhook>,
    /// Settings that could not be used and were replaced by their defaults.
    pub ignored: Vec<ConfigError>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("questions_path", &self.questions_path)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("webhook", &self.webhook)
            .field("ignored", &self.ignored)
            .finish()
    }
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Only a missing token is an error. A bad port falls back to [`DEFAULT_PORT`]
    /// and a bad webhook falls back to long polling; both are kept in `ignored`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut ignored = Vec::new();

        let token = var("TELOXIDE_TOKEN")
            .or_else(|| var("TELEGRAM_BOT_TOKEN"))
            .ok_or(ConfigError::MissingToken)?;

        let questions_path = var("QUESTIONS_PATH")
            .unwrap_or_else(|| DEFAULT_QUESTIONS_PATH.to_owned())
            .into();

        let port = match var("PORT").map(parse_port).transpose() {
            Ok(port) => port.unwrap_or(DEFAULT_PORT),
            Err(e) => {
                ignored.push(e);
                DEFAULT_PORT
            }
        };

        let log_level = var("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned());

        let webhook = match parse_webhook(var("WEBHOOK_URL"), var("WEBHOOK_ADDR")) {
            Ok(webhook) => webhook,
            Err(e) => {
                ignored.push(e);
                None
            }
        };

        Ok(Self {
            token,
            questions_path,
            port,
            log_level,
            webhook,
            ignored,
        })
    }
}

fn parse_port(value: String) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|source| ConfigError::InvalidPort { value, source })
}

fn parse_webhook(
    url: Option<String>,
    address: Option<String>,
) -> Result<Option<Webhook>, ConfigError> {
    match (url, address) {
        (Some(url), Some(address)) => Ok(Some(Webhook {
            url: url
                .parse()
                .map_err(|source| ConfigError::InvalidWebhookUrl { value: url, source })?,
            address: address
                .parse()
                .map_err(|source| ConfigError::InvalidWebhookAddr {
                    value: address,
                    source,
                })?,
        })),
        (None, None) => Ok(None),
        _ => Err(ConfigError::IncompleteWebhook),
    }
}
