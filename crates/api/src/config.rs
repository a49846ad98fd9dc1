use std::time::Duration;

use chrono::TimeDelta;
use slotkeeper_core::types::DEFAULT_COOLDOWN_SECS;
use slotkeeper_events::delivery::telegram::DEFAULT_API_URL;

/// Error raised while loading configuration. Aborts startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Upper bound for `RESTORE_COOLDOWN_SECS` (one year).
pub const MAX_RESTORE_COOLDOWN_SECS: i64 = 365 * 24 * 3600;

/// HTTP server configuration (liveness endpoint).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `10000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to let due restore notifications drain on shutdown (default: `5`).
    pub shutdown_timeout_secs: u64,
}

/// Telegram bot and restore-timer configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Bot API token. Required.
    pub token: String,
    /// Bot API base URL (default: `https://api.telegram.org`).
    pub api_url: String,
    /// Long-poll wait for `getUpdates`, in seconds (default: `30`).
    pub poll_timeout_secs: u64,
    /// Cooldown for timed-building entries, in seconds (default: `7200`).
    /// Always within `1..=MAX_RESTORE_COOLDOWN_SECS` once loaded.
    pub restore_cooldown_secs: i64,
}

impl BotConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn restore_cooldown(&self) -> TimeDelta {
        TimeDelta::try_seconds(self.restore_cooldown_secs)
            .unwrap_or_else(|| TimeDelta::seconds(DEFAULT_COOLDOWN_SECS))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub bot: BotConfig,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `BOT_TOKEN`             | required                   |
    /// | `TELEGRAM_API_URL`      | `https://api.telegram.org` |
    /// | `POLL_TIMEOUT_SECS`     | `30`                       |
    /// | `RESTORE_COOLDOWN_SECS` | `7200`                     |
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `10000`                    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `5`                        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup("BOT_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::Missing("BOT_TOKEN"))?;

        let bot = BotConfig {
            token,
            api_url: lookup("TELEGRAM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
            poll_timeout_secs: parse_or(&lookup, "POLL_TIMEOUT_SECS", 30)?,
            restore_cooldown_secs: parse_cooldown(&lookup)?,
        };

        let server = ServerConfig {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "PORT", 10000)?,
            request_timeout_secs: parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?,
            shutdown_timeout_secs: parse_or(&lookup, "SHUTDOWN_TIMEOUT_SECS", 5)?,
        };

        Ok(Self { server, bot })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

/// `RESTORE_COOLDOWN_SECS` must be positive and at most a year.
fn parse_cooldown(lookup: &impl Fn(&str) -> Option<String>) -> Result<i64, ConfigError> {
    const VAR: &str = "RESTORE_COOLDOWN_SECS";
    let secs: i64 = parse_or(lookup, VAR, DEFAULT_COOLDOWN_SECS)?;

    if (1..=MAX_RESTORE_COOLDOWN_SECS).contains(&secs) {
        Ok(secs)
    } else {
        Err(ConfigError::Invalid {
            var: VAR,
            value: secs.to_string(),
        })
    }
}
