//! Configuration loading and management.
//!
//! Settings come from an optional TOML file and are then overridden by
//! environment variables (`TOKEN`, `BOT_USERNAME`, `CHANNEL`,
//! `DATABASE_PATH`, `LOG_LEVEL`).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Log levels accepted for `log_level` / `LOG_LEVEL`.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no bot token configured (set TOKEN or bot.token)")]
    MissingToken,
    #[error("no channel configured (set CHANNEL or bot.channel)")]
    MissingChannel,
    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),
    #[error("dispatch.queue_size must be at least 1")]
    InvalidQueueSize,
    #[error("invalid alias: {0}")]
    InvalidAlias(String),
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default tracing level when `RUST_LOG` is unset.
    pub log_level: String,
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub followage: FollowAgeConfig,
    pub dispatch: DispatchConfig,
    /// Extra names for custom commands, `alias = "command"`.
    pub aliases: HashMap<String, String>,
}

/// Chat identity and channel.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Login name of the bot account.
    pub username: String,
    /// The single channel the bot joins, without `#`.
    pub channel: String,
    /// OAuth token. Usually supplied through `TOKEN` instead of the file.
    pub token: String,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to SQLite database file, or `:memory:`.
    pub path: String,
}

/// Follow-age service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FollowAgeConfig {
    pub base_url: String,
    pub precision: u8,
    /// Request timeout in seconds. Unset waits indefinitely.
    pub timeout_secs: Option<u64>,
}

/// What the dispatcher does after a store or network failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Whisper the error, then stop the bot.
    Halt,
    /// Whisper the error and keep handling events.
    Continue,
}

/// Event loop tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub on_failure: FailurePolicy,
    /// Per-verb reply cooldown in seconds. `0` disables it.
    pub cooldown_secs: u64,
    /// Capacity of the inbound event channel.
    pub queue_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            bot: BotConfig::default(),
            database: DatabaseConfig::default(),
            followage: FollowAgeConfig::default(),
            dispatch: DispatchConfig::default(),
            aliases: HashMap::new(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            username: "curi_bot_".to_string(),
            channel: "curi".to_string(),
            token: String::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "talerbot.db".to_string(),
        }
    }
}

impl Default for FollowAgeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.crunchprank.net/twitch/followage".to_string(),
            precision: 4,
            timeout_secs: None,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            on_failure: FailurePolicy::Halt,
            cooldown_secs: 0,
            queue_size: 256,
        }
    }
}

impl FollowAgeConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl DispatchConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

impl Config {
    /// Load configuration from an optional TOML file plus the process environment.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::parse(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document. Missing keys fall back to defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Override settings from environment-style lookups.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TOKEN") {
            self.bot.token = token;
        }
        if let Some(username) = lookup("BOT_USERNAME") {
            self.bot.username = username;
        }
        if let Some(channel) = lookup("CHANNEL") {
            self.bot.channel = channel;
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            self.database.path = path;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level;
        }
    }

    /// Check the settings the bot cannot start without.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.bot.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }

        self.bot.channel = self.bot.channel.trim_start_matches('#').to_lowercase();
        if self.bot.channel.is_empty() {
            return Err(ConfigError::MissingChannel);
        }

        self.log_level = self.log_level.to_lowercase();
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }

        if self.dispatch.queue_size == 0 {
            return Err(ConfigError::InvalidQueueSize);
        }

        let mut aliases = HashMap::with_capacity(self.aliases.len());
        for (alias, target) in self.aliases.drain() {
            let alias = alias.trim_start_matches('!').to_lowercase();
            let target = target.trim_start_matches('!').to_lowercase();
            if alias.is_empty() || target.is_empty() || alias == target {
                return Err(ConfigError::InvalidAlias(alias));
            }
            aliases.insert(alias, target);
        }
        self.aliases = aliases;

        Ok(())
    }
}
