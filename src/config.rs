//! Configuration handling for luma-bot.
//!
//! Secrets come from the process environment (after loading `.env`). Everything
//! else is read from `~/.config/luma-bot/config.toml` or a custom path; a
//! missing file means defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::luma::{
    ApiSchema, ClientError, LumaClient, ModelParams, PollConfig, SchemaOverrides, SchemaPreset,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MODEL, JOB_ID_PLACEHOLDER, LUMA_API_BASE_URL, LUMA_API_KEY_ENV,
};

/// The environment variable name for the Discord bot token.
pub const DISCORD_TOKEN_ENV: &str = "DISCORD_TOKEN";

/// Default slash command name.
pub const DEFAULT_COMMAND_NAME: &str = "luma";

/// Configuration file structure for luma-bot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub luma: LumaConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumaConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub preset: SchemaPreset,
    /// Resolution sent when the user doesn't pick one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Duration sent when the user doesn't pick one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Field-level overrides on top of `preset`.
    #[serde(default)]
    pub schema: SchemaOverrides,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default = "default_command_name")]
    pub command_name: String,
    /// Register the command on this guild only instead of globally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<u64>,
}

fn default_base_url() -> String {
    LUMA_API_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_interval_secs() -> u64 {
    5
}

fn default_command_name() -> String {
    DEFAULT_COMMAND_NAME.to_string()
}

impl Default for LumaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            preset: SchemaPreset::default(),
            resolution: None,
            duration: None,
            request_timeout_secs: default_request_timeout_secs(),
            schema: SchemaOverrides::default(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_secs: default_interval_secs(),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            command_name: default_command_name(),
            guild_id: None,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed or is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        let config = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.clone(),
                source: e,
            })?;
            log::info!("Loaded configuration from {}", path.display());
            config
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            Config::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Check values that would make the bot misbehave at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.polling.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "polling.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.luma.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("luma.base_url must not be empty".to_string()));
        }
        if self.luma.model.trim().is_empty() {
            return Err(ConfigError::Invalid("luma.model must not be empty".to_string()));
        }
        if self.luma.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "luma.request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if !self.api_schema().status_path.contains(JOB_ID_PLACEHOLDER) {
            return Err(ConfigError::Invalid(format!(
                "luma.schema.status_path must contain '{}'",
                JOB_ID_PLACEHOLDER
            )));
        }
        let name = &self.discord.command_name;
        let valid_name = !name.is_empty()
            && name.len() <= 32
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !valid_name {
            return Err(ConfigError::Invalid(format!(
                "discord.command_name '{}' must be 1-32 lowercase letters, digits, '-' or '_'",
                name
            )));
        }
        Ok(())
    }

    /// The response schema: preset plus overrides.
    pub fn api_schema(&self) -> ApiSchema {
        self.luma
            .schema
            .clone()
            .apply(ApiSchema::preset(self.luma.preset))
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig::new(
            self.polling.max_attempts,
            Duration::from_secs(self.polling.interval_secs),
        )
    }

    /// Generation parameters used when the user doesn't supply any.
    pub fn default_params(&self) -> ModelParams {
        ModelParams::new(self.luma.resolution.clone(), self.luma.duration.clone())
    }

    /// Build the API client described by this configuration.
    pub fn build_client(&self, api_key: &str) -> Result<LumaClient, ClientError> {
        let client = LumaClient::with_timeouts(
            api_key.to_string(),
            self.luma.base_url.clone(),
            Duration::from_secs(self.luma.request_timeout_secs),
            crate::luma::DEFAULT_CONNECT_TIMEOUT,
        )?;
        Ok(client.schema(self.api_schema()))
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }
}

/// Secrets read from the environment.
#[derive(Clone)]
pub struct Secrets {
    pub luma_api_key: String,
    pub discord_token: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("luma_api_key", &"<redacted>")
            .field("discord_token", &self.discord_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Secrets {
    /// Read secrets from the environment.
    ///
    /// `LUMA_API_KEY` is always required. `DISCORD_TOKEN` is optional here;
    /// [`Secrets::require_discord_token`] checks it when the bot starts.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read secrets through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let luma_api_key = read(LUMA_API_KEY_ENV).ok_or(ConfigError::MissingSecret {
            name: LUMA_API_KEY_ENV,
        })?;

        Ok(Self {
            luma_api_key,
            discord_token: read(DISCORD_TOKEN_ENV),
        })
    }

    /// The Discord bot token, or `MissingSecret` when it is not set.
    pub fn require_discord_token(&self) -> Result<&str, ConfigError> {
        self.discord_token
            .as_deref()
            .ok_or(ConfigError::MissingSecret {
                name: DISCORD_TOKEN_ENV,
            })
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} environment variable is not set")]
    MissingSecret { name: &'static str },

    #[error("Failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("luma-bot").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/luma-bot/config.toml")
        })
}
