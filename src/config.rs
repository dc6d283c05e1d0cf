//! Bot configuration.
//!
//! Read either from a configuration file (YAML, or TOML/JSON by extension)
//! or from `EVENTSBOT_*` environment variables. Both end up in the same
//! validated [`Config`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Environment, File};
use eventsbot_core::announcement::Announcement;
use eventsbot_core::constants::{
    DEFAULT_EVENT_LOCATION, DEFAULT_HISTORY_PATH, DEFAULT_INTERVAL, ENV_PREFIX,
};
use eventsbot_core::duration::{parse_duration, to_duration};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Missing(String),

    #[error("Unable to load configuration file {path}: {reason}")]
    File { path: PathBuf, reason: String },

    #[error("Unable to read environment: {0}")]
    Environment(String),

    #[error("Invalid run interval '{0}', expected something like '24h' or '1d12h'")]
    InvalidInterval(String),

    #[error("Invalid value '{value}' for '{name}', expected yes/no, true/false, on/off or 1/0")]
    InvalidFlag { name: String, value: String },
}

/// Validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub calendar_url: String,
    pub default_location: String,
    pub run_interval: String,
    /// Expanded, `~` resolved
    pub history_path: PathBuf,
    pub discord: DiscordConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscordConfig {
    pub token: String,
    pub bot_url: String,
    pub server_id: String,
    /// Announce created events when set
    pub message: Option<Announcement>,
}

impl Config {
    /// Load the configuration file at `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file_error = |e: config::ConfigError| ConfigError::File {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let raw: FileConfig = config::Config::builder()
            .add_source(File::from(path))
            .build()
            .map_err(file_error)?
            .try_deserialize()
            .map_err(file_error)?;

        raw.validate()
    }

    /// Load the configuration from `EVENTSBOT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX))
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let raw: EnvConfig = config::Config::builder()
            .add_source(environment)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigError::Environment(e.to_string()))?;

        raw.validate()
    }

    pub fn interval(&self) -> Duration {
        to_duration(&self.run_interval)
    }
}

/// Where a value was expected, for error messages.
#[derive(Debug, Clone, Copy)]
enum Origin {
    File,
    Env,
}

impl Origin {
    /// `section` is `None` for top-level keys.
    fn missing(self, section: Option<&str>, key: &str) -> ConfigError {
        let message = match (self, section) {
            (Origin::File, Some(section)) => {
                format!("Missing '{}.{}' in configuration file.", section, key)
            }
            (Origin::File, None) => format!("Missing '{}' in configuration file.", key),
            (Origin::Env, _) => format!(
                "Missing '{}_{}' environment variable.",
                ENV_PREFIX,
                key.to_uppercase()
            ),
        };
        ConfigError::Missing(message)
    }

    fn require(
        self,
        value: Option<String>,
        section: Option<&str>,
        key: &str,
    ) -> Result<String, ConfigError> {
        value
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| self.missing(section, key))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    calendar_url: Option<String>,
    default_location: Option<String>,
    run_interval: Option<String>,
    history_path: Option<String>,
    discord: Option<FileDiscordConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct FileDiscordConfig {
    token: Option<String>,
    bot_url: Option<String>,
    server_id: Option<String>,
    message: Option<Announcement>,
}

impl FileConfig {
    fn validate(self) -> Result<Config, ConfigError> {
        let origin = Origin::File;
        let calendar_url = origin.require(self.calendar_url, None, "calendar_url")?;
        let discord = self.discord.ok_or_else(|| origin.missing(None, "discord"))?;

        let discord = DiscordConfig {
            token: origin.require(discord.token, Some("discord"), "token")?,
            bot_url: origin.require(discord.bot_url, Some("discord"), "bot_url")?,
            server_id: origin.require(discord.server_id, Some("discord"), "server_id")?,
            message: discord.message,
        };

        finish(
            calendar_url,
            self.default_location,
            self.run_interval,
            self.history_path,
            discord,
        )
    }
}

/// Environment variables, keys without the prefix.
#[derive(Debug, Default, Deserialize)]
struct EnvConfig {
    calendar_url: Option<String>,
    default_location: Option<String>,
    run_interval: Option<String>,
    history_path: Option<String>,
    token: Option<String>,
    bot_url: Option<String>,
    server_id: Option<String>,
    content: Option<String>,
    channel: Option<String>,
    link: Option<String>,
    mention_everyone: Option<String>,
}

impl EnvConfig {
    fn validate(self) -> Result<Config, ConfigError> {
        let origin = Origin::Env;
        let calendar_url = origin.require(self.calendar_url, None, "calendar_url")?;

        let has_message = self.content.is_some()
            || self.channel.is_some()
            || self.link.is_some()
            || self.mention_everyone.is_some();

        let message = if has_message {
            let defaults = Announcement::default();
            Some(Announcement {
                channel: self.channel.unwrap_or(defaults.channel),
                content: self.content.unwrap_or(defaults.content),
                mention_everyone: env_flag("mention_everyone", self.mention_everyone)?
                    .unwrap_or(defaults.mention_everyone),
                link: env_flag("link", self.link)?.unwrap_or(defaults.link),
            })
        } else {
            None
        };

        let discord = DiscordConfig {
            token: origin.require(self.token, Some("discord"), "token")?,
            bot_url: origin.require(self.bot_url, Some("discord"), "bot_url")?,
            server_id: origin.require(self.server_id, Some("discord"), "server_id")?,
            message,
        };

        finish(
            calendar_url,
            self.default_location,
            self.run_interval,
            self.history_path,
            discord,
        )
    }
}

/// Fill defaults and check the values common to both origins.
fn finish(
    calendar_url: String,
    default_location: Option<String>,
    run_interval: Option<String>,
    history_path: Option<String>,
    discord: DiscordConfig,
) -> Result<Config, ConfigError> {
    let run_interval = run_interval.unwrap_or_else(|| DEFAULT_INTERVAL.to_string());
    if parse_duration(&run_interval) == 0 {
        return Err(ConfigError::InvalidInterval(run_interval));
    }

    let history_path = history_path.unwrap_or_else(|| DEFAULT_HISTORY_PATH.to_string());

    Ok(Config {
        calendar_url,
        default_location: default_location
            .unwrap_or_else(|| DEFAULT_EVENT_LOCATION.to_string()),
        run_interval,
        history_path: PathBuf::from(shellexpand::tilde(&history_path).into_owned()),
        discord,
    })
}

/// Parse a yes/no style environment flag.
fn env_flag(key: &str, value: Option<String>) -> Result<Option<bool>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "on" | "1" => Ok(Some(true)),
        "no" | "false" | "off" | "0" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidFlag {
            name: format!("{}_{}", ENV_PREFIX, key.to_uppercase()),
            value,
        }),
    }
}
