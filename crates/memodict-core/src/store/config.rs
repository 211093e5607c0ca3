//! TOML-based application configuration.
//!
//! Stores:
//! - Remote backend connection settings
//! - Review policy constants (ease bonuses/penalties, interval ladder)
//! - Sync behavior (auto push, backup blob location)
//!
//! Configuration is stored at `~/.config/memodict/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::srs::ReviewPolicy;

/// Remote document-store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the remote document store. Sync is disabled while unset.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// Per-request timeout; a slow remote fails closed.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Sync behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Push a full snapshot after every mutating CLI command.
    #[serde(default)]
    pub auto_push: bool,
    /// Default path for the backup blob.
    #[serde(default)]
    pub backup_file: Option<PathBuf>,
}

fn default_user_id() -> String {
    "defaultUser".to_string()
}
fn default_timeout_secs() -> u64 {
    5
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user_id: default_user_id(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_push: false,
            backup_file: None,
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/memodict/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub review: ReviewPolicy,
    #[serde(default)]
    pub sync: SyncConfig,
}

impl Config {
    fn path() -> Option<PathBuf> {
        data_dir().ok().map(|d| d.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Save the configuration.
    ///
    /// # Errors
    /// Returns an error if serialization or the filesystem write fails.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().ok_or_else(|| ConfigError::SaveFailed {
            path: PathBuf::from("config.toml"),
            message: "cannot resolve data directory".to_string(),
        })?;
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Read one value by dotted key, rendered as a plain string.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "remote.base_url" => Some(self.remote.base_url.clone().unwrap_or_default()),
            "remote.user_id" => Some(self.remote.user_id.clone()),
            "remote.timeout_secs" => Some(self.remote.timeout_secs.to_string()),
            "review.fail_ease_penalty" => Some(self.review.fail_ease_penalty.to_string()),
            "review.good_ease_bonus" => Some(self.review.good_ease_bonus.to_string()),
            "review.easy_ease_bonus" => Some(self.review.easy_ease_bonus.to_string()),
            "review.min_ease" => Some(self.review.min_ease.to_string()),
            "review.max_ease" => Some(self.review.max_ease.to_string()),
            "review.first_interval" => Some(self.review.first_interval.to_string()),
            "review.second_interval" => Some(self.review.second_interval.to_string()),
            "sync.auto_push" => Some(self.sync.auto_push.to_string()),
            "sync.backup_file" => Some(
                self.sync
                    .backup_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
            _ => None,
        }
    }

    /// Set one value by dotted key and persist the file.
    ///
    /// # Errors
    /// Returns an error for unknown keys, unparseable values, or a failed
    /// save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
        where
            T::Err: std::fmt::Display,
        {
            value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })
        }

        match key {
            "remote.base_url" => {
                self.remote.base_url = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "remote.user_id" => self.remote.user_id = value.to_string(),
            "remote.timeout_secs" => self.remote.timeout_secs = parse(key, value)?,
            "review.fail_ease_penalty" => self.review.fail_ease_penalty = parse(key, value)?,
            "review.good_ease_bonus" => self.review.good_ease_bonus = parse(key, value)?,
            "review.easy_ease_bonus" => self.review.easy_ease_bonus = parse(key, value)?,
            "review.min_ease" => self.review.min_ease = parse(key, value)?,
            "review.max_ease" => self.review.max_ease = parse(key, value)?,
            "review.first_interval" => self.review.first_interval = parse(key, value)?,
            "review.second_interval" => self.review.second_interval = parse(key, value)?,
            "sync.auto_push" => self.sync.auto_push = parse(key, value)?,
            "sync.backup_file" => {
                self.sync.backup_file = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        self.save()
    }
}
