//! # Desk Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     UNIMART_DESK_LOCATION="North Hostel Post Office"                   │
//! │     UNIMART_DESK_OPERATOR=amaka                                        │
//! │     UNIMART_DB_PATH=/var/lib/unimart/desk.db                           │
//! │     UNIMART_RETRY_MAX_ATTEMPTS=3                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/unimart-desk/desk.toml (Linux)                           │
//! │     ~/Library/Application Support/ng.unimart.desk/desk.toml (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [desk]
//! location = "Main Gate Post Office"
//! operator = "desk-operator"
//!
//! [database]
//! path = "unimart.db"
//!
//! [retry]
//! max_attempts = 5
//! initial_backoff_ms = 200
//! max_backoff_ms = 5000
//! ```

use backoff::ExponentialBackoff;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{HandoffError, HandoffResult};

/// Longest accepted location or operator label.
pub const MAX_LABEL_LENGTH: usize = 80;

// =============================================================================
// Desk Settings
// =============================================================================

/// Where this desk is and who is running it. Copied into every audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskSettings {
    #[serde(default = "default_location")]
    pub location: String,

    #[serde(default = "default_operator")]
    pub operator: String,
}

fn default_location() -> String {
    "Main Gate Post Office".to_string()
}

fn default_operator() -> String {
    "desk-operator".to_string()
}

impl Default for DeskSettings {
    fn default() -> Self {
        DeskSettings {
            location: default_location(),
            operator: default_operator(),
        }
    }
}

// =============================================================================
// Database Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file path. Created on first run.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("unimart.db")
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
        }
    }
}

// =============================================================================
// Retry Settings
// =============================================================================

/// Retry policy for the order status update after a successful audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    5
}
fn default_initial_backoff() -> u64 {
    200
}
fn default_max_backoff() -> u64 {
    5000
}

impl Default for RetrySettings {
    fn default() -> Self {
        RetrySettings {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

impl RetrySettings {
    /// Exponential schedule doubling from `initial_backoff_ms` up to
    /// `max_backoff_ms`. The attempt count, not elapsed time, ends retries.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_millis(self.initial_backoff_ms),
            current_interval: Duration::from_millis(self.initial_backoff_ms),
            max_interval: Duration::from_millis(self.max_backoff_ms),
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

// =============================================================================
// Main Desk Configuration
// =============================================================================

/// Complete desk configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskConfig {
    #[serde(default)]
    pub desk: DeskSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub retry: RetrySettings,
}

impl DeskConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (desk.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> HandoffResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading desk config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> HandoffResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| HandoffError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| HandoffError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| HandoffError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Desk config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> HandoffResult<()> {
        for (field, value) in [
            ("desk.location", &self.desk.location),
            ("desk.operator", &self.desk.operator),
        ] {
            unimart_core::validation::validate_label(field, value, MAX_LABEL_LENGTH)
                .map_err(|e| HandoffError::InvalidConfig(e.to_string()))?;
        }

        if self.database.path.as_os_str().is_empty() {
            return Err(HandoffError::InvalidConfig(
                "database.path must not be empty".into(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(HandoffError::InvalidConfig(
                "retry.max_attempts must be greater than 0".into(),
            ));
        }

        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(HandoffError::InvalidConfig(format!(
                "retry.initial_backoff_ms ({}) exceeds retry.max_backoff_ms ({})",
                self.retry.initial_backoff_ms, self.retry.max_backoff_ms
            )));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (the environment in production).
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(location) = lookup("UNIMART_DESK_LOCATION") {
            debug!(location = %location, "Overriding desk location from environment");
            self.desk.location = location;
        }

        if let Some(operator) = lookup("UNIMART_DESK_OPERATOR") {
            debug!(operator = %operator, "Overriding desk operator from environment");
            self.desk.operator = operator;
        }

        if let Some(path) = lookup("UNIMART_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }

        if let Some(attempts) = lookup("UNIMART_RETRY_MAX_ATTEMPTS") {
            match attempts.parse::<u32>() {
                Ok(n) => self.retry.max_attempts = n,
                Err(_) => warn!(value = %attempts, "Ignoring non-numeric UNIMART_RETRY_MAX_ATTEMPTS"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("ng", "unimart", "desk")
            .map(|dirs| dirs.config_dir().join("desk.toml"))
    }
}
