//! Dispensa configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispensaConfig {
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl Default for DispensaConfig {
    fn default() -> Self {
        Self {
            reminders: ReminderConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}

impl DispensaConfig {
    /// Load config from the default path (~/.dispensa/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::DispensaError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| crate::error::DispensaError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::DispensaError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".dispensa")
            .join("config.toml")
    }

    /// Get the Dispensa home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".dispensa")
    }
}

/// Reminder scheduling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Local hour of day at which reminders fire.
    #[serde(default = "default_notification_hour")]
    pub notification_hour: u8,
    /// Items registered concurrently per batch chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Whether the facility replaces an outstanding reminder when a new one
    /// reuses its identifier. When false, the engine cancels explicitly
    /// before rescheduling.
    #[serde(default = "bool_true")]
    pub replace_by_identifier: bool,
}

fn default_notification_hour() -> u8 { 9 }
fn default_chunk_size() -> usize { 5 }
fn bool_true() -> bool { true }

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            notification_hour: default_notification_hour(),
            chunk_size: default_chunk_size(),
            replace_by_identifier: true,
        }
    }
}

/// Dispatch facility configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Base URL of the webhook dispatch facility.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String { "http://127.0.0.1:8317".into() }
fn default_timeout_secs() -> u64 { 10 }

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
