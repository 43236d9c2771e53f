//! Configuration for GCodeSend
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML files; the default location is the platform config directory.
//!
//! Configuration is organized into logical sections:
//! - Connection settings (port, baud rate, line settings, read timeout)
//! - Streaming settings (resend attempts, wake-up lines)

use crate::error::{ConfigError, ConfigResult, SettingsResult};
use gcodesend_communication::{ConnectionParams, SerialParity, StreamConfig};
use gcodesend_core::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_MAX_ATTEMPTS, DEFAULT_READ_TIMEOUT_MS, DEFAULT_WAKE_LINES,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Serial port name; empty means it must come from the command line
    pub port: String,
    /// Baud rate for serial connections
    pub baud_rate: u32,
    /// Read timeout in milliseconds
    pub timeout_ms: u64,
    /// Data bits per character
    pub data_bits: u8,
    /// Stop bits
    pub stop_bits: u8,
    /// Parity
    pub parity: SerialParity,
    /// Hardware flow control
    pub flow_control: bool,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            data_bits: 8,
            stop_bits: 1,
            parity: SerialParity::None,
            flow_control: false,
        }
    }
}

/// Streaming protocol settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingSettings {
    /// Transmissions of one command before giving up
    pub max_attempts: u32,
    /// Blank lines written before the handshake
    pub wake_lines: u32,
}

impl Default for StreamingSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            wake_lines: DEFAULT_WAKE_LINES,
        }
    }
}

/// Complete sender configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Connection settings
    pub connection: ConnectionSettings,
    /// Streaming settings
    pub streaming: StreamingSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location: `<config dir>/gcodesend/config.toml`
    pub fn default_path() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("gcodesend").join("config.toml"))
            .ok_or_else(|| ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let format = ConfigFormat::from_path(path)?;

        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let connection = &self.connection;

        if connection.timeout_ms == 0 {
            return Err(out_of_range("connection.timeout_ms", connection.timeout_ms));
        }

        if connection.baud_rate == 0 {
            return Err(out_of_range("connection.baud_rate", connection.baud_rate));
        }

        if !(5..=8).contains(&connection.data_bits) {
            return Err(out_of_range("connection.data_bits", connection.data_bits));
        }

        if !(1..=2).contains(&connection.stop_bits) {
            return Err(out_of_range("connection.stop_bits", connection.stop_bits));
        }

        if self.streaming.max_attempts == 0 {
            return Err(out_of_range(
                "streaming.max_attempts",
                self.streaming.max_attempts,
            ));
        }

        Ok(())
    }

    /// Serial parameters for opening the link
    pub fn connection_params(&self) -> ConnectionParams {
        let connection = &self.connection;
        ConnectionParams {
            port: connection.port.clone(),
            baud_rate: connection.baud_rate,
            data_bits: connection.data_bits,
            stop_bits: connection.stop_bits,
            parity: connection.parity,
            flow_control: connection.flow_control,
            timeout_ms: connection.timeout_ms,
        }
    }

    /// Streaming protocol tunables
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            max_attempts: self.streaming.max_attempts,
            wake_lines: self.streaming.wake_lines,
        }
    }
}

/// Supported config file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

fn out_of_range(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}
