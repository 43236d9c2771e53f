//! GCodeSend Settings Crate
//!
//! Handles the sender configuration: file format, defaults, validation, and
//! conversion into link and streaming parameters.

pub mod config;
pub mod error;

pub use config::{Config, ConnectionSettings, StreamingSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
