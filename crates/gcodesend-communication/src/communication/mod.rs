//! Transport layer
//!
//! Connection parameters, serial port access, and the CRLF line framing the
//! firmware speaks over the byte channel.

pub mod link;
pub mod serial;

use gcodesend_core::constants::{DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use link::{Channel, LineLink, Link};
pub use serial::{list_ports, open_serial, SerialLink, SerialPortInfo};

/// Serial parity setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerialParity {
    /// No parity bit
    #[default]
    None,
    /// Even parity
    Even,
    /// Odd parity
    Odd,
}

/// Parameters for opening a link to the firmware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Data bits per character (5-8)
    pub data_bits: u8,
    /// Stop bits (1 or 2)
    pub stop_bits: u8,
    /// Parity
    pub parity: SerialParity,
    /// Hardware (RTS/CTS) flow control
    pub flow_control: bool,
    /// Blocking read timeout in milliseconds
    pub timeout_ms: u64,
}

impl ConnectionParams {
    /// Create parameters for a port with the default line settings
    pub fn serial(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    /// Set the baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the read timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Read timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: 8,
            stop_bits: 1,
            parity: SerialParity::None,
            flow_control: false,
            timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}
