//! Error handling for GCodeSend
//!
//! Provides error types for every layer of the sender:
//! - Connection errors (opening the port, read timeouts, I/O)
//! - Stream errors (resend exhaustion, firmware rejections, aborted runs)
//! - G-Code errors (parameter parsing in the offline tools)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Connection error type
///
/// Represents errors related to the serial link to the firmware.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// No data arrived within the read timeout
    #[error("Link timed out: no data within {timeout_ms}ms")]
    LinkTimeout {
        /// The read timeout in milliseconds.
        timeout_ms: u64,
    },

    /// Failed to open port
    #[error("Failed to open port {port}: {reason}")]
    FailedToOpen {
        /// The name of the port that failed to open.
        port: String,
        /// The reason the port failed to open.
        reason: String,
    },

    /// Serial port error
    #[error("Serial port error: {reason}")]
    SerialError {
        /// The reason for the serial port error.
        reason: String,
    },

    /// Invalid connection parameters
    #[error("Invalid connection parameters: {reason}")]
    InvalidParameters {
        /// The reason the parameters are invalid.
        reason: String,
    },
}

/// Stream error type
///
/// Represents failures delivering a command to the firmware.
#[derive(Error, Debug)]
pub enum StreamError {
    /// Every attempt ended in a resend request or noise
    #[error("Command '{command}' not acknowledged after {attempts} attempts")]
    RetryExhausted {
        /// The command text that was being sent.
        command: String,
        /// The number of transmissions made.
        attempts: u32,
    },

    /// The firmware answered `ok <code>` with a non-zero code
    #[error("Command '{command}' rejected by firmware with code {code}")]
    FirmwareRejected {
        /// The command text that was rejected.
        command: String,
        /// The status code reported by the firmware.
        code: String,
    },

    /// The stream stopped at a failed line
    #[error("Stream aborted at line {line_number} ('{command}') after {delivered} delivered commands: {source}")]
    Aborted {
        /// One-based input line number of the failed command.
        line_number: usize,
        /// The normalized command that failed.
        command: String,
        /// Commands delivered before the failure.
        delivered: usize,
        /// The failure that stopped the stream.
        #[source]
        source: Box<Error>,
    },
}

/// G-Code error type
///
/// Represents errors related to G-Code parsing in the offline tools.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GcodeError {
    /// Invalid parameter value
    #[error("Invalid parameter '{param}' at line {line_number}: {reason}")]
    InvalidParameter {
        /// The line number where the invalid parameter was found.
        line_number: usize,
        /// The parameter name.
        param: String,
        /// The reason the parameter is invalid.
        reason: String,
    },
}

/// Main error type for GCodeSend
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Stream error
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// G-Code error
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a link timeout, looking through aborted streams
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Connection(ConnectionError::LinkTimeout { .. }) => true,
            Error::Stream(StreamError::Aborted { source, .. }) => source.is_timeout(),
            _ => false,
        }
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a stream error
    pub fn is_stream_error(&self) -> bool {
        matches!(self, Error::Stream(_))
    }

    /// Check if this is a G-Code error
    pub fn is_gcode_error(&self) -> bool {
        matches!(self, Error::Gcode(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_display() {
        let err = ConnectionError::LinkTimeout { timeout_ms: 5000 };
        assert_eq!(err.to_string(), "Link timed out: no data within 5000ms");

        let err = ConnectionError::FailedToOpen {
            port: "/dev/ttyUSB0".to_string(),
            reason: "busy".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to open port /dev/ttyUSB0: busy");
    }

    #[test]
    fn test_stream_error_display() {
        let err = StreamError::RetryExhausted {
            command: "G1 X5".to_string(),
            attempts: 5,
        };
        assert_eq!(
            err.to_string(),
            "Command 'G1 X5' not acknowledged after 5 attempts"
        );

        let err = StreamError::FirmwareRejected {
            command: "G1 X5".to_string(),
            code: "5".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Command 'G1 X5' rejected by firmware with code 5"
        );
    }

    #[test]
    fn test_timeout_detection() {
        let timeout: Error = ConnectionError::LinkTimeout { timeout_ms: 10 }.into();
        assert!(timeout.is_timeout());
        assert!(timeout.is_connection_error());

        let aborted: Error = StreamError::Aborted {
            line_number: 3,
            command: "G28".to_string(),
            delivered: 2,
            source: Box::new(timeout),
        }
        .into();
        assert!(aborted.is_timeout());
        assert!(aborted.is_stream_error());

        let rejected: Error = StreamError::FirmwareRejected {
            command: "M104".to_string(),
            code: "2".to_string(),
        }
        .into();
        assert!(!rejected.is_timeout());
    }

    #[test]
    fn test_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
