//! Firmware reply parser
//!
//! The firmware answers with a small, case-sensitive vocabulary:
//!
//! | Reply      | Meaning                                      |
//! |------------|----------------------------------------------|
//! | `wait`     | idle / ready / implicit ack of prior command |
//! | `ok <n>`   | command processed, `0` means success         |
//! | `Resend:1` | retransmit the last command                  |
//!
//! Everything else is noise.

use std::fmt;

/// Idle token, also the handshake readiness signal
pub const WAIT_TOKEN: &str = "wait";

/// Resend request token
pub const RESEND_TOKEN: &str = "Resend:1";

/// Prefix of an acknowledgment carrying a status code
pub const OK_PREFIX: &str = "ok ";

/// Status code the firmware uses for an accepted command
pub const OK_SUCCESS_CODE: &str = "0";

/// Classified reply line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Firmware idle; implicit acknowledgment
    Wait,
    /// Command processed with the given status code
    OkWithCode(String),
    /// Retransmit the last command
    ResendRequest,
    /// Anything else
    Unrecognized(String),
}

impl Reply {
    /// Classify a terminator-stripped reply line
    ///
    /// Total over all inputs: a line is only treated as an acknowledgment when
    /// it is long enough to hold the whole `ok ` prefix, so short replies such
    /// as `o` or `ok` come back as [`Reply::Unrecognized`].
    pub fn classify(line: &str) -> Self {
        if line == RESEND_TOKEN {
            return Self::ResendRequest;
        }

        if line.len() >= OK_PREFIX.len() {
            if let Some(code) = line.strip_prefix(OK_PREFIX) {
                return Self::OkWithCode(code.to_string());
            }
        }

        if line == WAIT_TOKEN {
            return Self::Wait;
        }

        Self::Unrecognized(line.to_string())
    }

    /// Whether this reply ends the reply loop for a command
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Wait | Self::OkWithCode(_))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wait => write!(f, "{}", WAIT_TOKEN),
            Self::OkWithCode(code) => write!(f, "{}{}", OK_PREFIX, code),
            Self::ResendRequest => write!(f, "{}", RESEND_TOKEN),
            Self::Unrecognized(text) => write!(f, "unrecognized:{}", text),
        }
    }
}
