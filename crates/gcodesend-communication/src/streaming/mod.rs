//! Streaming protocol
//!
//! Synchronizes with the firmware once per link ([`handshake`]), then
//! delivers commands one at a time with bounded retransmission
//! ([`sender`]), driven line by line from the input program ([`driver`]).

pub mod driver;
pub mod handshake;
pub mod sender;

use gcodesend_core::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_WAKE_LINES};

pub use driver::{StreamDriver, StreamSummary};
pub use handshake::wait_for_ready;
pub use sender::{send_command, Acknowledgement, Delivery, SendAttempt};

/// Tunables for the streaming protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Transmissions of one command before giving up
    pub max_attempts: u32,
    /// Blank lines written before waiting for readiness
    pub wake_lines: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            wake_lines: DEFAULT_WAKE_LINES,
        }
    }
}
