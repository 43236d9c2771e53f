//! Protocol and transport defaults shared across crates.

/// Default serial baud rate
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default blocking read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 5_000;

/// Maximum transmissions of a single command before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Blank lines written to wake the firmware before the handshake
pub const DEFAULT_WAKE_LINES: u32 = 2;

/// Line terminator used in both directions
pub const LINE_TERMINATOR: &str = "\r\n";

/// Character that starts a comment in G-code input
pub const COMMENT_DELIMITER: char = ';';
