//! Command delivery with bounded retransmission
//!
//! Each command is written, then replies are read until one of them decides
//! the outcome. A resend request starts the next attempt; noise is skipped
//! without costing an attempt.

use super::StreamConfig;
use crate::communication::Link;
use crate::protocol::{Reply, OK_SUCCESS_CODE};
use gcodesend_core::{Error, Result, StreamError};

/// How the firmware acknowledged a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgement {
    /// `ok 0`
    Ok,
    /// `wait`, the queue drained after accepting the command
    Idle,
}

/// Successful delivery of one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// The terminal reply
    pub ack: Acknowledgement,
    /// Transmissions used, including the successful one
    pub attempts: u32,
}

/// State of one command while it is being delivered
#[derive(Debug, Clone)]
pub struct SendAttempt<'a> {
    /// The command text
    pub command: &'a str,
    /// Transmissions made so far
    pub attempts: u32,
    /// Maximum transmissions allowed
    pub max_attempts: u32,
    /// Last classified reply
    pub last_reply: Option<Reply>,
}

impl<'a> SendAttempt<'a> {
    /// Start delivering a command
    pub fn new(command: &'a str, max_attempts: u32) -> Self {
        Self {
            command,
            attempts: 0,
            max_attempts,
            last_reply: None,
        }
    }

    /// Check if another transmission is allowed
    pub fn can_retry(&self) -> bool {
        self.attempts < self.max_attempts
    }

    /// Record a transmission
    pub fn mark_sent(&mut self) {
        self.attempts += 1;
    }

    /// Record a reply
    pub fn record(&mut self, reply: Reply) {
        self.last_reply = Some(reply);
    }
}

/// Deliver one normalized command and wait for the firmware's verdict
///
/// Returns the acknowledgment on `ok 0` or `wait`. Fails with
/// [`StreamError::FirmwareRejected`] on `ok <n>` with a non-zero code,
/// [`StreamError::RetryExhausted`] when every attempt ended in a resend
/// request, and propagates link timeouts unchanged.
pub fn send_command<L: Link + ?Sized>(
    link: &mut L,
    command: &str,
    config: &StreamConfig,
) -> Result<Delivery> {
    if command.is_empty() {
        return Err(Error::other("Refusing to send an empty command"));
    }

    let mut attempt = SendAttempt::new(command, config.max_attempts);

    while attempt.can_retry() {
        link.write_line(command)?;
        attempt.mark_sent();

        loop {
            let reply = Reply::classify(&link.read_line()?);
            if reply.is_terminal() {
                return acknowledge(command, attempt.attempts, reply);
            }

            match &reply {
                Reply::ResendRequest => {
                    tracing::warn!(
                        "Resend requested for '{}' ({}/{})",
                        command,
                        attempt.attempts,
                        attempt.max_attempts
                    );
                }
                Reply::Unrecognized(text) => {
                    tracing::debug!("Ignoring line: {}", text);
                }
                Reply::Wait | Reply::OkWithCode(_) => {}
            }

            let resend = reply == Reply::ResendRequest;
            attempt.record(reply);
            if resend {
                break;
            }
        }
    }

    Err(StreamError::RetryExhausted {
        command: command.to_string(),
        attempts: attempt.attempts,
    }
    .into())
}

/// Turn a terminal reply into the command's outcome
fn acknowledge(command: &str, attempts: u32, reply: Reply) -> Result<Delivery> {
    match reply {
        Reply::Wait => Ok(Delivery {
            ack: Acknowledgement::Idle,
            attempts,
        }),
        Reply::OkWithCode(code) if code == OK_SUCCESS_CODE => Ok(Delivery {
            ack: Acknowledgement::Ok,
            attempts,
        }),
        Reply::OkWithCode(code) => Err(StreamError::FirmwareRejected {
            command: command.to_string(),
            code,
        }
        .into()),
        other => Err(Error::other(format!("'{}' does not acknowledge a command", other))),
    }
}
