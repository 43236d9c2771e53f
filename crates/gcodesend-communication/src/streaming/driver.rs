//! Stream driver
//!
//! Owns the link for the whole run. Handshakes once, then normalizes and
//! delivers each input line in order, stopping at the first command that
//! cannot be delivered. Commands already delivered stay delivered.

use super::handshake::wait_for_ready;
use super::sender::send_command;
use super::StreamConfig;
use crate::communication::Link;
use gcodesend_core::gcode::normalize;
use gcodesend_core::{Error, Result, StreamError};
use serde::Serialize;
use std::io::BufRead;

/// Totals for a completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamSummary {
    /// Input lines consumed
    pub lines_read: usize,
    /// Commands acknowledged by the firmware
    pub delivered: usize,
    /// Blank or comment-only lines
    pub skipped: usize,
    /// Command transmissions, retransmissions included
    pub transmissions: u64,
}

/// Drives a G-code program through a link
pub struct StreamDriver<L: Link> {
    link: L,
    config: StreamConfig,
    ready: bool,
}

impl<L: Link> StreamDriver<L> {
    /// Take ownership of an open link
    pub fn new(link: L, config: StreamConfig) -> Self {
        Self {
            link,
            config,
            ready: false,
        }
    }

    /// Whether the handshake has completed
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Run the handshake unless it already succeeded on this link
    pub fn handshake(&mut self) -> Result<()> {
        if self.ready {
            return Ok(());
        }
        wait_for_ready(&mut self.link, &self.config).inspect_err(|e| {
            tracing::error!("Handshake with {} failed: {}", self.link.name(), e);
        })?;
        self.ready = true;
        Ok(())
    }

    /// Stream an in-memory program
    pub fn run<I, S>(&mut self, lines: I) -> Result<StreamSummary>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stream(lines.into_iter().map(Ok))
    }

    /// Stream a program from a reader, one line at a time
    pub fn run_reader<R: BufRead>(&mut self, reader: R) -> Result<StreamSummary> {
        self.stream(reader.lines().map(|line| line.map_err(Error::from)))
    }

    fn stream<I, S>(&mut self, lines: I) -> Result<StreamSummary>
    where
        I: Iterator<Item = Result<S>>,
        S: AsRef<str>,
    {
        self.handshake()?;

        tracing::info!("Sending gcode to {}", self.link.name());
        let mut summary = StreamSummary::default();

        for (index, line) in lines.enumerate() {
            let line = line?;
            let line_number = index + 1;
            summary.lines_read += 1;

            let command = normalize(line.as_ref());
            if command.is_empty() {
                summary.skipped += 1;
                continue;
            }

            tracing::info!("Command: {}", command);
            match send_command(&mut self.link, command, &self.config) {
                Ok(delivery) => {
                    summary.delivered += 1;
                    summary.transmissions += u64::from(delivery.attempts);
                }
                Err(e) => {
                    tracing::error!(
                        "Command '{}' at line {} failed - aborting: {}",
                        command,
                        line_number,
                        e
                    );
                    return Err(StreamError::Aborted {
                        line_number,
                        command: command.to_string(),
                        delivered: summary.delivered,
                        source: Box::new(e),
                    }
                    .into());
                }
            }
        }

        tracing::info!(
            "Stream complete: {} commands delivered, {} lines skipped",
            summary.delivered,
            summary.skipped
        );
        Ok(summary)
    }
}
