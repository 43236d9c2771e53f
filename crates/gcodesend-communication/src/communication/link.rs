//! Line framing over a blocking byte channel
//!
//! The firmware exchanges ASCII lines terminated by CRLF. [`LineLink`] turns
//! any [`Channel`] (a serial port, or a scripted port in tests) into a
//! [`Link`] that sends and receives whole lines. Each blocking read is bounded
//! by the time left before the line deadline, so `read_line` never blocks for
//! longer than the read timeout.

use gcodesend_core::constants::LINE_TERMINATOR;
use gcodesend_core::{ConnectionError, Result};
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

/// A bidirectional line channel to the firmware
pub trait Link {
    /// Write `line` followed by the line terminator
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Block until a line arrives and return it without its terminator
    ///
    /// Fails with [`ConnectionError::LinkTimeout`] when no data at all arrives
    /// within the read timeout. A bare terminator yields an empty string.
    fn read_line(&mut self) -> Result<String>;

    /// Name of the underlying port, for logging
    fn name(&self) -> &str;

    /// Read timeout in milliseconds
    fn timeout_ms(&self) -> u64;
}

/// Blocking byte channel with an adjustable read timeout
pub trait Channel: Read + Write {
    /// Bound the next blocking reads to `timeout`
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}

/// [`Link`] implementation over a blocking byte channel
#[derive(Debug)]
pub struct LineLink<T> {
    port: T,
    name: String,
    timeout: Duration,
    pending: Vec<u8>,
    lines_written: u64,
    /// Read timeout currently set on the channel
    read_timeout: Option<Duration>,
}

impl<T: Channel> LineLink<T> {
    /// Wrap a channel; `timeout` bounds every `read_line`
    pub fn new(port: T, name: impl Into<String>, timeout: Duration) -> Self {
        Self {
            port,
            name: name.into(),
            timeout,
            pending: Vec::new(),
            lines_written: 0,
            read_timeout: None,
        }
    }

    /// Number of lines written so far, wake-up lines included
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Borrow the underlying channel
    pub fn get_ref(&self) -> &T {
        &self.port
    }

    /// Pop one complete line from the receive buffer
    fn take_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|&b| b == b'\n')?;
        let raw: Vec<u8> = self.pending.drain(..=end).collect();
        Some(decode_line(&raw))
    }

    /// Return whatever arrived before the timeout, or fail when nothing did
    fn take_partial(&mut self) -> Result<String> {
        if self.pending.is_empty() {
            return Err(ConnectionError::LinkTimeout {
                timeout_ms: self.timeout_ms(),
            }
            .into());
        }
        let raw = std::mem::take(&mut self.pending);
        Ok(decode_line(&raw))
    }

    fn bound_next_read(&mut self, remaining: Duration) -> io::Result<()> {
        if self.read_timeout != Some(remaining) {
            self.port.set_read_timeout(remaining)?;
            self.read_timeout = Some(remaining);
        }
        Ok(())
    }
}

impl<T: Channel> Link for LineLink<T> {
    fn write_line(&mut self, line: &str) -> Result<()> {
        let mut frame = Vec::with_capacity(line.len() + LINE_TERMINATOR.len());
        frame.extend_from_slice(line.as_bytes());
        frame.extend_from_slice(LINE_TERMINATOR.as_bytes());

        self.port.write_all(&frame)?;
        self.port.flush()?;
        self.lines_written += 1;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        let deadline = Instant::now() + self.timeout;
        let mut chunk = [0u8; 256];

        loop {
            if let Some(line) = self.take_line() {
                return Ok(line);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return self.take_partial();
            }
            self.bound_next_read(remaining)?;

            match self.port.read(&mut chunk) {
                Ok(0) => return self.take_partial(),
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                    return self.take_partial();
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

impl<T> Drop for LineLink<T> {
    fn drop(&mut self) {
        tracing::debug!("Closing link {}", self.name);
    }
}

/// Strip trailing CR/LF bytes and decode as text
fn decode_line(raw: &[u8]) -> String {
    let end = raw
        .iter()
        .rposition(|&b| b != b'\r' && b != b'\n')
        .map_or(0, |pos| pos + 1);
    let bytes = &raw[..end];

    if !bytes.is_ascii() {
        tracing::debug!("Non-ASCII bytes in reply: {:02X?}", bytes);
    }
    String::from_utf8_lossy(bytes).into_owned()
}
