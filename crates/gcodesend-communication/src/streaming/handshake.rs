//! Link start handshake

use super::StreamConfig;
use crate::communication::Link;
use crate::protocol::WAIT_TOKEN;
use gcodesend_core::{ConnectionError, Error, Result};

/// Wake the firmware and block until it reports `wait`
///
/// Writes `config.wake_lines` blank lines (firmware that is still booting may
/// swallow the first), then discards boot banners and stale output until the
/// readiness token arrives. An empty line counts as a timeout, as does a read
/// that returns nothing at all.
pub fn wait_for_ready<L: Link + ?Sized>(link: &mut L, config: &StreamConfig) -> Result<()> {
    tracing::info!("Waking up firmware on {}", link.name());
    for _ in 0..config.wake_lines {
        link.write_line("")?;
    }

    tracing::debug!("Waiting for {}", WAIT_TOKEN);
    loop {
        let line = link.read_line()?;

        if line.is_empty() {
            return Err(Error::from(ConnectionError::LinkTimeout {
                timeout_ms: link.timeout_ms(),
            }));
        }

        if line == WAIT_TOKEN {
            tracing::info!("Firmware on {} is ready", link.name());
            return Ok(());
        }

        tracing::debug!("Ignoring line: {}", line);
    }
}
