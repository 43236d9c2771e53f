//! # GCodeSend
//!
//! A command-line G-code streamer for serial-attached printers and CNC
//! controllers, with offline tools for estimating and optimizing programs.
//!
//! ## Architecture
//!
//! GCodeSend is organized as a workspace with multiple crates:
//!
//! 1. **gcodesend-core** - Errors, constants, line normalization, G-code words
//! 2. **gcodesend-communication** - Serial link, reply protocol, streaming engine
//! 3. **gcodesend-settings** - Configuration file model and validation
//! 4. **gcodesend-gcode** - Print time estimator and travel optimizer
//! 5. **gcodesend** - Main binary that integrates all crates

pub mod cli;

pub use gcodesend_communication::{
    list_ports, open_serial, ConnectionParams, Link, SerialLink, SerialPortInfo, StreamConfig,
    StreamDriver, StreamSummary,
};
pub use gcodesend_core::{normalize, ConnectionError, Error, GcodeError, Result, StreamError};
pub use gcodesend_gcode::{EstimateReport, OptimizeStats, TimeEstimator, TravelOptimizer};
pub use gcodesend_settings::{Config, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Log records go to stderr so that filter output on stdout stays clean.
/// `RUST_LOG` takes precedence; otherwise the level is INFO, or DEBUG when
/// `verbose` is set.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_level(true)
        .with_line_number(verbose);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
