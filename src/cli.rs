//! Command-line interface

use crate::Config;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("BUILD_DATE"),
    ")"
);

/// GCodeSend - stream G-code to serial-attached firmware
#[derive(Parser, Debug)]
#[command(name = "gcodesend")]
#[command(about = "Stream G-code to printers and CNC controllers over a serial link", long_about = None)]
#[command(version, long_version = LONG_VERSION)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream a program to the device
    Send {
        #[command(flatten)]
        args: SendArgs,
    },

    /// Estimate print time, distance and filament
    Estimate {
        /// Input file (stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Merge travel moves; writes the program to stdout
    Optimize {
        /// Input file (stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// List serial ports that look like printers or CNC controllers
    Ports,
}

/// Options for `send`
#[derive(Args, Debug, Default, Clone)]
pub struct SendArgs {
    /// Serial port (e.g. /dev/ttyUSB0, COM3)
    #[arg(short, long)]
    pub port: Option<String>,

    /// Input file (stdin when omitted)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Baud rate
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Read timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Configuration file (.toml or .json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl SendArgs {
    /// Load the configuration and apply command-line overrides
    ///
    /// An explicit `--config` must exist. Without one, the default location
    /// is used when a file is present there.
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => match Config::default_path() {
                Ok(path) if path.exists() => load_config(&path)?,
                _ => Config::new(),
            },
        };

        if let Some(port) = &self.port {
            config.connection.port = port.clone();
        }
        if let Some(baud) = self.baud {
            config.connection.baud_rate = baud;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.connection.timeout_ms = timeout_ms;
        }

        config.validate().context("Invalid settings")?;
        if config.connection.port.is_empty() {
            anyhow::bail!("No serial port given; use --port or set connection.port");
        }
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<Config> {
    Config::load_from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Open a file or stdin for line-by-line reading
pub fn open_input(file: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}
