use anyhow::{Context, Result};
use clap::Parser;
use gcodesend::cli::{open_input, Cli, Commands, SendArgs};
use gcodesend::{init_logging, list_ports, open_serial, StreamDriver, TimeEstimator, TravelOptimizer};
use std::io::{self, Write};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Send { args } => send(&args),
        Commands::Estimate { file, json } => estimate(file.as_deref(), json),
        Commands::Optimize { file } => optimize(file.as_deref()),
        Commands::Ports => ports(),
    }
}

fn send(args: &SendArgs) -> Result<()> {
    let config = args.resolve_config()?;
    let input = open_input(args.file.as_deref())?;

    let params = config.connection_params();
    let link = open_serial(&params)
        .with_context(|| format!("Failed to open serial port {}", params.port))?;

    // The link is released when the driver drops, on success or failure
    let mut driver = StreamDriver::new(link, config.stream_config());
    let summary = driver.run_reader(input)?;

    tracing::info!(
        "Sent {} commands ({} transmissions, {} lines skipped)",
        summary.delivered,
        summary.transmissions,
        summary.skipped
    );
    Ok(())
}

fn estimate(file: Option<&Path>, json: bool) -> Result<()> {
    let input = open_input(file)?;
    let report = TimeEstimator::estimate_reader(input)?;

    let mut stdout = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, &report)?;
        writeln!(stdout)?;
    } else {
        writeln!(stdout, "{}", report)?;
    }
    Ok(())
}

fn optimize(file: Option<&Path>) -> Result<()> {
    let input = open_input(file)?;
    let stdout = io::stdout().lock();
    TravelOptimizer::optimize(input, io::BufWriter::new(stdout))?;
    Ok(())
}

fn ports() -> Result<()> {
    let ports = list_ports()?;
    let mut stdout = io::stdout().lock();
    if ports.is_empty() {
        tracing::info!("No serial ports found");
    }
    for port in ports {
        writeln!(stdout, "{}", port)?;
    }
    Ok(())
}
