//! Travel move optimizer
//!
//! Runs of `G0` moves that only touch X, Y and F are merged into a single
//! move to the final position. Every other line passes through unchanged.

use gcodesend_core::constants::LINE_TERMINATOR;
use gcodesend_core::gcode::GcodeLine;
use gcodesend_core::{Error, Result};
use serde::Serialize;
use std::io::{BufRead, Write};

/// A run of merged travel moves
#[derive(Debug, Clone, Default, PartialEq)]
struct PendingTravel {
    lines: usize,
    x: Option<f64>,
    y: Option<f64>,
    speed: Option<f64>,
}

impl PendingTravel {
    fn absorb(&mut self, line: &GcodeLine, relative: bool, line_number: usize) -> Result<()> {
        self.lines += 1;

        if let Some(x) = line.param_f64('X', line_number)? {
            self.x = Some(accumulate(self.x, x, relative));
        }
        if let Some(y) = line.param_f64('Y', line_number)? {
            self.y = Some(accumulate(self.y, y, relative));
        }
        if let Some(speed) = line.param_f64('F', line_number)? {
            self.speed = Some(speed);
        }
        Ok(())
    }

    fn render(&self) -> String {
        let mut travel = String::from("G0");
        if let Some(speed) = self.speed {
            travel.push_str(&format!(" F{}", speed));
        }
        if let Some(x) = self.x {
            travel.push_str(&format!(" X{}", x));
        }
        if let Some(y) = self.y {
            travel.push_str(&format!(" Y{}", y));
        }
        travel.push_str(&format!(" ; opt {} lines", self.lines));
        travel
    }
}

fn accumulate(current: Option<f64>, value: f64, relative: bool) -> f64 {
    match current {
        Some(current) if relative => current + value,
        _ => value,
    }
}

/// Counters for an optimizer run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OptimizeStats {
    pub lines_in: usize,
    pub lines_out: usize,
    /// Travel moves merged away
    pub merged: usize,
}

/// Streaming travel optimizer
#[derive(Debug, Default)]
pub struct TravelOptimizer {
    pending: PendingTravel,
    relative: bool,
    line_number: usize,
}

impl TravelOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether travel moves are waiting to be flushed
    pub fn is_traveling(&self) -> bool {
        self.pending.lines > 0
    }

    /// Feed one line (terminator already stripped); returns the lines to emit
    pub fn process_line(&mut self, line: &str) -> Result<Vec<String>> {
        self.line_number += 1;
        let parsed = GcodeLine::parse(line);

        if let Some(parsed) = &parsed {
            if is_plain_travel(parsed) {
                self.pending.absorb(parsed, self.relative, self.line_number)?;
                return Ok(Vec::new());
            }
        }

        let mut output = Vec::with_capacity(2);
        output.extend(self.flush());

        match parsed.as_ref().map(|p| p.command.as_str()) {
            Some("G90") => self.relative = false,
            Some("G91") => self.relative = true,
            _ => {}
        }

        output.push(line.to_string());
        Ok(output)
    }

    /// Emit the pending travel, if any
    pub fn flush(&mut self) -> Option<String> {
        if !self.is_traveling() {
            return None;
        }
        let travel = std::mem::take(&mut self.pending);
        Some(travel.render())
    }

    /// Optimize a whole program, writing CRLF-terminated lines
    pub fn optimize<R: BufRead, W: Write>(reader: R, mut writer: W) -> Result<OptimizeStats> {
        let mut optimizer = Self::new();
        let mut stats = OptimizeStats::default();

        for line in reader.lines() {
            let line = line.map_err(Error::from)?;
            stats.lines_in += 1;
            for out in optimizer.process_line(line.trim_end_matches(['\r', '\n']))? {
                write!(writer, "{}{}", out, LINE_TERMINATOR)?;
                stats.lines_out += 1;
            }
        }
        if let Some(out) = optimizer.flush() {
            write!(writer, "{}{}", out, LINE_TERMINATOR)?;
            stats.lines_out += 1;
        }
        writer.flush()?;

        stats.merged = stats.lines_in.saturating_sub(stats.lines_out);
        tracing::info!(
            "Optimized {} lines into {} lines",
            stats.lines_in,
            stats.lines_out
        );
        Ok(stats)
    }
}

/// `G0` that moves neither Z nor the extruder
fn is_plain_travel(line: &GcodeLine) -> bool {
    line.command == "G0" && !line.has_param('Z') && !line.has_param('E')
}
