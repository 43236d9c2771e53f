//! Print time estimator
//!
//! Replays motion commands through a print-head model and accumulates the
//! travelled distance, the time spent at the programmed feed rates, and the
//! filament consumed. Acceleration is not modelled.

use gcodesend_core::gcode::GcodeLine;
use gcodesend_core::{Error, GcodeError, Result};
use serde::Serialize;
use std::fmt;
use std::io::BufRead;

/// Feed rate assumed before the program sets one (mm/min)
pub const DEFAULT_FEED_RATE: f64 = 1500.0;

/// Target of a move; `None` leaves the axis untouched
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveTarget {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub extruder: Option<f64>,
    /// Feed rate in mm/min
    pub speed: Option<f64>,
}

/// Cost of a single move
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveCost {
    /// Distance in metres
    pub distance_m: f64,
    /// Duration in seconds
    pub time_s: f64,
    /// Filament in metres
    pub filament_m: f64,
}

/// Print-head state with running totals
#[derive(Debug, Clone, PartialEq)]
pub struct PrintHead {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub extruder: f64,
    /// Current feed rate in mm/min
    pub speed: f64,
    /// G91 positioning
    pub relative: bool,
    /// M83 extrusion
    pub relative_extruder: bool,
    totals: MoveCost,
}

impl Default for PrintHead {
    fn default() -> Self {
        Self::new()
    }
}

impl PrintHead {
    pub fn new() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            extruder: 0.0,
            speed: DEFAULT_FEED_RATE,
            relative: false,
            relative_extruder: false,
            totals: MoveCost::default(),
        }
    }

    /// G90/G91: positioning mode, which also switches the extrusion mode
    pub fn set_relative(&mut self, relative: bool) {
        self.relative = relative;
        self.set_extruder_relative(relative);
    }

    /// M82/M83: extrusion mode only
    pub fn set_extruder_relative(&mut self, relative: bool) {
        self.relative_extruder = relative;
    }

    /// G28: travel to the origin
    pub fn home(&mut self) -> MoveCost {
        self.travel_to(MoveTarget {
            x: Some(0.0),
            y: Some(0.0),
            z: Some(0.0),
            ..MoveTarget::default()
        })
    }

    /// Move the head and add the cost of the move to the totals
    pub fn travel_to(&mut self, target: MoveTarget) -> MoveCost {
        let filament_m = match target.extruder {
            Some(e) if self.relative_extruder => {
                self.extruder += e;
                e / 1000.0
            }
            Some(e) => {
                let delta = (e - self.extruder) / 1000.0;
                self.extruder = e;
                delta
            }
            None => 0.0,
        };

        if let Some(speed) = target.speed {
            self.speed = speed;
        }

        let dx = self.travel_axis(Axis::X, target.x);
        let dy = self.travel_axis(Axis::Y, target.y);
        let dz = self.travel_axis(Axis::Z, target.z);

        let distance_m = (dx * dx + dy * dy + dz * dz).sqrt() / 1000.0;
        // mm/min feed against metres travelled
        let time_s = 60.0 * 1000.0 * distance_m / self.speed;

        let cost = MoveCost {
            distance_m,
            time_s,
            filament_m,
        };
        self.totals.distance_m += cost.distance_m;
        self.totals.time_s += cost.time_s;
        self.totals.filament_m += cost.filament_m;
        cost
    }

    /// Accumulated cost of every move so far
    pub fn totals(&self) -> MoveCost {
        self.totals
    }

    fn travel_axis(&mut self, axis: Axis, target: Option<f64>) -> f64 {
        let Some(value) = target else {
            return 0.0;
        };
        let relative = self.relative;
        let position = match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        };

        if relative {
            *position += value;
            value
        } else {
            let delta = *position - value;
            *position = value;
            delta
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
    Z,
}

/// Totals for a whole program
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EstimateReport {
    pub distance_m: f64,
    pub time_s: f64,
    pub filament_m: f64,
    /// Motion commands replayed, homing included
    pub moves: u64,
}

impl fmt::Display for EstimateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Distance: {:.6} m", self.distance_m)?;
        writeln!(
            f,
            "Time: {:.6} s ({})",
            self.time_s,
            format_duration(self.time_s)
        )?;
        write!(f, "Filament: {:.6} m", self.filament_m)
    }
}

/// Format seconds as `h:mm:ss`
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!(
        "{}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Line-by-line estimator over a G-code program
#[derive(Debug, Default)]
pub struct TimeEstimator {
    head: PrintHead,
    moves: u64,
    line_number: usize,
}

impl TimeEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay one raw line
    pub fn process_line(&mut self, raw: &str) -> Result<()> {
        self.line_number += 1;
        let Some(line) = GcodeLine::parse(raw) else {
            return Ok(());
        };

        match line.command.as_str() {
            "G0" | "G1" => {
                let target = self.move_target(&line)?;
                self.head.travel_to(target);
                self.moves += 1;
            }
            "G28" => {
                self.head.home();
                self.moves += 1;
            }
            "G90" => self.head.set_relative(false),
            "G91" => self.head.set_relative(true),
            "M82" => self.head.set_extruder_relative(false),
            "M83" => self.head.set_extruder_relative(true),
            _ => {}
        }
        Ok(())
    }

    fn move_target(&self, line: &GcodeLine) -> Result<MoveTarget> {
        for letter in line.params.keys() {
            if !matches!(letter, 'X' | 'Y' | 'Z' | 'E' | 'F') {
                tracing::debug!(
                    "Ignoring parameter {} at line {}",
                    letter,
                    self.line_number
                );
            }
        }

        let speed = line.param_f64('F', self.line_number)?;
        if let Some(speed) = speed {
            if !speed.is_finite() || speed <= 0.0 {
                return Err(GcodeError::InvalidParameter {
                    line_number: self.line_number,
                    param: "F".to_string(),
                    reason: format!("feed rate must be > 0, got {}", speed),
                }
                .into());
            }
        }

        Ok(MoveTarget {
            x: line.param_f64('X', self.line_number)?,
            y: line.param_f64('Y', self.line_number)?,
            z: line.param_f64('Z', self.line_number)?,
            extruder: line.param_f64('E', self.line_number)?,
            speed,
        })
    }

    /// Totals so far
    pub fn report(&self) -> EstimateReport {
        let totals = self.head.totals();
        EstimateReport {
            distance_m: totals.distance_m,
            time_s: totals.time_s,
            filament_m: totals.filament_m,
            moves: self.moves,
        }
    }

    /// Estimate a whole program from a reader
    pub fn estimate_reader<R: BufRead>(reader: R) -> Result<EstimateReport> {
        let mut estimator = Self::new();
        for line in reader.lines() {
            let line = line.map_err(Error::from)?;
            estimator.process_line(&line)?;
        }
        let report = estimator.report();
        tracing::info!(
            "Estimated {} moves over {} lines",
            report.moves,
            estimator.line_number
        );
        Ok(report)
    }
}
