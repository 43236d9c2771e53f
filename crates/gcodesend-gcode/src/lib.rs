//! # GCodeSend G-code Tools
//!
//! Offline processing of G-code programs: a print time estimator that
//! replays motion through a print-head model, and a travel optimizer that
//! merges runs of rapid moves.

pub mod estimator;
pub mod optimizer;

pub use estimator::{
    format_duration, EstimateReport, MoveCost, MoveTarget, PrintHead, TimeEstimator,
    DEFAULT_FEED_RATE,
};
pub use optimizer::{OptimizeStats, TravelOptimizer};
