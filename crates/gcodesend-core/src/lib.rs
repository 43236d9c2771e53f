//! # GCodeSend Core
//!
//! Core types, errors, and G-code line handling for GCodeSend.
//! Provides the line normalizer shared by the serial streamer and the
//! offline tools, plus the protocol defaults.

pub mod constants;
pub mod error;
pub mod gcode;

pub use error::{ConnectionError, Error, GcodeError, Result, StreamError};
pub use gcode::{normalize, tokenize, GcodeLine};
