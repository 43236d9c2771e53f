//! G-Code line normalization and word parsing
//!
//! Every tool in the workspace reads G-code through the same convention:
//! `;` starts a comment that runs to the end of the line, surrounding
//! whitespace is insignificant, and the remaining text is a command word
//! followed by whitespace-separated parameters such as `X10.5`.

use crate::constants::COMMENT_DELIMITER;
use crate::error::{GcodeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strip the comment and surrounding whitespace from a raw line.
///
/// The result never contains the comment delimiter. An empty result means
/// the line carries no command.
///
/// ```
/// use gcodesend_core::gcode::normalize;
///
/// assert_eq!(normalize("  G1 X10 ; move\r\n"), "G1 X10");
/// assert_eq!(normalize("; only a comment"), "");
/// ```
pub fn normalize(raw: &str) -> &str {
    let code = match raw.find(COMMENT_DELIMITER) {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    code.trim()
}

/// Split a raw line into whitespace-separated words after normalization.
pub fn tokenize(raw: &str) -> impl Iterator<Item = &str> {
    normalize(raw).split_whitespace()
}

/// A command word with its single-letter parameters
///
/// `G1 X10 Y-2.5 F1500` parses to command `G1` with parameters
/// `{F: "1500", X: "10", Y: "-2.5"}`. A letter repeated on the same line keeps
/// the last value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcodeLine {
    /// Command word (e.g., "G1", "M104")
    pub command: String,
    /// Parameter values keyed by their letter
    pub params: BTreeMap<char, String>,
}

impl GcodeLine {
    /// Parse a raw line; returns `None` for blank and comment-only lines
    pub fn parse(raw: &str) -> Option<Self> {
        let mut words = tokenize(raw);
        let command = words.next()?.to_string();

        let mut params = BTreeMap::new();
        for word in words {
            let mut chars = word.chars();
            if let Some(letter) = chars.next() {
                params.insert(letter, chars.as_str().to_string());
            }
        }

        Some(Self { command, params })
    }

    /// Check whether a parameter letter is present
    pub fn has_param(&self, letter: char) -> bool {
        self.params.contains_key(&letter)
    }

    /// Raw text of a parameter
    pub fn param(&self, letter: char) -> Option<&str> {
        self.params.get(&letter).map(String::as_str)
    }

    /// Numeric value of a parameter
    ///
    /// Only finite numbers are accepted. `line_number` is only used for error
    /// reporting.
    pub fn param_f64(&self, letter: char, line_number: usize) -> Result<Option<f64>> {
        let Some(text) = self.param(letter) else {
            return Ok(None);
        };
        let invalid = |reason: String| GcodeError::InvalidParameter {
            line_number,
            param: letter.to_string(),
            reason,
        };

        let value = text
            .parse::<f64>()
            .map_err(|e| invalid(format!("'{}' is not a number: {}", text, e)))?;
        if !value.is_finite() {
            return Err(invalid(format!("'{}' is not a finite number", text)).into());
        }
        Ok(Some(value))
    }
}

impl std::fmt::Display for GcodeLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command)?;
        for (letter, value) in &self.params {
            write!(f, " {}{}", letter, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_comment() {
        assert_eq!(normalize("G1 X10 ; move"), "G1 X10");
        assert_eq!(normalize("; only a comment"), "");
        assert_eq!(normalize("G28;home;twice"), "G28");
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(normalize("\t  M104 S200  \r\n"), "M104 S200");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_keeps_case_and_spacing() {
        assert_eq!(normalize("g1  x10"), "g1  x10");
    }

    #[test]
    fn test_tokenize() {
        let words: Vec<&str> = tokenize(" G1   X5\tY6 ; go").collect();
        assert_eq!(words, vec!["G1", "X5", "Y6"]);
        assert_eq!(tokenize("; nothing").count(), 0);
    }

    #[test]
    fn test_parse_line() {
        let line = GcodeLine::parse("G1 X10 Y-2.5 F1500 ; move").unwrap();
        assert_eq!(line.command, "G1");
        assert_eq!(line.param('X'), Some("10"));
        assert_eq!(line.param('Y'), Some("-2.5"));
        assert_eq!(line.param('F'), Some("1500"));
        assert!(!line.has_param('Z'));
    }

    #[test]
    fn test_parse_blank_line() {
        assert!(GcodeLine::parse("").is_none());
        assert!(GcodeLine::parse("  ; comment").is_none());
    }

    #[test]
    fn test_parse_repeated_letter_keeps_last() {
        let line = GcodeLine::parse("G0 X1 X2").unwrap();
        assert_eq!(line.param('X'), Some("2"));
    }

    #[test]
    fn test_param_f64() {
        let line = GcodeLine::parse("G1 X10.5 E").unwrap();
        assert_eq!(line.param_f64('X', 1).unwrap(), Some(10.5));
        assert_eq!(line.param_f64('Y', 1).unwrap(), None);

        let err = line.param_f64('E', 7).unwrap_err();
        assert!(err.is_gcode_error());
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn test_param_f64_rejects_non_finite() {
        let line = GcodeLine::parse("G1 FNaN Xinf Y-infinity Z1e400").unwrap();
        for letter in ['F', 'X', 'Y', 'Z'] {
            let err = line.param_f64(letter, 4).unwrap_err();
            assert!(err.is_gcode_error());
            assert!(err.to_string().contains("finite"), "{err}");
        }
    }

    #[test]
    fn test_display() {
        let line = GcodeLine::parse("G1 Y2 X1").unwrap();
        assert_eq!(line.to_string(), "G1 X1 Y2");
    }
}
