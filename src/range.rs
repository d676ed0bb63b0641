//! Issue span as reported by the analysis service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Line/column span of an issue.
///
/// Lines are 1-based. Offsets are 0-based character columns and only apply to
/// the first (`start_offset`) and last (`end_offset`) line of the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRange {
    pub start_line: usize,
    pub end_line: usize,
    #[serde(default)]
    pub start_offset: usize,
    #[serde(default)]
    pub end_offset: usize,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("line numbers are 1-based, got start line 0")]
    ZeroLine,

    #[error("start line {start_line} is after end line {end_line}")]
    Inverted { start_line: usize, end_line: usize },

    #[error("start offset {start_offset} is after end offset {end_offset} on line {line}")]
    InvertedOffsets {
        line: usize,
        start_offset: usize,
        end_offset: usize,
    },

    #[error("malformed range '{input}', expected LINE:COL-LINE:COL")]
    Malformed { input: String },
}

impl TextRange {
    pub fn new(start_line: usize, start_offset: usize, end_line: usize, end_offset: usize) -> Self {
        Self {
            start_line,
            end_line,
            start_offset,
            end_offset,
        }
    }

    pub fn is_single_line(&self) -> bool {
        self.start_line == self.end_line
    }

    /// Check the ordering invariants of the span.
    pub fn validate(&self) -> Result<(), RangeError> {
        if self.start_line == 0 {
            return Err(RangeError::ZeroLine);
        }
        if self.start_line > self.end_line {
            return Err(RangeError::Inverted {
                start_line: self.start_line,
                end_line: self.end_line,
            });
        }
        if self.is_single_line() && self.start_offset > self.end_offset {
            return Err(RangeError::InvertedOffsets {
                line: self.start_line,
                start_offset: self.start_offset,
                end_offset: self.end_offset,
            });
        }
        Ok(())
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_offset, self.end_line, self.end_offset
        )
    }
}

impl FromStr for TextRange {
    type Err = RangeError;

    /// Parse `LINE:COL-LINE:COL`, e.g. `12:4-14:9`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let malformed = || RangeError::Malformed {
            input: input.to_string(),
        };

        let (start, end) = input.trim().split_once('-').ok_or_else(malformed)?;
        let point = |s: &str| -> Option<(usize, usize)> {
            let (line, col) = s.split_once(':')?;
            Some((line.trim().parse().ok()?, col.trim().parse().ok()?))
        };

        let (start_line, start_offset) = point(start).ok_or_else(malformed)?;
        let (end_line, end_offset) = point(end).ok_or_else(malformed)?;

        let range = TextRange::new(start_line, start_offset, end_line, end_offset);
        range.validate()?;
        Ok(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cli_form() {
        let range: TextRange = "12:4-14:9".parse().unwrap();
        assert_eq!(range, TextRange::new(12, 4, 14, 9));
        assert_eq!(range.to_string(), "12:4-14:9");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            "12-14".parse::<TextRange>(),
            Err(RangeError::Malformed { .. })
        ));
        assert!(matches!(
            "a:1-2:3".parse::<TextRange>(),
            Err(RangeError::Malformed { .. })
        ));
    }

    #[test]
    fn validate_ordering() {
        assert_eq!(TextRange::new(0, 0, 1, 0).validate(), Err(RangeError::ZeroLine));
        assert!(matches!(
            TextRange::new(5, 0, 4, 0).validate(),
            Err(RangeError::Inverted { .. })
        ));
        assert!(matches!(
            TextRange::new(3, 6, 3, 2).validate(),
            Err(RangeError::InvertedOffsets { .. })
        ));
        // Offsets on different lines are unordered.
        assert!(TextRange::new(3, 6, 4, 2).validate().is_ok());
    }

    #[test]
    fn deserializes_service_json() {
        let json = r#"{"startLine":10,"endLine":12,"startOffset":8,"endOffset":25}"#;
        let range: TextRange = serde_json::from_str(json).unwrap();
        assert_eq!(range, TextRange::new(10, 8, 12, 25));
    }
}
