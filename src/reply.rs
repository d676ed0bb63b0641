//! Acceptance checks for replacement text produced by a generator.
//!
//! The generator is asked to open its answer with a marker and to return the
//! whole context rewritten. Replies without the marker, or that drop most of
//! the context's lines, are treated as bad answers and the issue is skipped.

use thiserror::Error;

pub const DEFAULT_MARKER: &str = "xxxx";
pub const DEFAULT_MIN_LINE_RATIO: f64 = 0.5;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReplyError {
    #[error("reply does not start with marker '{marker}'")]
    MissingMarker { marker: String },

    #[error("reply is empty after removing the marker")]
    Empty,

    #[error("reply has {reply_lines} lines for a {context_lines}-line context (minimum ratio {min_ratio})")]
    Shrunk {
        reply_lines: usize,
        context_lines: usize,
        min_ratio: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplyCheck {
    pub marker: String,
    pub min_line_ratio: f64,
}

impl Default for ReplyCheck {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            min_line_ratio: DEFAULT_MIN_LINE_RATIO,
        }
    }
}

impl ReplyCheck {
    /// Validate `reply` against a context of `context_lines` lines and return
    /// the replacement text.
    ///
    /// The marker and an optional surrounding code fence are removed, along
    /// with blank lines before the code and trailing whitespace. Indentation
    /// of the first code line is kept.
    pub fn accept(&self, reply: &str, context_lines: usize) -> Result<String, ReplyError> {
        let body = reply
            .trim_start()
            .strip_prefix(self.marker.as_str())
            .ok_or_else(|| ReplyError::MissingMarker {
                marker: self.marker.clone(),
            })?;

        let code = strip_code_fence(body);
        let code = trim_leading_blank_lines(code).trim_end();
        if code.is_empty() {
            return Err(ReplyError::Empty);
        }

        let reply_lines = code.lines().count();
        let minimum = (context_lines as f64 * self.min_line_ratio).floor() as usize;
        if reply_lines < minimum {
            return Err(ReplyError::Shrunk {
                reply_lines,
                context_lines,
                min_ratio: self.min_line_ratio,
            });
        }

        Ok(code.to_string())
    }
}

/// Remove a ```lang ... ``` fence wrapping the whole body, if any.
fn strip_code_fence(body: &str) -> &str {
    let trimmed = body.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return body;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return body;
    };
    // Drop the info string (`csharp`, `java`, ...) on the opening line.
    match rest.split_once('\n') {
        Some((_, code)) => code,
        None => rest,
    }
}

fn trim_leading_blank_lines(text: &str) -> &str {
    let mut rest = text;
    while let Some((line, tail)) = rest.split_once('\n') {
        if !line.trim().is_empty() {
            break;
        }
        rest = tail;
    }
    rest
}
