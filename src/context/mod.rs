//! Widening an issue span to the declaration that encloses it.
//!
//! Two interchangeable strategies implement [`ContextExpander`]:
//!
//! - [`HeuristicExpander`] scans lines for a declaration-like signature. It is
//!   language-agnostic and never fails on unparseable input.
//! - [`StructuralExpander`] parses the file with tree-sitter and walks up from
//!   the smallest node covering the span to the nearest declaration.
//!
//! Neither falls back to the other; the caller picks one per file via
//! [`Strategy`].

pub mod errors;
pub mod heuristic;
pub mod structural;

pub use errors::ResolveError;
pub use heuristic::{BoundaryFilter, HeuristicExpander, DEFAULT_PADDING, DEFAULT_SIGNATURE};
pub use structural::StructuralExpander;

use crate::range::TextRange;
use crate::text::LineSequence;
use crate::ts::SourceLanguage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The enclosing unit of an issue.
///
/// `start_line..end_line` are 0-based, end-exclusive indices into the
/// [`LineSequence`] the context was resolved against, and `context` is
/// exactly those lines as they appear in the file, inner terminators
/// included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorContext {
    pub start_line: usize,
    pub end_line: usize,
    pub context: String,
}

impl ErrorContext {
    /// Build a context from line bounds, taking the text from `lines`.
    pub fn from_lines(lines: &LineSequence<'_>, start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            end_line,
            context: lines.join_range(start_line..end_line),
        }
    }

    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line
    }
}

/// Capability shared by both expansion strategies.
pub trait ContextExpander {
    fn expand(
        &self,
        lines: &LineSequence<'_>,
        range: &TextRange,
    ) -> Result<ErrorContext, ResolveError>;

    /// Short name for logs and CLI output.
    fn name(&self) -> &'static str;
}

/// Caller policy for choosing an expander.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Structural when the file's language has a parser, heuristic otherwise.
    #[default]
    Auto,
    Heuristic,
    Structural,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Auto => "auto",
            Strategy::Heuristic => "heuristic",
            Strategy::Structural => "structural",
        })
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Strategy::Auto),
            "heuristic" => Ok(Strategy::Heuristic),
            "structural" => Ok(Strategy::Structural),
            other => Err(format!(
                "unknown strategy '{other}' (expected auto, heuristic or structural)"
            )),
        }
    }
}

/// Pick the expander for `path` under `strategy`.
///
/// `Structural` on a file with no known language is an error rather than a
/// silent switch to the heuristic.
pub fn expander_for(
    strategy: Strategy,
    path: &Path,
    heuristic: HeuristicExpander,
) -> Result<Box<dyn ContextExpander>, UnsupportedLanguage> {
    let language = SourceLanguage::from_path(path);
    match (strategy, language) {
        (Strategy::Heuristic, _) | (Strategy::Auto, None) => Ok(Box::new(heuristic)),
        (Strategy::Auto | Strategy::Structural, Some(language)) => {
            Ok(Box::new(StructuralExpander::new(language)))
        }
        (Strategy::Structural, None) => Err(UnsupportedLanguage {
            path: path.display().to_string(),
        }),
    }
}

#[derive(thiserror::Error, Debug)]
#[error("no structural parser for {path}")]
pub struct UnsupportedLanguage {
    pub path: String,
}
