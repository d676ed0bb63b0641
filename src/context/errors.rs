use crate::range::RangeError;
use crate::ts::TreeSitterError;
use thiserror::Error;

/// Reasons an issue span cannot be resolved against the current file text.
///
/// All of them are local to one issue: the caller skips it and moves on.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("invalid range: {0}")]
    InvalidRange(#[from] RangeError),

    #[error("line {line} is out of range (file has {line_count} lines)")]
    LineOutOfBounds { line: usize, line_count: usize },

    #[error("offset {offset} is out of range on line {line} (length {line_len})")]
    OffsetOutOfBounds {
        line: usize,
        offset: usize,
        line_len: usize,
    },

    #[error("no enclosing declaration found for lines {start_line}..={end_line}")]
    NoEnclosingUnit { start_line: usize, end_line: usize },

    #[error("invalid signature pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("tree-sitter error: {0}")]
    TreeSitter(#[from] TreeSitterError),
}

impl ResolveError {
    /// True for the stale-data family: the span no longer fits the file.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(
            self,
            ResolveError::LineOutOfBounds { .. } | ResolveError::OffsetOutOfBounds { .. }
        )
    }
}
