//! One-call resolution of an issue against file text.

use crate::context::{ContextExpander, ErrorContext, ResolveError};
use crate::range::TextRange;
use crate::splice::{splice, SpliceError};
use crate::text::{extract_span, LineSequence};
use serde::Serialize;

/// What an issue span resolves to in the current file text.
///
/// `error_spot` is the literal flagged text and `context` the enclosing unit;
/// together they are the material a generator needs to produce a
/// replacement for `context`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub error_spot: String,
    pub context: ErrorContext,
}

impl Resolution {
    /// Rebuild the file with `replacement` in place of the context.
    pub fn splice(&self, lines: &LineSequence<'_>, replacement: &str) -> Result<String, SpliceError> {
        splice(lines, &self.context, replacement)
    }
}

/// Extract the flagged text and expand it to its enclosing unit.
///
/// Pure: the same `(lines, range)` always yields the same resolution.
pub fn resolve(
    lines: &LineSequence<'_>,
    range: &TextRange,
    expander: &dyn ContextExpander,
) -> Result<Resolution, ResolveError> {
    let error_spot = extract_span(lines, range)?;
    let context = expander.expand(lines, range)?;
    Ok(Resolution {
        error_spot,
        context,
    })
}
