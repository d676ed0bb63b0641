//! Line index and span extraction over raw file text.

pub mod extract;
pub mod lines;

pub use extract::extract_span;
pub use lines::{LineEnding, LineSequence};
