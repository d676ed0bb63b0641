//! Issue Patcher: resolve static-analysis issues to editable source context
//!
//! Given a file and the line/column span a code-quality service flagged, the
//! crate extracts the exact flagged text, expands it to the enclosing
//! declaration (method, property, type) and splices a replacement for that
//! declaration back into the file.
//!
//! # Architecture
//!
//! All file edits compile down to one primitive: [`splice`], which replaces
//! a whole-line [`ErrorContext`] inside a [`LineSequence`]. Intelligence
//! lives in context acquisition, via either the line-scanning
//! [`HeuristicExpander`] or the tree-sitter backed [`StructuralExpander`].
//!
//! # Safety
//!
//! - Patches verify the resolved context text before writing
//! - Atomic file writes (tempfile + fsync + rename)
//! - Source-root boundary enforcement
//! - Line endings preserved byte for byte
//! - Re-applying a patch whose replacement is already in place is a no-op
//!
//! # Example
//!
//! ```no_run
//! use issue_patcher::{resolve, LineSequence, StructuralExpander, SourceLanguage, TextRange};
//!
//! let source = std::fs::read_to_string("src/Cart.cs").unwrap();
//! let lines = LineSequence::split(&source);
//! let range: TextRange = "42:12-42:30".parse().unwrap();
//!
//! let expander = StructuralExpander::new(SourceLanguage::CSharp);
//! match resolve(&lines, &range, &expander) {
//!     Ok(resolution) => println!("{}", resolution.context.context),
//!     Err(e) => eprintln!("Resolution failed: {}", e),
//! }
//! ```

pub mod config;
pub mod context;
pub mod format;
pub mod issue;
pub mod patch;
pub mod pool;
pub mod range;
pub mod reply;
pub mod resolve;
pub mod safety;
pub mod splice;
pub mod text;
pub mod ts;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, FixerConfig};
pub use context::{
    expander_for, ContextExpander, ErrorContext, HeuristicExpander, ResolveError, Strategy,
    StructuralExpander,
};
pub use issue::{Issue, IssueFilter};
pub use patch::{ContextVerification, FilePatch, PatchError, PatchOutcome};
pub use range::{RangeError, TextRange};
pub use reply::{ReplyCheck, ReplyError};
pub use resolve::{resolve, Resolution};
pub use safety::{SafetyError, SourceRoot};
pub use splice::{splice, SpliceError};
pub use text::{extract_span, LineEnding, LineSequence};
pub use ts::{validate_patch, SourceLanguage, TreeSitterError};
