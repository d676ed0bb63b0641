//! Tree-sitter integration for structural issue resolution.
//!
//! Parses C#, Java and Rust sources into concrete syntax trees so an issue
//! span can be widened to the declaration that encloses it, and patched files
//! can be checked for newly introduced syntax errors.

pub mod errors;
pub mod lang;
pub mod parser;
pub mod validator;

pub use errors::TreeSitterError;
pub use lang::{DeclarationTiers, SourceLanguage};
pub use parser::{ErrorNode, ParsedSource, SourceParser};
pub use validator::{validate_patch, validate_syntax};
