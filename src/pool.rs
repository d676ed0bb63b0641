//! Thread-local parser pooling.
//!
//! Resolving a batch of issues parses one file per issue; each thread keeps
//! one parser per language and reuses it across calls.

use crate::ts::{SourceLanguage, SourceParser, TreeSitterError};
use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

thread_local! {
    static PARSERS: RefCell<HashMap<SourceLanguage, SourceParser>> = RefCell::new(HashMap::new());
}

/// Execute `f` with the pooled parser for `language`.
///
/// The parser is created on first use per thread and language.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use issue_patcher::pool::with_parser;
/// use issue_patcher::ts::SourceLanguage;
///
/// let has_errors = with_parser(SourceLanguage::CSharp, |parser| {
///     parser.parse_with_source("class A {}").map(|parsed| parsed.has_errors())
/// })??;
/// # Ok(())
/// # }
/// ```
pub fn with_parser<F, R>(language: SourceLanguage, f: F) -> Result<R, TreeSitterError>
where
    F: FnOnce(&mut SourceParser) -> R,
{
    PARSERS.with(|cell| {
        let mut parsers = cell.borrow_mut();
        let parser = match parsers.entry(language) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(SourceParser::new(language)?),
        };
        Ok(f(parser))
    })
}

/// Number of parsers pooled on this thread.
pub fn pooled_count() -> usize {
    PARSERS.with(|cell| cell.borrow().len())
}
