use crate::context::{ContextExpander, ErrorContext, ResolveError};
use crate::pool;
use crate::range::TextRange;
use crate::text::LineSequence;
use crate::ts::{SourceLanguage, TreeSitterError};
use std::ops::Range;
use tracing::debug;
use tree_sitter::Node;

/// Parser-backed expander: the context is the nearest declaration whose
/// syntax node contains the issue span.
///
/// Declarations are searched tier by tier up the ancestor chain, so a span in
/// a method resolves to the method even when a property or class also
/// contains it. The returned context covers the whole lines the declaration
/// occupies, attributes included.
#[derive(Debug, Clone, Copy)]
pub struct StructuralExpander {
    language: SourceLanguage,
}

impl StructuralExpander {
    pub fn new(language: SourceLanguage) -> Self {
        Self { language }
    }

    pub fn language(&self) -> SourceLanguage {
        self.language
    }

    /// Byte span of the issue lines with surrounding whitespace removed.
    ///
    /// Tree-sitter nodes start at their first token, so an untrimmed span
    /// starting at column 0 would only fit the parent of the declaration.
    fn byte_span(lines: &LineSequence<'_>, range: &TextRange) -> Range<usize> {
        let last_index = lines.len() - 1;
        let first = (range.start_line - 1).min(last_index);
        let last = (range.end_line - 1).min(last_index).max(first);

        let first_line = lines.get(first).unwrap_or_default();
        let last_line = lines.get(last).unwrap_or_default();

        let start =
            lines.line_start_offset(first) + (first_line.len() - first_line.trim_start().len());
        let end = lines.line_start_offset(last) + last_line.trim_end().len();
        start..end.max(start)
    }

    fn enclosing_declaration<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        self.language
            .declaration_tiers()
            .in_order()
            .into_iter()
            .find_map(|kinds| {
                let mut current = Some(node);
                while let Some(candidate) = current {
                    if kinds.contains(&candidate.kind()) {
                        return Some(candidate);
                    }
                    current = candidate.parent();
                }
                None
            })
    }
}

impl ContextExpander for StructuralExpander {
    fn expand(
        &self,
        lines: &LineSequence<'_>,
        range: &TextRange,
    ) -> Result<ErrorContext, ResolveError> {
        range.validate()?;
        let source = lines.source();
        let span = Self::byte_span(lines, range);

        let declaration = pool::with_parser(self.language, |parser| {
            let parsed = parser.parse_with_source(source)?;
            if parsed.has_errors() {
                debug!(
                    language = %self.language,
                    "source has syntax errors, declaration bounds may be approximate"
                );
            }
            let root = parsed.root_node();
            let node = root
                .descendant_for_byte_range(span.start, span.end)
                .unwrap_or(root);
            Ok::<_, TreeSitterError>(
                self.enclosing_declaration(node)
                    .map(|decl| (decl.kind(), decl.byte_range())),
            )
        })??;

        let Some((kind, bytes)) = declaration else {
            debug!(%range, language = %self.language, "no enclosing declaration");
            return Err(ResolveError::NoEnclosingUnit {
                start_line: range.start_line,
                end_line: range.end_line,
            });
        };

        let start_line = lines.line_of_offset(bytes.start);
        let last_byte = bytes.end.saturating_sub(1).max(bytes.start);
        let end_line = lines.line_of_offset(last_byte) + 1;
        debug!(%range, kind, start_line, end_line, "resolved enclosing declaration");

        Ok(ErrorContext::from_lines(lines, start_line, end_line))
    }

    fn name(&self) -> &'static str {
        "structural"
    }
}
