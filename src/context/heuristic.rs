use crate::context::{ContextExpander, ErrorContext, ResolveError};
use crate::range::TextRange;
use crate::text::LineSequence;
use regex::Regex;
use tracing::debug;

/// Visibility keyword, a parameter list and an opening brace on one line.
pub const DEFAULT_SIGNATURE: &str =
    r"\b(public|private|internal|protected)\b[^()]*\([^()]*\)[ \t]*\{";

/// Lines added above and below the scanned bounds, to pick up attributes
/// over the declaration and closing braces under it.
pub const DEFAULT_PADDING: usize = 2;

/// Line-scan expander for files without a structural parser.
#[derive(Debug, Clone)]
pub struct HeuristicExpander {
    signature: Regex,
    padding: usize,
    filter: Option<BoundaryFilter>,
}

impl HeuristicExpander {
    pub fn new(signature: &str, padding: usize) -> Result<Self, ResolveError> {
        Ok(Self {
            signature: Regex::new(signature)?,
            padding,
            filter: None,
        })
    }

    /// Trim noise lines off both bounds before padding.
    pub fn with_boundary_filter(mut self, filter: BoundaryFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    fn is_signature(&self, line: &str) -> bool {
        self.signature.is_match(line)
    }

    /// Compute the `[lower, upper)` line bounds of the context.
    fn bounds(&self, lines: &LineSequence<'_>, range: &TextRange) -> (usize, usize) {
        let count = lines.len();
        let start = range.start_line.min(count);
        let end = range.end_line.min(count);
        let line = |i: usize| lines.get(i).unwrap_or_default();

        let lower = match (0..end).rev().find(|&i| self.is_signature(line(i))) {
            Some(found) => found.min(start),
            None => {
                debug!(%range, "no declaration signature above issue, keeping reported start");
                start
            }
        };

        let upper = match (start + 1..count).find(|&i| self.is_signature(line(i))) {
            Some(found) => found.max(end),
            None => {
                debug!(%range, "no declaration signature below issue, keeping reported end");
                end
            }
        };

        let (mut lower, mut upper) = (lower.min(count), upper.min(count));

        if let Some(filter) = &self.filter {
            (lower, upper) = filter.trim(lines, lower, upper);
        }

        lower = lower.saturating_sub(self.padding);
        upper = (upper + self.padding).min(count);

        if lower >= upper {
            // Always hand back at least one line.
            upper = upper.clamp(1, count);
            lower = upper - 1;
        }

        (lower, upper)
    }
}

impl Default for HeuristicExpander {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNATURE, DEFAULT_PADDING).expect("default signature pattern is valid")
    }
}

impl ContextExpander for HeuristicExpander {
    fn expand(
        &self,
        lines: &LineSequence<'_>,
        range: &TextRange,
    ) -> Result<ErrorContext, ResolveError> {
        range.validate()?;
        let (lower, upper) = self.bounds(lines, range);
        Ok(ErrorContext::from_lines(lines, lower, upper))
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

/// Boundary refinement that drops noise lines at either edge of a context.
///
/// A line is noise when it is blank, an attribute list, a `//--` separator
/// comment or a region marker. Any one of these suffices; ordinary `//`
/// comments often document the code below them and are kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryFilter;

impl BoundaryFilter {
    pub fn is_noise(&self, line: &str) -> bool {
        let trimmed = line.trim();
        let blank = trimmed.is_empty();
        let attribute = trimmed.starts_with('[') && trimmed.ends_with(']');
        let separator = trimmed.starts_with("//--");
        let region = trimmed.starts_with("#region") || trimmed.starts_with("#endregion");
        blank || attribute || separator || region
    }

    /// Shrink `[lower, upper)` past leading and trailing noise.
    ///
    /// A range made only of noise is returned unchanged.
    pub fn trim(&self, lines: &LineSequence<'_>, lower: usize, upper: usize) -> (usize, usize) {
        let keep = |i: &usize| !self.is_noise(lines.get(*i).unwrap_or_default());
        let Some(first) = (lower..upper).find(keep) else {
            return (lower, upper);
        };
        let last = (first..upper).rev().find(keep).unwrap_or(first);
        (first, last + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE: &str = "\
using System;

namespace Demo
{
    public class Service
    {
        public int Add(int a, int b) {
            var sum = a + b;
            return sum;
        }

        private void Log(string message) {
            Console.WriteLine(message);
        }
    }
}";

    fn expand(text: &str, range: TextRange) -> ErrorContext {
        let lines = LineSequence::split(text);
        HeuristicExpander::default().expand(&lines, &range).unwrap()
    }

    #[test]
    fn matches_declaration_signatures() {
        let expander = HeuristicExpander::default();
        assert!(expander.is_signature("    public int Add(int a, int b) {"));
        assert!(expander.is_signature("protected override void OnInit(EventArgs e){"));
        assert!(!expander.is_signature("    public class Service"));
        assert!(!expander.is_signature("    var publicValue = Compute(a) {"));
        assert!(!expander.is_signature("        Console.WriteLine(message);"));
    }

    #[test]
    fn widens_to_surrounding_signatures() {
        // Issue on `var sum = a + b;` (line 8).
        let ctx = expand(SERVICE, TextRange::new(8, 12, 8, 28));
        // Add's signature is index 6, Log's is index 11; padded by two.
        assert_eq!((ctx.start_line, ctx.end_line), (4, 13));
        assert!(ctx.context.starts_with("    public class Service"));
        assert!(ctx.context.contains("public int Add(int a, int b) {"));
        assert!(ctx.context.ends_with("            Console.WriteLine(message);"));
    }

    #[test]
    fn degrades_to_padded_range_without_signatures() {
        let text = (1..=30)
            .map(|i| format!("line {i};"))
            .collect::<Vec<_>>()
            .join("\n");
        let ctx = expand(&text, TextRange::new(10, 0, 12, 3));
        assert_eq!((ctx.start_line, ctx.end_line), (8, 14));
        assert_eq!(ctx.line_count(), 6);
    }

    #[test]
    fn clamps_range_past_end_of_file() {
        let ctx = expand("a\nb\nc", TextRange::new(2, 0, 40, 0));
        assert_eq!((ctx.start_line, ctx.end_line), (0, 3));
        assert_eq!(ctx.context, "a\nb\nc");
    }

    #[test]
    fn single_line_file_yields_that_line() {
        let ctx = expand("only", TextRange::new(5, 0, 5, 0));
        assert_eq!((ctx.start_line, ctx.end_line), (0, 1));
        assert_eq!(ctx.context, "only");
    }

    #[test]
    fn boundary_filter_uses_any_of() {
        let filter = BoundaryFilter;
        assert!(filter.is_noise("   "));
        assert!(filter.is_noise("    [HttpGet]"));
        assert!(filter.is_noise("    //-- helpers"));
        assert!(filter.is_noise("    #region Helpers"));
        assert!(!filter.is_noise("    [Test] public void A() {"));
        assert!(!filter.is_noise("    return x;"));
    }

    #[test]
    fn plain_comments_are_not_noise() {
        let filter = BoundaryFilter;
        assert!(!filter.is_noise("    // Computes the running total."));
        assert!(!filter.is_noise("    /// <summary>"));

        let lines = LineSequence::split("// header
int x;
// trailer");
        assert_eq!(filter.trim(&lines, 0, 3), (0, 3));
    }

    #[test]
    fn boundary_filter_trims_edges() {
        let lines = LineSequence::split("\n[Obsolete]\nint x;\nint y;\n//-- end\n\nint z;");
        assert_eq!(BoundaryFilter.trim(&lines, 0, 6), (2, 4));
        assert_eq!(BoundaryFilter.trim(&lines, 0, 2), (0, 2));
    }

    #[test]
    fn filtered_expander_skips_noise_before_padding() {
        let text = "a\nb\n\n//-- note\nwork();\n\n\nc\nd";
        let lines = LineSequence::split(text);
        let expander = HeuristicExpander::new(DEFAULT_SIGNATURE, 0)
            .unwrap()
            .with_boundary_filter(BoundaryFilter);
        let ctx = expander.expand(&lines, &TextRange::new(2, 0, 7, 0)).unwrap();
        assert_eq!(ctx.context, "work();");
    }

    #[test]
    fn repeated_expansion_is_identical() {
        let range = TextRange::new(13, 0, 13, 10);
        assert_eq!(expand(SERVICE, range), expand(SERVICE, range));
    }
}
