//! Rebuilding a file around a replaced context.

use crate::context::ErrorContext;
use crate::text::LineSequence;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpliceError {
    #[error("context lines [{start_line}, {end_line}) do not fit a file of {line_count} lines")]
    InvalidContext {
        start_line: usize,
        end_line: usize,
        line_count: usize,
    },
}

/// Replace lines `[context.start_line, context.end_line)` with `replacement`.
///
/// Bytes outside the context are copied from the original text, so every
/// untouched line keeps its own terminator even in files that mix endings.
/// The replacement is inserted as-is; its internal terminators should already
/// match the file (see
/// [`LineEnding::normalize`](crate::text::LineEnding::normalize)).
pub fn splice(
    lines: &LineSequence<'_>,
    context: &ErrorContext,
    replacement: &str,
) -> Result<String, SpliceError> {
    let line_count = lines.len();
    if context.start_line > context.end_line || context.end_line > line_count {
        return Err(SpliceError::InvalidContext {
            start_line: context.start_line,
            end_line: context.end_line,
            line_count,
        });
    }

    let source = lines.source();
    let ending = lines.ending().as_str();
    let mut out = String::with_capacity(source.len() + replacement.len());

    if context.start_line == context.end_line {
        // Empty context: the replacement becomes lines of its own.
        if context.start_line == line_count {
            out.push_str(source);
            out.push_str(ending);
            out.push_str(replacement);
        } else {
            let at = lines.line_start_offset(context.start_line);
            out.push_str(&source[..at]);
            out.push_str(replacement);
            out.push_str(ending);
            out.push_str(&source[at..]);
        }
        return Ok(out);
    }

    out.push_str(&source[..lines.line_start_offset(context.start_line)]);
    out.push_str(replacement);
    out.push_str(&source[lines.line_end_offset(context.end_line - 1)..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(lines: &LineSequence<'_>, start: usize, end: usize) -> ErrorContext {
        ErrorContext::from_lines(lines, start, end)
    }

    #[test]
    fn replaces_only_the_context_lines() {
        let text = "a\nb\nc\nd\ne";
        let lines = LineSequence::split(text);
        let out = splice(&lines, &context(&lines, 1, 3), "X\nY\nZ").unwrap();
        assert_eq!(out, "a\nX\nY\nZ\nd\ne");
    }

    #[test]
    fn own_context_round_trips() {
        let text = "line one\r\n  two\r\n\r\nfour\r\n";
        let lines = LineSequence::split(text);
        for start in 0..lines.len() {
            for end in start + 1..=lines.len() {
                let ctx = context(&lines, start, end);
                assert_eq!(splice(&lines, &ctx, &ctx.context).unwrap(), text);
            }
        }
    }

    #[test]
    fn replacement_at_file_edges() {
        let lines = LineSequence::split("a\nb\nc");
        assert_eq!(splice(&lines, &context(&lines, 0, 1), "A").unwrap(), "A\nb\nc");
        assert_eq!(splice(&lines, &context(&lines, 2, 3), "C").unwrap(), "a\nb\nC");
        assert_eq!(splice(&lines, &context(&lines, 0, 3), "all").unwrap(), "all");
    }

    #[test]
    fn crlf_untouched_lines_keep_crlf() {
        let lines = LineSequence::split("a\r\nb\r\nc\r\n");
        let out = splice(&lines, &context(&lines, 1, 2), "B").unwrap();
        assert_eq!(out, "a\r\nB\r\nc\r\n");
    }

    #[test]
    fn mixed_endings_survive_outside_context() {
        let text = "using System;\r\nclass A\n{\r\n    void M() { }\n}\n";
        let lines = LineSequence::split(text);
        let out = splice(&lines, &context(&lines, 3, 4), "    void M() { Run(); }").unwrap();
        assert_eq!(
            out,
            "using System;\r\nclass A\n{\r\n    void M() { Run(); }\n}\n"
        );
    }

    #[test]
    fn empty_context_inserts_lines() {
        let lines = LineSequence::split("a\nb");
        let at_start = ErrorContext {
            start_line: 0,
            end_line: 0,
            context: String::new(),
        };
        assert_eq!(splice(&lines, &at_start, "x").unwrap(), "x\na\nb");
        let at_end = ErrorContext {
            start_line: 2,
            end_line: 2,
            context: String::new(),
        };
        assert_eq!(splice(&lines, &at_end, "x").unwrap(), "a\nb\nx");
    }

    #[test]
    fn shrinking_and_growing_replacements() {
        let lines = LineSequence::split("h\n1\n2\n3\nt");
        assert_eq!(splice(&lines, &context(&lines, 1, 4), "n").unwrap(), "h\nn\nt");
        assert_eq!(
            splice(&lines, &context(&lines, 1, 2), "1a\n1b\n1c").unwrap(),
            "h\n1a\n1b\n1c\n2\n3\nt"
        );
    }

    #[test]
    fn rejects_context_from_a_longer_file() {
        let lines = LineSequence::split("a\nb");
        let ctx = ErrorContext {
            start_line: 1,
            end_line: 5,
            context: String::new(),
        };
        assert_eq!(
            splice(&lines, &ctx, "x"),
            Err(SpliceError::InvalidContext {
                start_line: 1,
                end_line: 5,
                line_count: 2
            })
        );
    }
}
