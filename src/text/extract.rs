use crate::context::ResolveError;
use crate::range::TextRange;
use crate::text::lines::LineSequence;

/// Return the exact text an issue span denotes.
///
/// This is prompt material only; the splicer never writes it back.
///
/// Single-line spans clamp the line into the file, and a blank line is
/// returned verbatim because offsets recorded against stale content are
/// meaningless there. Multi-line spans take the suffix of the first line,
/// every interior line and the prefix of the last line, joined by the
/// terminators the file actually has between them. An end line past the end
/// of the file is clamped to the last line, which is then taken whole.
pub fn extract_span(lines: &LineSequence<'_>, range: &TextRange) -> Result<String, ResolveError> {
    range.validate()?;

    if range.is_single_line() {
        let index = (range.start_line - 1).min(lines.len().saturating_sub(1));
        let line = lines.get(index).unwrap_or_default();
        if line.trim().is_empty() {
            return Ok(line.to_string());
        }
        let start = byte_index(line, range.start_offset, index + 1)?;
        let end = byte_index(line, range.end_offset, index + 1)?;
        return Ok(line[start..end].to_string());
    }

    let first = line_at(lines, range.start_line)?;
    let start = lines.line_start_offset(range.start_line - 1)
        + byte_index(first, range.start_offset, range.start_line)?;

    let end = if range.end_line > lines.len() {
        lines.line_end_offset(lines.len() - 1)
    } else {
        let last = line_at(lines, range.end_line)?;
        lines.line_start_offset(range.end_line - 1)
            + byte_index(last, range.end_offset, range.end_line)?
    };

    Ok(lines.source()[start..end.max(start)].to_string())
}

/// Fetch a 1-based line, failing when the file is shorter than the span.
fn line_at<'a>(lines: &LineSequence<'a>, line: usize) -> Result<&'a str, ResolveError> {
    lines
        .get(line - 1)
        .ok_or(ResolveError::LineOutOfBounds {
            line,
            line_count: lines.len(),
        })
}

/// Convert a character column into a byte index within `line`.
fn byte_index(line: &str, offset: usize, line_number: usize) -> Result<usize, ResolveError> {
    let out_of_bounds = || ResolveError::OffsetOutOfBounds {
        line: line_number,
        offset,
        line_len: line.chars().count(),
    };

    if offset == 0 {
        return Ok(0);
    }
    match line.char_indices().nth(offset) {
        Some((index, _)) => Ok(index),
        None if line.chars().count() == offset => Ok(line.len()),
        None => Err(out_of_bounds()),
    }
}
