use std::ops::Range;

/// Line terminator convention of a source file.
///
/// Existing lines always keep their own terminators; this is the one used for
/// text the tool inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Detect the dominant convention of `text`.
    ///
    /// CRLF wins only when it terminates more lines than bare LF; a file with
    /// no terminator at all is LF.
    pub fn detect(text: &str) -> Self {
        let crlf = text.matches("\r\n").count();
        let lf = text.matches('\n').count() - crlf;
        if crlf > lf {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// Rewrite every terminator in `text` (LF, CRLF or a lone CR) to this ending.
    pub fn normalize(self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    out.push_str(self.as_str());
                }
                '\n' => out.push_str(self.as_str()),
                other => out.push(other),
            }
        }
        out
    }
}

/// Ordered physical lines of a source file, borrowed from the file text.
///
/// Lines are split on `\n`; a `\r` directly before it belongs to the
/// terminator. Each line keeps its own terminator, so files mixing CRLF and
/// LF keep one entry per physical line and rejoin byte for byte.
///
/// Never mutated after construction; splicing builds a new string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSequence<'a> {
    source: &'a str,
    /// Dominant ending, used for text inserted by callers
    ending: LineEnding,
    lines: Vec<&'a str>,
    /// Terminator after each line; empty for the last one.
    terminators: Vec<&'a str>,
    /// Byte offset at which each line starts.
    starts: Vec<usize>,
}

impl<'a> LineSequence<'a> {
    /// Split `text` into physical lines.
    ///
    /// Empty text yields a single empty line and a trailing terminator yields
    /// a trailing empty line, so [`LineSequence::join_all`] reproduces `text`.
    pub fn split(text: &'a str) -> Self {
        let mut lines = Vec::new();
        let mut terminators = Vec::new();
        let mut starts = Vec::new();

        let mut offset = 0;
        while let Some(newline) = text[offset..].find('\n').map(|i| offset + i) {
            let content_end = if text[offset..newline].ends_with('\r') {
                newline - 1
            } else {
                newline
            };
            starts.push(offset);
            lines.push(&text[offset..content_end]);
            terminators.push(&text[content_end..=newline]);
            offset = newline + 1;
        }
        starts.push(offset);
        lines.push(&text[offset..]);
        terminators.push("");

        Self {
            source: text,
            ending: LineEnding::detect(text),
            lines,
            terminators,
            starts,
        }
    }

    /// The full text the lines were split from.
    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn ending(&self) -> LineEnding {
        self.ending
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always false: even empty text has one (empty) line.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.lines.get(index).copied()
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// Terminator that ends line `index` (`"\r\n"`, `"\n"` or empty).
    pub fn terminator(&self, index: usize) -> &'a str {
        self.terminators.get(index).copied().unwrap_or_default()
    }

    /// Byte offset just past the content of line `index`, before its terminator.
    pub fn line_end_offset(&self, index: usize) -> usize {
        match self.lines.get(index) {
            Some(line) => self.starts[index] + line.len(),
            None => self.source.len(),
        }
    }

    /// Byte offset in the original text at which line `index` starts.
    ///
    /// Indices past the end resolve to the total text length.
    pub fn line_start_offset(&self, index: usize) -> usize {
        self.starts
            .get(index)
            .copied()
            .unwrap_or(self.source.len())
    }

    /// Index of the line containing byte `offset`.
    ///
    /// Offsets inside a terminator belong to the line it ends; offsets past
    /// the end belong to the last line.
    pub fn line_of_offset(&self, offset: usize) -> usize {
        self.starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    /// Text of the lines in `range` with their original inner terminators.
    ///
    /// The range is clamped to the sequence. The last line's terminator is
    /// not included.
    pub fn join_range(&self, range: Range<usize>) -> String {
        let end = range.end.min(self.lines.len());
        let start = range.start.min(end);
        if start == end {
            return String::new();
        }
        self.source[self.starts[start]..self.line_end_offset(end - 1)].to_string()
    }

    /// Reassemble the full text.
    pub fn join_all(&self) -> String {
        self.join_range(0..self.lines.len())
    }
}
