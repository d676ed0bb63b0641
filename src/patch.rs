use crate::context::ErrorContext;
use crate::splice::{splice, SpliceError};
use crate::text::LineSequence;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use xxhash_rust::xxh3::xxh3_64;

/// A context replacement bound to a file on disk.
///
/// The context text captured at resolution time is re-checked against the
/// file before writing, so a file edited in between is never clobbered.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "FilePatch does nothing until apply() is called"]
pub struct FilePatch {
    pub file: PathBuf,
    /// First replaced line (0-based, inclusive)
    pub start_line: usize,
    /// End of the replaced lines (0-based, exclusive)
    pub end_line: usize,
    pub replacement: String,
    /// What the context lines must contain before the patch applies
    pub expected: ContextVerification,
}

/// Verification strategy for the context lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (faster for large contexts)
    Hash(u64),
}

impl ContextVerification {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            ContextVerification::ExactMatch(expected) => text == expected,
            ContextVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            ContextVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            ContextVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("context of {file} lines {start_line}..{end_line} changed since it was resolved")]
    ContextMismatch {
        file: PathBuf,
        start_line: usize,
        end_line: usize,
        found: String,
    },

    #[error(transparent)]
    Splice(#[from] SpliceError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("UTF-8 validation error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Outcome of applying a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "PatchOutcome should be checked for applied/already-applied"]
pub enum PatchOutcome {
    Applied {
        file: PathBuf,
        lines_removed: usize,
        lines_inserted: usize,
    },
    /// The context lines already hold the replacement
    AlreadyApplied { file: PathBuf },
}

impl FilePatch {
    /// Bind a replacement to a resolved context.
    pub fn new(file: impl Into<PathBuf>, context: &ErrorContext, replacement: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            start_line: context.start_line,
            end_line: context.end_line,
            replacement: replacement.into(),
            expected: ContextVerification::from_text(&context.context),
        }
    }

    fn as_context(&self) -> ErrorContext {
        ErrorContext {
            start_line: self.start_line,
            end_line: self.end_line,
            context: String::new(),
        }
    }

    /// Compute the patched text for `original` without touching disk.
    ///
    /// Returns `None` when the patch is already applied: either the context
    /// lines already equal the replacement, or the replacement text sits at
    /// the context start even though the line count has since changed.
    pub fn preview(&self, original: &str) -> Result<Option<String>, PatchError> {
        let lines = LineSequence::split(original);
        let in_bounds = self.start_line <= self.end_line && self.end_line <= lines.len();

        if in_bounds {
            let current = lines.join_range(self.start_line..self.end_line);
            if current == self.replacement {
                return Ok(None);
            }
            if self.expected.matches(&current) {
                return Ok(Some(splice(&lines, &self.as_context(), &self.replacement)?));
            }
        }

        if self.is_applied_in(&lines) {
            debug!(file = %self.file.display(), start_line = self.start_line, "replacement already in place");
            return Ok(None);
        }

        if !in_bounds {
            return Err(SpliceError::InvalidContext {
                start_line: self.start_line,
                end_line: self.end_line,
                line_count: lines.len(),
            }
            .into());
        }
        Err(PatchError::ContextMismatch {
            file: self.file.clone(),
            start_line: self.start_line,
            end_line: self.end_line,
            found: lines.join_range(self.start_line..self.end_line),
        })
    }

    /// Whether the replacement occupies whole lines starting at the context start.
    fn is_applied_in(&self, lines: &LineSequence<'_>) -> bool {
        if self.start_line >= lines.len() {
            return false;
        }
        let rest = &lines.source()[lines.line_start_offset(self.start_line)..];
        match rest.strip_prefix(self.replacement.as_str()) {
            Some(after) => after.is_empty() || after.starts_with('\n') || after.starts_with("\r\n"),
            None => false,
        }
    }

    /// Apply the patch to the file atomically.
    ///
    /// Uses tempfile + fsync + rename for crash safety.
    pub fn apply(&self) -> Result<PatchOutcome, PatchError> {
        let original = String::from_utf8(fs::read(&self.file)?)?;

        let Some(patched) = self.preview(&original)? else {
            return Ok(PatchOutcome::AlreadyApplied {
                file: self.file.clone(),
            });
        };

        atomic_write(&self.file, patched.as_bytes())?;

        // Tools watching mtime (IDEs, incremental builds) must see the change.
        filetime::set_file_mtime(&self.file, filetime::FileTime::now())?;

        let lines_inserted = LineSequence::split(&self.replacement).len();
        info!(
            file = %self.file.display(),
            start_line = self.start_line,
            end_line = self.end_line,
            lines_inserted,
            "patch applied"
        );

        Ok(PatchOutcome::Applied {
            file: self.file.clone(),
            lines_removed: self.end_line - self.start_line,
            lines_inserted,
        })
    }
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or nothing changes.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), PatchError> {
    // Same directory keeps the rename on one filesystem.
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => {
            return Err(PatchError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            )))
        }
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGINAL: &str = "class A\n{\n    void M()\n    {\n        old();\n    }\n}\n";

    fn method_context() -> ErrorContext {
        let lines = LineSequence::split(ORIGINAL);
        ErrorContext::from_lines(&lines, 2, 6)
    }

    #[test]
    fn verification_exact_and_hash() {
        let verify = ContextVerification::from_text("small");
        assert!(matches!(verify, ContextVerification::ExactMatch(_)));
        assert!(verify.matches("small"));
        assert!(!verify.matches("smaller"));

        let large = "x".repeat(2000);
        let verify = ContextVerification::from_text(&large);
        assert!(matches!(verify, ContextVerification::Hash(_)));
        assert!(verify.matches(&large));
        assert!(!verify.matches("x"));
    }

    #[test]
    fn preview_replaces_context() {
        let patch = FilePatch::new("A.cs", &method_context(), "    void M() => fresh();");
        let out = patch.preview(ORIGINAL).unwrap().unwrap();
        assert_eq!(out, "class A\n{\n    void M() => fresh();\n}\n");
    }

    #[test]
    fn preview_detects_stale_context() {
        let patch = FilePatch::new("A.cs", &method_context(), "    void M() => fresh();");
        let edited = ORIGINAL.replace("old()", "older()");
        assert!(matches!(
            patch.preview(&edited),
            Err(PatchError::ContextMismatch { .. })
        ));
    }

    #[test]
    fn preview_rejects_truncated_file() {
        let patch = FilePatch::new("A.cs", &method_context(), "x");
        assert!(matches!(
            patch.preview("class A\n{"),
            Err(PatchError::Splice(SpliceError::InvalidContext { .. }))
        ));
    }

    #[test]
    fn apply_writes_and_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("A.cs");
        fs::write(&file_path, ORIGINAL).unwrap();

        let patch = FilePatch::new(&file_path, &method_context(), "    void M() => fresh();");
        let outcome = patch.apply().unwrap();
        assert_eq!(
            outcome,
            PatchOutcome::Applied {
                file: file_path.clone(),
                lines_removed: 4,
                lines_inserted: 1,
            }
        );
        assert_eq!(
            fs::read_to_string(&file_path).unwrap(),
            "class A\n{\n    void M() => fresh();\n}\n"
        );

        // The file is now a line shorter than the recorded context, but the
        // replacement is already in place.
        assert_eq!(
            patch.apply().unwrap(),
            PatchOutcome::AlreadyApplied {
                file: file_path.clone()
            }
        );
        assert_eq!(
            fs::read_to_string(&file_path).unwrap(),
            "class A\n{\n    void M() => fresh();\n}\n"
        );
    }

    #[test]
    fn growing_patch_reapplies_as_no_op() {
        let grown = "    void M()\n    {\n        fresh();\n        fresher();\n    }";
        let patch = FilePatch::new("A.cs", &method_context(), grown);
        let patched = patch.preview(ORIGINAL).unwrap().unwrap();
        assert_eq!(patch.preview(&patched).unwrap(), None);
    }

    #[test]
    fn partial_line_match_is_not_applied() {
        let patch = FilePatch::new("A.cs", &method_context(), "    void M() => fresh();");
        let edited = "class A\n{\n    void M() => fresh();  // tweak\n}\n";
        assert!(patch.preview(edited).is_err());
    }

    #[test]
    fn apply_same_text_is_already_applied() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("A.cs");
        fs::write(&file_path, ORIGINAL).unwrap();

        let ctx = method_context();
        let patch = FilePatch::new(&file_path, &ctx, ctx.context.clone());
        assert!(matches!(
            patch.apply().unwrap(),
            PatchOutcome::AlreadyApplied { .. }
        ));
        assert_eq!(fs::read_to_string(&file_path).unwrap(), ORIGINAL);
    }
}
