//! External formatter invocation after a patch is written.
//!
//! Formatting is best-effort: a missing executable or a non-zero exit is
//! reported to the caller, which keeps the patch either way.
//!
//! # Example
//!
//! ```no_run
//! use issue_patcher::format::FormatterCommand;
//! use std::path::Path;
//!
//! let formatter = FormatterCommand {
//!     program: "dotnet".to_string(),
//!     args: vec!["format".into(), "--include".into(), "{file}".into()],
//!     working_dir: None,
//! };
//! if let Err(e) = formatter.run(Path::new("src/Service.cs")) {
//!     eprintln!("formatter skipped: {e}");
//! }
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

/// Placeholder replaced by the patched file's path in formatter arguments.
pub const FILE_PLACEHOLDER: &str = "{file}";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormatterCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Directory to run the formatter in; defaults to the current directory
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("failed to spawn formatter '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("formatter '{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

impl FormatterCommand {
    /// Arguments with every `{file}` placeholder substituted.
    pub fn args_for(&self, file: &Path) -> Vec<String> {
        let file = file.display().to_string();
        self.args
            .iter()
            .map(|arg| arg.replace(FILE_PLACEHOLDER, &file))
            .collect()
    }

    /// Run the formatter on `file` and wait for it to finish.
    pub fn run(&self, file: &Path) -> Result<(), FormatError> {
        let args = self.args_for(file);
        let mut cmd = Command::new(&self.program);
        cmd.args(&args).stdout(Stdio::null()).stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        debug!(program = %self.program, ?args, "running formatter");
        let output = cmd.output().map_err(|source| FormatError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(FormatError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(program: &str, args: &[&str]) -> FormatterCommand {
        FormatterCommand {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            working_dir: None,
        }
    }

    #[test]
    fn substitutes_file_placeholder() {
        let cmd = command("dotnet", &["format", "--include", "{file}", "--verbosity=q"]);
        assert_eq!(
            cmd.args_for(Path::new("src/A.cs")),
            vec!["format", "--include", "src/A.cs", "--verbosity=q"]
        );
    }

    #[test]
    fn missing_executable_is_spawn_error() {
        let cmd = command("definitely-not-a-formatter-binary", &["{file}"]);
        assert!(matches!(
            cmd.run(Path::new("A.cs")),
            Err(FormatError::Spawn { .. })
        ));
    }

    #[test]
    #[cfg(unix)]
    fn exit_status_is_checked() {
        assert!(command("true", &[]).run(Path::new("A.cs")).is_ok());
        assert!(matches!(
            command("false", &[]).run(Path::new("A.cs")),
            Err(FormatError::Failed { .. })
        ));
    }
}
