//! Issue records delivered by the analysis service.

use crate::range::TextRange;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One reported defect location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub key: String,
    pub rule: String,
    #[serde(default)]
    pub severity: Option<String>,
    /// `<project>:<path/inside/project>`
    pub component: String,
    pub project: String,
    #[serde(default)]
    pub line: Option<usize>,
    #[serde(default)]
    pub text_range: Option<TextRange>,
    #[serde(default)]
    pub message: String,
}

impl Issue {
    /// Path of the flagged file relative to the project root.
    pub fn relative_path(&self) -> PathBuf {
        let component = self.component.as_str();
        let relative = component
            .strip_prefix(self.project.as_str())
            .and_then(|rest| rest.strip_prefix(':'))
            .or_else(|| component.split_once(':').map(|(_, path)| path))
            .unwrap_or(component);
        PathBuf::from(relative)
    }
}

/// Search response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueReport {
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

#[derive(Error, Debug)]
pub enum IssueError {
    #[error("failed to read issues from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse issue report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a report, accepting either the response envelope or a bare array.
pub fn parse_issues(input: &str) -> Result<Vec<Issue>, IssueError> {
    if input.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(input)?);
    }
    let report: IssueReport = serde_json::from_str(input)?;
    Ok(report.issues)
}

pub fn load_issues(path: impl AsRef<Path>) -> Result<Vec<Issue>, IssueError> {
    let path = path.as_ref();
    let input = fs::read_to_string(path).map_err(|source| IssueError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_issues(&input)
}

/// Project and rule allow-lists. An empty list allows everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IssueFilter {
    #[serde(default)]
    pub projects: HashSet<String>,
    #[serde(default)]
    pub rules: HashSet<String>,
}

impl IssueFilter {
    pub fn allows(&self, issue: &Issue) -> bool {
        let project_ok = self.projects.is_empty() || self.projects.contains(&issue.project);
        let rule_ok = self.rules.is_empty() || self.rules.contains(&issue.rule);
        project_ok && rule_ok
    }

    pub fn apply<'a>(&'a self, issues: &'a [Issue]) -> impl Iterator<Item = &'a Issue> + 'a {
        issues.iter().filter(move |issue| self.allows(issue))
    }
}

/// Keep the first issue of every file, preserving report order.
///
/// Each patch shifts line numbers below it, so later issues in the same file
/// hold stale spans until the file is analysed again.
pub fn one_per_file<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Vec<&'a Issue> {
    let mut seen = HashSet::new();
    issues
        .into_iter()
        .filter(|&issue| seen.insert(issue.component.as_str()))
        .collect()
}
