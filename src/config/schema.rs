use crate::context::{BoundaryFilter, HeuristicExpander, ResolveError, Strategy};
use crate::context::{DEFAULT_PADDING, DEFAULT_SIGNATURE};
use crate::format::FormatterCommand;
use crate::issue::IssueFilter;
use crate::reply::{ReplyCheck, DEFAULT_MARKER, DEFAULT_MIN_LINE_RATIO};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct FixerConfig {
    /// Checkout that issue paths are resolved against
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,
    #[serde(default)]
    pub filter: IssueFilter,
    #[serde(default)]
    pub context: ContextSettings,
    #[serde(default)]
    pub reply: ReplySettings,
    #[serde(default)]
    pub formatter: Option<FormatterCommand>,
}

fn default_source_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for FixerConfig {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            filter: IssueFilter::default(),
            context: ContextSettings::default(),
            reply: ReplySettings::default(),
            formatter: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ContextSettings {
    pub strategy: Strategy,
    pub padding: usize,
    pub trim_boundary_noise: bool,
    pub signature_pattern: String,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            strategy: Strategy::Auto,
            padding: DEFAULT_PADDING,
            trim_boundary_noise: false,
            signature_pattern: DEFAULT_SIGNATURE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReplySettings {
    pub marker: String,
    pub min_line_ratio: f64,
}

impl Default for ReplySettings {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            min_line_ratio: DEFAULT_MIN_LINE_RATIO,
        }
    }
}

impl FixerConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.source_root.as_os_str().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "source_root",
            });
        }

        if let Err(error) = regex::Regex::new(&self.context.signature_pattern) {
            issues.push(ValidationIssue::InvalidValue {
                field: "context.signature_pattern",
                message: error.to_string(),
            });
        }

        if self.reply.marker.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "reply.marker",
            });
        }
        if !(0.0..=1.0).contains(&self.reply.min_line_ratio) {
            issues.push(ValidationIssue::InvalidValue {
                field: "reply.min_line_ratio",
                message: format!("{} is not within 0.0..=1.0", self.reply.min_line_ratio),
            });
        }

        if let Some(formatter) = &self.formatter {
            if formatter.program.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    field: "formatter.program",
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Heuristic expander built from the `[context]` section.
    pub fn heuristic_expander(&self) -> Result<HeuristicExpander, ResolveError> {
        let expander =
            HeuristicExpander::new(&self.context.signature_pattern, self.context.padding)?;
        Ok(if self.context.trim_boundary_noise {
            expander.with_boundary_filter(BoundaryFilter)
        } else {
            expander
        })
    }

    pub fn reply_check(&self) -> ReplyCheck {
        ReplyCheck {
            marker: self.reply.marker.clone(),
            min_line_ratio: self.reply.min_line_ratio,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingField { field: &'static str },
    InvalidValue { field: &'static str, message: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { field } => {
                write!(f, "missing required value for '{field}'")
            }
            ValidationIssue::InvalidValue { field, message } => {
                write!(f, "invalid value for '{field}': {message}")
            }
        }
    }
}
