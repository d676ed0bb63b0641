//! Locating and reading the fixer config.
//!
//! A config comes from `--config`, else the file named by [`CONFIG_ENV`],
//! else the built-in defaults. Errors name the source that was used so a
//! stray environment variable is easy to spot.

use crate::config::schema::{FixerConfig, ValidationError};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming a config file when `--config` is absent.
pub const CONFIG_ENV: &str = "ISSUE_PATCHER_CONFIG";

/// Where config text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// `--config PATH` on the command line
    Flag(PathBuf),
    /// The file named by [`CONFIG_ENV`]
    Env(PathBuf),
    /// A file handed to [`load_from_path`]
    File(PathBuf),
    /// TOML text with no file behind it
    Inline,
}

impl ConfigOrigin {
    /// Pick the config file to read, if any. An empty variable counts as unset.
    pub fn select(explicit: Option<&Path>, env: Option<OsString>) -> Option<Self> {
        if let Some(path) = explicit {
            return Some(ConfigOrigin::Flag(path.to_path_buf()));
        }
        env.filter(|value| !value.is_empty())
            .map(|value| ConfigOrigin::Env(PathBuf::from(value)))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigOrigin::Flag(path) | ConfigOrigin::Env(path) | ConfigOrigin::File(path) => {
                Some(path)
            }
            ConfigOrigin::Inline => None,
        }
    }

    fn fail(self, kind: ConfigErrorKind) -> ConfigError {
        ConfigError { origin: self, kind }
    }
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::Flag(path) => write!(f, "--config {}", path.display()),
            ConfigOrigin::Env(path) => write!(f, "${}={}", CONFIG_ENV, path.display()),
            ConfigOrigin::File(path) => write!(f, "{}", path.display()),
            ConfigOrigin::Inline => f.write_str("inline config"),
        }
    }
}

/// A config that could not be loaded, with the source it came from.
#[derive(Debug)]
pub struct ConfigError {
    pub origin: ConfigOrigin,
    pub kind: ConfigErrorKind,
}

#[derive(Debug)]
pub enum ConfigErrorKind {
    Read(std::io::Error),
    Parse(toml_edit::de::Error),
    Invalid(ValidationError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = &self.origin;
        match &self.kind {
            ConfigErrorKind::Read(e) => write!(f, "cannot read config ({origin}): {e}"),
            ConfigErrorKind::Parse(e) => write!(f, "config ({origin}) is not valid TOML: {e}"),
            ConfigErrorKind::Invalid(e) => write!(f, "config ({origin}) rejected: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ConfigErrorKind::Read(e) => Some(e),
            ConfigErrorKind::Parse(e) => Some(e),
            ConfigErrorKind::Invalid(e) => Some(e),
        }
    }
}

fn parse(origin: ConfigOrigin, input: &str) -> Result<FixerConfig, ConfigError> {
    let config: FixerConfig = match toml_edit::de::from_str(input) {
        Ok(config) => config,
        Err(e) => return Err(origin.fail(ConfigErrorKind::Parse(e))),
    };
    if let Err(e) = config.validate() {
        return Err(origin.fail(ConfigErrorKind::Invalid(e)));
    }
    debug!(%origin, source_root = %config.source_root.display(), "config loaded");
    Ok(config)
}

fn read(origin: ConfigOrigin) -> Result<FixerConfig, ConfigError> {
    let Some(path) = origin.path() else {
        return Ok(FixerConfig::default());
    };
    match fs::read_to_string(path) {
        Ok(contents) => parse(origin, &contents),
        Err(e) => Err(origin.fail(ConfigErrorKind::Read(e))),
    }
}

/// Parse and validate config TOML held in memory.
pub fn load_from_str(input: &str) -> Result<FixerConfig, ConfigError> {
    parse(ConfigOrigin::Inline, input)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<FixerConfig, ConfigError> {
    read(ConfigOrigin::File(path.as_ref().to_path_buf()))
}

/// Load `explicit` if given, else the file named by [`CONFIG_ENV`], else
/// defaults.
pub fn load(explicit: Option<&Path>) -> Result<FixerConfig, ConfigError> {
    match ConfigOrigin::select(explicit, std::env::var_os(CONFIG_ENV)) {
        Some(origin) => read(origin),
        None => {
            debug!("no config file, using defaults");
            Ok(FixerConfig::default())
        }
    }
}
