pub mod loader;
pub mod schema;

pub use loader::{
    load, load_from_path, load_from_str, ConfigError, ConfigErrorKind, ConfigOrigin, CONFIG_ENV,
};
pub use schema::{ContextSettings, FixerConfig, ReplySettings, ValidationError, ValidationIssue};
