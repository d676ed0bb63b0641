use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Directory names whose contents are never patched: VCS metadata and build
/// output of the supported toolchains.
pub const FORBIDDEN_DIRS: &[&str] = &[".git", "bin", "obj", "target", "node_modules"];

/// Confines issue paths to the checked-out source tree.
#[derive(Debug, Clone)]
pub struct SourceRoot {
    /// Canonical absolute root
    root: PathBuf,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("Path is outside source root: {path} (root: {root})")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Path is in forbidden directory '{dir}': {path}")]
    ForbiddenPath { path: PathBuf, dir: String },

    #[error("Failed to canonicalize {path}: {source}")]
    Canonicalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn canonicalize(path: &Path) -> Result<PathBuf, SafetyError> {
    path.canonicalize().map_err(|source| SafetyError::Canonicalize {
        path: path.to_path_buf(),
        source,
    })
}

impl SourceRoot {
    /// The root is canonicalized so symlinked checkouts compare correctly.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        Ok(Self {
            root: canonicalize(root.as_ref())?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an issue path to the canonical file it names.
    ///
    /// Relative paths are joined onto the root. The file must exist, lie
    /// under the root after symlink resolution, and sit outside every
    /// [`FORBIDDEN_DIRS`] entry below the root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        let canonical = canonicalize(&absolute)?;
        let Ok(inside) = canonical.strip_prefix(&self.root) else {
            return Err(SafetyError::OutsideRoot {
                path: canonical,
                root: self.root.clone(),
            });
        };

        let forbidden = inside.components().find_map(|c| match c {
            Component::Normal(name) => FORBIDDEN_DIRS
                .iter()
                .find(|dir| name == OsStr::new(dir))
                .copied(),
            _ => None,
        });
        if let Some(dir) = forbidden {
            return Err(SafetyError::ForbiddenPath {
                path: canonical,
                dir: dir.to_string(),
            });
        }

        Ok(canonical)
    }
}
