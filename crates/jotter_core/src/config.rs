//! Engine configuration inputs.
//!
//! The embedding front end supplies paths at startup; the engine reads no
//! environment state itself.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Validated engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Directory holding the note files.
    pub store_root: PathBuf,
    /// Optional directory of custom template schemas consulted before the
    /// built-in set.
    pub template_root: Option<PathBuf>,
}

impl EngineConfig {
    /// Builds a configuration rooted at an existing store directory.
    pub fn new(store_root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let store_root = store_root.into();
        if !store_root.exists() {
            return Err(ConfigError::MissingStoreRoot(store_root));
        }
        if !store_root.is_dir() {
            return Err(ConfigError::NotADirectory(store_root));
        }
        Ok(Self {
            store_root,
            template_root: None,
        })
    }

    /// Adds a custom template root.
    pub fn with_template_root(mut self, root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ConfigError::NotADirectory(root));
        }
        self.template_root = Some(root);
        Ok(self)
    }

    pub fn template_root(&self) -> Option<&Path> {
        self.template_root.as_deref()
    }
}

/// Configuration validation failures.
#[derive(Debug)]
pub enum ConfigError {
    MissingStoreRoot(PathBuf),
    NotADirectory(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingStoreRoot(path) => {
                write!(f, "store root `{}` does not exist", path.display())
            }
            Self::NotADirectory(path) => {
                write!(f, "`{}` is not a directory", path.display())
            }
        }
    }
}

impl Error for ConfigError {}
