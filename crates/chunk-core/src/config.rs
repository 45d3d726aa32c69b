//! Patcher configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::host::UndoBehavior;
use crate::scan::DEFAULT_MAX_DEPTH;

/// Settings shared by every session.
///
/// ```toml
/// max_depth = 64
/// verify_before_commit = true
/// undo = "add-undo-point"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatcherConfig {
    /// Deepest block nesting accepted before the chunk counts as malformed
    pub max_depth: usize,
    /// Re-read the host object on commit and refuse to overwrite changes
    /// made since the session started
    pub verify_before_commit: bool,
    /// Undo behavior used by callers that do not pick one explicitly
    pub undo: UndoBehavior,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            verify_before_commit: true,
            undo: UndoBehavior::AddUndoPoint,
        }
    }
}

impl PatcherConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::Config("max_depth must be at least 1".into()));
        }
        Ok(())
    }
}
