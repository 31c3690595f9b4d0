//! `mposix.toml` configuration.
//!
//! ```toml
//! [errors]
//! raise = true
//! suppress = ["exists", "lexists"]
//!
//! [directories]
//! max_open = 256
//!
//! [log]
//! filter = "mposix=info"
//! ```
//!
//! Every section and field is optional.

use std::path::Path;

use mposix_core::MAX_OPEN_DIRS;
use serde::{Deserialize, Serialize};

use crate::error::{HostError, HostResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MposixConfig {
    pub errors: ErrorsConfig,
    pub directories: DirectoriesConfig,
    pub log: LogConfig,
}

/// Conversion of failed status-bearing calls into raised errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorsConfig {
    pub raise: bool,
    /// Operations whose failures are returned as plain status codes.
    pub suppress: Vec<String>,
}

impl Default for ErrorsConfig {
    fn default() -> Self {
        Self {
            raise: true,
            suppress: vec!["exists".to_string(), "lexists".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoriesConfig {
    pub max_open: usize,
}

impl Default for DirectoriesConfig {
    fn default() -> Self {
        Self {
            max_open: MAX_OPEN_DIRS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "mposix=info".to_string(),
        }
    }
}

impl MposixConfig {
    pub fn from_file(path: &Path) -> HostResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> HostResult<Self> {
        let config: MposixConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> HostResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The directory ceiling may be lowered, never raised.
    pub fn validate(&self) -> HostResult<()> {
        let max_open = self.directories.max_open;
        if max_open == 0 || max_open > MAX_OPEN_DIRS {
            return Err(HostError::Config(format!(
                "directories.max_open must be between 1 and {MAX_OPEN_DIRS}, got {max_open}"
            )));
        }
        Ok(())
    }
}
