//! Host-side error types.

use thiserror::Error;

/// Errors surfaced by the host calling convention.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// A status-bearing call failed and the error policy raises it.
    #[error("{operation}: {message} (errno {errno})")]
    Raised {
        operation: String,
        errno: i32,
        message: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("manifest serialization error: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl HostError {
    /// The status code carried by a raised error.
    pub fn errno(&self) -> Option<i32> {
        match self {
            HostError::Raised { errno, .. } => Some(*errno),
            _ => None,
        }
    }
}

pub type HostResult<T> = Result<T, HostError>;
