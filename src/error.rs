// ⚠️ Error Types - one enum for every recoverable failure in the demo
//
// The demo has no real failure domain (no network, no untrusted parsing).
// What can go wrong is a stale key, a double click, or an incomplete form.

use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandCenterError {
    /// A selection referenced a key that is not in the catalog
    #[error("unknown {kind}: '{key}'")]
    UnknownKey { kind: &'static str, key: String },

    /// A run was requested while the previous one is still animating
    #[error("{0} is already running")]
    Busy(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Required selections are missing
    #[error("incomplete selection: {0}")]
    Incomplete(String),

    #[error("selection limit reached: at most {max} items")]
    SelectionLimit { max: usize },

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CommandCenterError {
    pub fn unknown(kind: &'static str, key: impl Into<String>) -> Self {
        CommandCenterError::UnknownKey {
            kind,
            key: key.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        CommandCenterError::InvalidInput(message.into())
    }
}

pub type Result<T> = std::result::Result<T, CommandCenterError>;
