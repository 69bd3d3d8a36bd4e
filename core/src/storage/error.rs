//! Error types for key-value storage

use std::path::PathBuf;
use thiserror::Error;

/// Errors from a key-value store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize snapshot")]
    Serialize(#[from] serde_json::Error),
}
