//! Error types for content lookup

use std::path::PathBuf;
use thiserror::Error;

use crate::codec::ParseError;

/// Errors while reading roster and encounter documents
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("content '{id}' not found")]
    MissingDocument { id: String },

    #[error("content '{id}' is not a usable entity list")]
    InvalidRoster {
        id: String,
        #[source]
        source: ParseError,
    },
}
