//! Error types for snapshot import

use thiserror::Error;

/// Errors while reading an imported or stored snapshot
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed snapshot")]
    Malformed(#[from] serde_json::Error),

    #[error("round must be at least 1")]
    InvalidRound,

    #[error("phase index {0} is outside 0..=3")]
    InvalidPhaseIndex(i64),

    #[error("expected a list of entities")]
    NotAnEntityList,
}
