//! Error types for encounter mutations

use thiserror::Error;

/// Rejected user input on an entity or status mutation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("entity name must not be empty")]
    EmptyName,

    #[error("status effect name must not be empty")]
    EmptyStatusName,
}
