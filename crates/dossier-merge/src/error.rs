//! Merge error types

use thiserror::Error;

/// Errors that can occur during merge operations
#[derive(Error, Debug)]
pub enum MergeError {
    /// Store error during a merge or resolution
    #[error("Store error: {0}")]
    Store(String),

    /// No conflict with the given id is queued
    #[error("Conflict not found: {0}")]
    ConflictNotFound(String),

    /// Resolution outcome that cannot be applied
    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),

    /// The fact a conflict refers to no longer exists
    #[error("Fact referenced by conflict is missing: {0}")]
    FactMissing(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error while saving or loading the conflict queue
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Conflict queue could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MergeError {
    /// Wrap any displayable store error
    pub fn store(error: impl std::fmt::Display) -> Self {
        MergeError::Store(error.to_string())
    }
}
