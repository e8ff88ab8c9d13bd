//! Store error types

use dossier_domain::{DomainError, Entity};
use thiserror::Error;

/// Errors that can occur during registry operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Entity outside the target/buyer enumeration
    #[error("Invalid entity: {0}")]
    InvalidEntity(String),

    /// Domain outside the configured domain set
    #[error("Invalid domain '{domain}': allowed domains are {allowed}")]
    InvalidDomain {
        /// Rejected domain
        domain: String,
        /// Comma-joined configured domains
        allowed: String,
    },

    /// Other malformed input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Write attempted after the entity's discovery was locked
    #[error("Entity '{0}' is locked: discovery is complete and no further facts may be added")]
    EntityLocked(Entity),

    /// A prefix's sequence counter cannot advance further
    #[error("Id space exhausted: {0} is the last allocatable id")]
    IdSpaceExhausted(String),

    /// Fact or gap not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error while saving or loading
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<DomainError> for StoreError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidEntity(value) => StoreError::InvalidEntity(value),
            other => StoreError::InvalidInput(other.to_string()),
        }
    }
}

impl StoreError {
    /// Whether the error is a lock-gate rejection
    ///
    /// Callers use this to tell "extraction for this party is over" apart
    /// from bad input.
    pub fn is_locked(&self) -> bool {
        matches!(self, StoreError::EntityLocked(_))
    }
}
