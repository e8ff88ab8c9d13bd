//! Domain-level validation errors

use thiserror::Error;

/// Errors raised while parsing or validating domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Entity outside the target/buyer enumeration
    #[error("Invalid entity '{0}': expected 'target' or 'buyer'")]
    InvalidEntity(String),

    /// Unknown fact status
    #[error("Invalid status '{0}': expected documented, partial or gap")]
    InvalidStatus(String),

    /// Unknown gap importance
    #[error("Invalid importance '{0}': expected critical, high, medium or low")]
    InvalidImportance(String),

    /// Unknown verification status
    #[error("Invalid verification status '{0}'")]
    InvalidVerification(String),

    /// Identifier does not follow the `{F|G}-{PREFIX}-{NNN}` shape
    #[error("Malformed id '{0}'")]
    MalformedId(String),
}
