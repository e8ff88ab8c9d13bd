//! Closed enumerations for facts and gaps
//!
//! Every enum serializes in `snake_case`, which is also the form accepted by
//! `parse`/`FromStr`. Parsing is case-insensitive; anything else is rejected
//! rather than defaulted.

use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The transaction party a fact pertains to
///
/// Exactly two parties exist in an engagement. The comparison logic in the
/// store relies on this being a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    /// The company being acquired
    Target,

    /// The acquiring company
    Buyer,
}

impl Entity {
    /// Both parties, target first
    pub const ALL: [Entity; 2] = [Entity::Target, Entity::Buyer];

    /// Get the entity name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Target => "target",
            Entity::Buyer => "buyer",
        }
    }

    /// Parse an entity from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "target" => Some(Entity::Target),
            "buyer" => Some(Entity::Buyer),
            _ => None,
        }
    }

    /// The other party
    pub fn counterpart(&self) -> Self {
        match self {
            Entity::Target => Entity::Buyer,
            Entity::Buyer => Entity::Target,
        }
    }
}

impl FromStr for Entity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::InvalidEntity(s.to_string()))
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How completely a fact is documented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FactStatus {
    /// Fully evidenced in the source material
    #[default]
    Documented,

    /// Some details present, others missing
    Partial,

    /// Mentioned but essentially undocumented
    Gap,
}

impl FactStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FactStatus::Documented => "documented",
            FactStatus::Partial => "partial",
            FactStatus::Gap => "gap",
        }
    }

    /// Parse a status from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "documented" => Some(FactStatus::Documented),
            "partial" => Some(FactStatus::Partial),
            "gap" => Some(FactStatus::Gap),
            _ => None,
        }
    }
}

impl FromStr for FactStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::InvalidStatus(s.to_string()))
    }
}

impl fmt::Display for FactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a human reviewer has vouched for a fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Not yet reviewed; may be refreshed freely by re-extraction
    #[default]
    Pending,

    /// Confirmed by a reviewer; changes surface as conflicts
    Confirmed,
}

impl VerificationStatus {
    /// Get the verification status as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Confirmed => "confirmed",
        }
    }

    /// Parse a verification status from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(VerificationStatus::Pending),
            "confirmed" => Some(VerificationStatus::Confirmed),
            _ => None,
        }
    }
}

impl FromStr for VerificationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::InvalidVerification(s.to_string()))
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Importance of a documentation gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    /// Blocks the assessment
    Critical,
    /// Significant open question
    High,
    /// Worth chasing
    #[default]
    Medium,
    /// Nice to have
    Low,
}

impl Importance {
    /// Get the importance as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Critical => "critical",
            Importance::High => "high",
            Importance::Medium => "medium",
            Importance::Low => "low",
        }
    }

    /// Parse an importance from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Some(Importance::Critical),
            "high" => Some(Importance::High),
            "medium" => Some(Importance::Medium),
            "low" => Some(Importance::Low),
            _ => None,
        }
    }
}

impl FromStr for Importance {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::InvalidImportance(s.to_string()))
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_parse() {
        assert_eq!(Entity::parse("target"), Some(Entity::Target));
        assert_eq!(Entity::parse(" Buyer "), Some(Entity::Buyer));
        assert_eq!(Entity::parse("seller"), None);
        assert_eq!(Entity::parse(""), None);
    }

    #[test]
    fn test_entity_from_str_rejects_unknown() {
        let err = "acquirer".parse::<Entity>().unwrap_err();
        assert_eq!(err, DomainError::InvalidEntity("acquirer".to_string()));
    }

    #[test]
    fn test_entity_counterpart() {
        assert_eq!(Entity::Target.counterpart(), Entity::Buyer);
        assert_eq!(Entity::Buyer.counterpart(), Entity::Target);
    }

    #[test]
    fn test_entity_serde_rejects_unknown() {
        assert_eq!(serde_json::to_string(&Entity::Buyer).unwrap(), "\"buyer\"");
        assert!(serde_json::from_str::<Entity>("\"seller\"").is_err());
    }

    #[test]
    fn test_status_and_importance_parse() {
        assert_eq!("Partial".parse::<FactStatus>().unwrap(), FactStatus::Partial);
        assert!("unknown".parse::<FactStatus>().is_err());
        assert_eq!("CRITICAL".parse::<Importance>().unwrap(), Importance::Critical);
        assert!("urgent".parse::<Importance>().is_err());
        assert_eq!(
            "confirmed".parse::<VerificationStatus>().unwrap(),
            VerificationStatus::Confirmed
        );
    }

    #[test]
    fn test_importance_ordering() {
        assert!(Importance::Critical < Importance::High);
        assert!(Importance::Medium < Importance::Low);
    }
}
