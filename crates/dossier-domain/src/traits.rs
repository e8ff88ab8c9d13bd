//! Trait definitions for registry access
//!
//! The merger only talks to a registry through [`FactStore`], so it can be
//! exercised against the real store or a test double.

use crate::{Entity, Fact, NewFact};

/// Read and write surface the incremental merger needs from a registry
///
/// Implementations guard their own state; every method takes `&self` so a
/// registry can be shared between extraction threads.
pub trait FactStore {
    /// Error type for store operations
    type Error;

    /// Add a new fact, allocating its id
    fn add_fact(&self, fact: NewFact) -> Result<String, Self::Error>;

    /// Get a fact by id
    fn get_fact(&self, id: &str) -> Option<Fact>;

    /// Query facts matching criteria
    fn query_facts(&self, query: &FactQuery) -> Vec<Fact>;

    /// Overwrite an existing fact, matched by id
    fn replace_fact(&self, fact: Fact) -> Result<(), Self::Error>;

    /// Flag a fact as removed from its source
    fn mark_removed(&self, id: &str) -> Result<(), Self::Error>;
}

/// Query criteria for retrieving facts
///
/// String filters compare case-insensitively, except `source_document`
/// which must equal the recorded value exactly (after trimming).
#[derive(Debug, Clone, Default)]
pub struct FactQuery {
    /// Filter by entity
    pub entity: Option<Entity>,

    /// Filter by domain
    pub domain: Option<String>,

    /// Filter by category
    pub category: Option<String>,

    /// Filter by recorded source document
    pub source_document: Option<String>,

    /// Include facts flagged as removed
    pub include_removed: bool,
}

impl FactQuery {
    /// Whether a fact satisfies every filter
    pub fn matches(&self, fact: &Fact) -> bool {
        if !self.include_removed && fact.removed {
            return false;
        }
        if let Some(entity) = self.entity {
            if fact.entity != entity {
                return false;
            }
        }
        if let Some(domain) = &self.domain {
            if !fact.domain.eq_ignore_ascii_case(domain) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !fact.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(document) = &self.source_document {
            if fact.source_document.trim() != document.trim() {
                return false;
            }
        }
        true
    }
}
