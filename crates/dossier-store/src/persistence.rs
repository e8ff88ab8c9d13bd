//! JSON document format for a saved registry
//!
//! ```json
//! {
//!   "metadata": { "created_at": "...", "version": "1.0", ... },
//!   "facts": [ ... ],
//!   "gaps": [ ... ],
//!   "discovery_complete": { "target": { "complete": true, ... }, "buyer": { ... } }
//! }
//! ```

use crate::allocator::Counters;
use crate::lock_gate::EntityLockState;
use chrono::{DateTime, Utc};
use dossier_domain::{Entity, Fact, Gap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Format version written by this crate
pub const FORMAT_VERSION: &str = "1.0";

/// Document-level metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// When the registry was created
    pub created_at: DateTime<Utc>,

    /// Format version
    #[serde(default = "default_version")]
    pub version: String,

    /// When this document was written
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,

    /// Number of facts in the document
    #[serde(default)]
    pub fact_count: usize,

    /// Number of gaps in the document
    #[serde(default)]
    pub gap_count: usize,

    /// Fact counters per prefix at save time
    #[serde(default)]
    pub fact_counters: Counters,

    /// Gap counters per prefix at save time
    #[serde(default)]
    pub gap_counters: Counters,
}

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

/// A whole registry as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryDocument {
    /// Metadata
    pub metadata: DocumentMetadata,

    /// Every fact, removed ones included
    #[serde(default)]
    pub facts: Vec<Fact>,

    /// Every gap
    #[serde(default)]
    pub gaps: Vec<Gap>,

    /// Lock state per entity
    #[serde(default)]
    pub discovery_complete: BTreeMap<Entity, EntityLockState>,
}

impl RegistryDocument {
    /// Parse a document from JSON text
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Render the document as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document_uses_defaults() {
        let json = r#"{ "metadata": { "created_at": "2024-05-01T12:00:00Z" } }"#;
        let doc = RegistryDocument::from_json(json).unwrap();
        assert_eq!(doc.metadata.version, FORMAT_VERSION);
        assert!(doc.facts.is_empty());
        assert!(doc.discovery_complete.is_empty());
    }

    #[test]
    fn test_lock_states_keyed_by_entity_name() {
        let mut discovery = BTreeMap::new();
        discovery.insert(
            Entity::Target,
            EntityLockState {
                complete: true,
                ..Default::default()
            },
        );
        let doc = RegistryDocument {
            metadata: DocumentMetadata {
                created_at: Utc::now(),
                version: FORMAT_VERSION.to_string(),
                saved_at: None,
                fact_count: 0,
                gap_count: 0,
                fact_counters: Counters::new(),
                gap_counters: Counters::new(),
            },
            facts: vec![],
            gaps: vec![],
            discovery_complete: discovery,
        };
        let json = doc.to_json().unwrap();
        assert!(json.contains("\"target\""));
        assert_eq!(RegistryDocument::from_json(&json).unwrap(), doc);
    }
}
