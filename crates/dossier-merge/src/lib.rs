//! Dossier Incremental Merger
//!
//! Reconciles freshly extracted facts with a registry that may already hold
//! human-reviewed data.
//!
//! The merger provides:
//! - Similarity matching of candidates against existing facts
//! - Per-candidate decisions (add, update, skip, conflict)
//! - Removal handling when a reprocessed document no longer mentions a fact
//! - A conflict queue and explicit, audited conflict resolution
//!
//! # Examples
//!
//! ```no_run
//! use dossier_domain::{Entity, Evidence, NewFact};
//! use dossier_merge::{FactCandidate, IncrementalMerger, MergeConfig, Resolution};
//! use dossier_store::FactRegistry;
//!
//! let registry = FactRegistry::load("output/facts.json").unwrap();
//! let mut merger = IncrementalMerger::new(&registry, MergeConfig::default());
//!
//! let batch = vec![FactCandidate::new(
//!     NewFact::new("network", "wan", "SD-WAN overlay", Entity::Target)
//!         .with_evidence(Evidence::new("Branches connect over a Velocloud SD-WAN", "5.1")),
//! )];
//! let result = merger.merge_document_facts(batch, "network_v2.pdf", true).unwrap();
//!
//! for conflict in &result.conflicts {
//!     merger
//!         .resolve(&conflict.id, Resolution::KeepExisting, "reviewer-1", "")
//!         .unwrap();
//! }
//! ```

#![warn(missing_docs)]

mod config;
mod conflict;
mod error;
mod merger;
mod types;

pub use config::MergeConfig;
pub use conflict::{Conflict, ConflictQueue, ConflictType, FieldConflict, FieldConflicts, Resolution};
pub use error::MergeError;
pub use merger::{IncrementalMerger, REMOVED_FIELD, UPDATED_MARKER};
pub use types::{FactCandidate, FailedCandidate, MergeAction, MergeDecision, MergeResult};
