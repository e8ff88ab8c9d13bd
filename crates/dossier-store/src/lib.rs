//! Dossier Storage Layer
//!
//! In-memory fact/gap registry for one engagement, with JSON persistence.
//!
//! # Architecture
//!
//! - One `parking_lot::RwLock` guards every list, index, counter and lock flag
//! - Ids are allocated per domain prefix (`F-INFRA-001`, `G-NET-002`)
//! - Once an entity's discovery is locked, new facts for it are rejected
//! - Snapshots, comparisons and citation checks are read-only projections
//!
//! # Examples
//!
//! ```no_run
//! use dossier_domain::{Entity, NewFact};
//! use dossier_store::FactRegistry;
//!
//! let registry = FactRegistry::new();
//! registry
//!     .add_fact(NewFact::new("network", "wan", "SD-WAN overlay", Entity::Target))
//!     .unwrap();
//! registry.save("output/facts.json").unwrap();
//!
//! let restored = FactRegistry::load("output/facts.json").unwrap();
//! println!("{}", restored.format_for_reasoning("network", Entity::Target));
//! ```

#![warn(missing_docs)]

mod allocator;
mod citations;
mod compare;
mod config;
mod error;
mod lock_gate;
mod persistence;
mod registry;
mod snapshot;

pub use allocator::{Counters, IdAllocator};
pub use citations::CitationReport;
pub use compare::{
    ComparedItem, ComparisonConflict, ComparisonConflictType, ComparisonReport, SharedItem, VENDOR_KEY,
};
pub use config::{RegistryConfig, DEFAULT_DOMAINS};
pub use error::StoreError;
pub use lock_gate::{EntityLockGate, EntityLockState};
pub use persistence::{DocumentMetadata, RegistryDocument, FORMAT_VERSION};
pub use registry::{FactRegistry, MergeFromCounts, RegistryStats};
pub use snapshot::{truncate_chars, ELLIPSIS};
