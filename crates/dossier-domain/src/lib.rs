//! Dossier Domain Layer
//!
//! Core model for the due-diligence fact registry: the records extraction
//! passes produce, the enumerations that constrain them, and the trait seam
//! the incremental merger uses to talk to a registry.
//!
//! ## Key Concepts
//!
//! - **Fact**: an atomic, evidence-cited observation about one party
//! - **Gap**: an identified absence of information, citable like a fact
//! - **Entity**: which transaction party a fact describes (target or buyer)
//! - **Verification**: whether a human reviewer has confirmed a fact
//! - **Similarity**: Ratcliff/Obershelp ratio used for duplicate and merge matching
//!
//! ## Architecture
//!
//! - Pure data and logic, no I/O
//! - Storage lives in `dossier-store`, reconciliation in `dossier-merge`
//! - [`traits::FactStore`] is the boundary between the two

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod confidence;
pub mod entity;
pub mod error;
pub mod fact;
pub mod ids;
pub mod similarity;
pub mod traits;

// Re-exports for convenience
pub use entity::{Entity, FactStatus, Importance, VerificationStatus};
pub use error::DomainError;
pub use fact::{Evidence, Fact, Gap, NewFact, Record};
pub use ids::{domain_prefix, IdKind, ParsedId};
pub use similarity::similarity;
pub use traits::{FactQuery, FactStore};
