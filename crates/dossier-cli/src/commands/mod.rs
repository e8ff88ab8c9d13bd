//! Command implementations.

pub mod combine;
pub mod compare;
pub mod conflicts;
pub mod facts;
pub mod format;
pub mod merge;
pub mod review;
pub mod summary;
pub mod validate;

pub use self::combine::execute_combine;
pub use self::compare::execute_compare;
pub use self::conflicts::{execute_conflicts, execute_resolve};
pub use self::facts::{execute_facts, execute_gaps};
pub use self::format::execute_format;
pub use self::merge::execute_merge;
pub use self::review::{execute_confirm, execute_lock};
pub use self::summary::execute_summary;
pub use self::validate::execute_validate;
