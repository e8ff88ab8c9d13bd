//! Identifier allocation
//!
//! One counter per domain prefix, in two independent spaces (facts and
//! gaps). The allocator is owned by a single registry and only reached
//! through `&mut self`, so the registry's write guard makes every
//! read-increment-format step atomic.

use crate::StoreError;
use dossier_domain::{domain_prefix, IdKind, ParsedId};
use std::collections::BTreeMap;

/// Per-prefix sequence counters for one id space
pub type Counters = BTreeMap<String, u32>;

/// Hands out `F-{PREFIX}-{NNN}` and `G-{PREFIX}-{NNN}` identifiers
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    fact_counters: Counters,
    gap_counters: Counters,
    malformed: Vec<String>,
}

impl IdAllocator {
    /// Create an allocator with every counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id for `domain` in the given space
    ///
    /// # Errors
    ///
    /// [`StoreError::IdSpaceExhausted`] once a prefix's counter sits at
    /// `u32::MAX` (only reachable through an observed id); the counter is
    /// left unchanged so existing ids are never handed out again.
    ///
    /// # Examples
    ///
    /// ```
    /// use dossier_domain::IdKind;
    /// use dossier_store::IdAllocator;
    ///
    /// let mut allocator = IdAllocator::new();
    /// assert_eq!(allocator.allocate(IdKind::Fact, "infrastructure").unwrap(), "F-INFRA-001");
    /// assert_eq!(allocator.allocate(IdKind::Fact, "infrastructure").unwrap(), "F-INFRA-002");
    /// assert_eq!(allocator.allocate(IdKind::Gap, "infrastructure").unwrap(), "G-INFRA-001");
    /// ```
    pub fn allocate(&mut self, kind: IdKind, domain: &str) -> Result<String, StoreError> {
        let prefix = domain_prefix(domain);
        let counter = self.counters_mut(kind).entry(prefix.to_string()).or_insert(0);
        let next = counter.checked_add(1).ok_or_else(|| {
            tracing::error!(prefix, kind = ?kind, "Id sequence exhausted");
            StoreError::IdSpaceExhausted(kind.format(prefix, u32::MAX))
        })?;
        *counter = next;
        Ok(kind.format(prefix, next))
    }

    /// Advance counters past an externally supplied id
    ///
    /// Counters move to `max(current, parsed sequence)`. Ids that do not
    /// parse are logged and remembered in [`malformed_ids`], and no counter
    /// moves; the caller still keeps the record.
    ///
    /// Returns `true` when the id parsed.
    ///
    /// [`malformed_ids`]: IdAllocator::malformed_ids
    pub fn observe(&mut self, id: &str) -> bool {
        match ParsedId::parse(id) {
            Ok(parsed) => {
                let counter = self.counters_mut(parsed.kind).entry(parsed.prefix).or_insert(0);
                *counter = (*counter).max(parsed.sequence);
                true
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "Could not parse id sequence; counter not advanced");
                if !self.malformed.iter().any(|m| m == id) {
                    self.malformed.push(id.to_string());
                }
                false
            }
        }
    }

    /// Raise counters to at least the given values
    pub fn restore_counters(&mut self, kind: IdKind, counters: &Counters) {
        let own = self.counters_mut(kind);
        for (prefix, value) in counters {
            let counter = own.entry(prefix.clone()).or_insert(0);
            *counter = (*counter).max(*value);
        }
    }

    /// Current counters for an id space
    pub fn counters(&self, kind: IdKind) -> &Counters {
        match kind {
            IdKind::Fact => &self.fact_counters,
            IdKind::Gap => &self.gap_counters,
        }
    }

    /// Ids seen by [`observe`](IdAllocator::observe) that could not be parsed
    pub fn malformed_ids(&self) -> &[String] {
        &self.malformed
    }

    fn counters_mut(&mut self, kind: IdKind) -> &mut Counters {
        match kind {
            IdKind::Fact => &mut self.fact_counters,
            IdKind::Gap => &mut self.gap_counters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_independent_spaces_and_prefixes() {
        let mut allocator = IdAllocator::new();
        assert_eq!(allocator.allocate(IdKind::Fact, "network").unwrap(), "F-NET-001");
        assert_eq!(allocator.allocate(IdKind::Fact, "cybersecurity").unwrap(), "F-CYBER-001");
        assert_eq!(allocator.allocate(IdKind::Gap, "network").unwrap(), "G-NET-001");
        assert_eq!(allocator.allocate(IdKind::Fact, "network").unwrap(), "F-NET-002");
    }

    #[test]
    fn test_unknown_domain_uses_generic_prefix() {
        let mut allocator = IdAllocator::new();
        assert_eq!(allocator.allocate(IdKind::Fact, "finance").unwrap(), "F-GEN-001");
        assert_eq!(allocator.allocate(IdKind::Fact, "legal").unwrap(), "F-GEN-002");
    }

    #[test]
    fn test_observe_advances_to_max() {
        let mut allocator = IdAllocator::new();
        assert!(allocator.observe("F-INFRA-007"));
        assert!(allocator.observe("F-INFRA-003"));
        assert_eq!(allocator.allocate(IdKind::Fact, "infrastructure").unwrap(), "F-INFRA-008");
        assert!(allocator.observe("G-INFRA-010"));
        assert_eq!(allocator.allocate(IdKind::Gap, "infrastructure").unwrap(), "G-INFRA-011");
    }

    #[test]
    fn test_observe_malformed_is_recorded_not_counted() {
        let mut allocator = IdAllocator::new();
        assert!(!allocator.observe("INFRA-legacy-7"));
        assert!(!allocator.observe("INFRA-legacy-7"));
        assert_eq!(allocator.malformed_ids(), ["INFRA-legacy-7".to_string()]);
        assert!(allocator.counters(IdKind::Fact).is_empty());
    }

    #[test]
    fn test_exhausted_sequence_is_an_error() {
        let mut allocator = IdAllocator::new();
        assert!(allocator.observe("F-INFRA-4294967295"));

        let err = allocator.allocate(IdKind::Fact, "infrastructure").unwrap_err();
        assert!(matches!(err, StoreError::IdSpaceExhausted(_)));
        assert_eq!(allocator.counters(IdKind::Fact)["INFRA"], u32::MAX);

        // Other prefixes and the gap space are unaffected
        assert_eq!(allocator.allocate(IdKind::Fact, "network").unwrap(), "F-NET-001");
        assert_eq!(allocator.allocate(IdKind::Gap, "infrastructure").unwrap(), "G-INFRA-001");
    }

    #[test]
    fn test_restore_counters_never_lowers() {
        let mut allocator = IdAllocator::new();
        allocator.observe("F-NET-005");
        let mut persisted = Counters::new();
        persisted.insert("NET".to_string(), 2);
        persisted.insert("APP".to_string(), 9);
        allocator.restore_counters(IdKind::Fact, &persisted);
        assert_eq!(allocator.counters(IdKind::Fact)["NET"], 5);
        assert_eq!(allocator.counters(IdKind::Fact)["APP"], 9);
    }
}
