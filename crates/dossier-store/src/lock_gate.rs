//! One-way discovery lock per entity
//!
//! Once an entity's discovery phase is declared complete its partition is
//! frozen: no new facts may be added for it. There is no unlock; a changed
//! scope means a new registry.

use chrono::{DateTime, Utc};
use dossier_domain::Entity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Discovery state of one entity
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityLockState {
    /// Whether discovery is complete (the partition is frozen)
    #[serde(default)]
    pub complete: bool,

    /// When the lock was taken
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    /// Categories declared covered at lock time
    #[serde(default)]
    pub categories_covered: Vec<String>,

    /// Categories declared missing at lock time
    #[serde(default)]
    pub categories_missing: Vec<String>,
}

/// Lock states for both entities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLockGate {
    states: BTreeMap<Entity, EntityLockState>,
}

impl Default for EntityLockGate {
    fn default() -> Self {
        let states = Entity::ALL
            .iter()
            .map(|entity| (*entity, EntityLockState::default()))
            .collect();
        Self { states }
    }
}

impl EntityLockGate {
    /// Create a gate with both entities open
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a gate from persisted states
    ///
    /// Entities missing from `states` start open.
    pub fn from_states(states: BTreeMap<Entity, EntityLockState>) -> Self {
        let mut gate = Self::default();
        gate.states.extend(states);
        gate
    }

    /// Freeze an entity's partition
    ///
    /// Returns `false` (and changes nothing) when the entity was already
    /// locked; the first lock's coverage lists are kept.
    pub fn lock(
        &mut self,
        entity: Entity,
        categories_covered: Vec<String>,
        categories_missing: Vec<String>,
        now: DateTime<Utc>,
    ) -> bool {
        let state = self.states.entry(entity).or_default();
        if state.complete {
            return false;
        }
        *state = EntityLockState {
            complete: true,
            completed_at: Some(now),
            categories_covered,
            categories_missing,
        };
        true
    }

    /// Whether the entity's partition is frozen
    pub fn is_locked(&self, entity: Entity) -> bool {
        self.states.get(&entity).is_some_and(|s| s.complete)
    }

    /// Current state for an entity
    pub fn state(&self, entity: Entity) -> EntityLockState {
        self.states.get(&entity).cloned().unwrap_or_default()
    }

    /// All states, keyed by entity
    pub fn states(&self) -> &BTreeMap<Entity, EntityLockState> {
        &self.states
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_open() {
        let gate = EntityLockGate::new();
        assert!(!gate.is_locked(Entity::Target));
        assert!(!gate.is_locked(Entity::Buyer));
        assert_eq!(gate.states().len(), 2);
    }

    #[test]
    fn test_lock_is_one_way() {
        let mut gate = EntityLockGate::new();
        let now = Utc::now();
        assert!(gate.lock(Entity::Target, vec!["hosting".into()], vec!["dr".into()], now));
        assert!(gate.is_locked(Entity::Target));
        assert!(!gate.is_locked(Entity::Buyer));

        // Second lock keeps the original coverage
        assert!(!gate.lock(Entity::Target, vec![], vec![], Utc::now()));
        let state = gate.state(Entity::Target);
        assert_eq!(state.categories_covered, vec!["hosting".to_string()]);
        assert_eq!(state.categories_missing, vec!["dr".to_string()]);
        assert_eq!(state.completed_at, Some(now));
    }

    #[test]
    fn test_from_states_fills_missing_entities() {
        let mut states = BTreeMap::new();
        states.insert(
            Entity::Buyer,
            EntityLockState {
                complete: true,
                ..Default::default()
            },
        );
        let gate = EntityLockGate::from_states(states);
        assert!(gate.is_locked(Entity::Buyer));
        assert!(!gate.is_locked(Entity::Target));
    }
}
