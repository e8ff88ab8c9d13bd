//! The fact/gap registry
//!
//! All state (fact and gap lists, their id indexes, the allocator and the
//! lock gate) sits behind one `RwLock`. Writers take the write guard for the
//! whole operation, so id allocation, indexing and lock checks are a single
//! step; compound reads (`compare`, `format_for_reasoning`, exports) take the
//! read guard and see a consistent snapshot. No method calls another public
//! method while holding the guard.

use crate::allocator::IdAllocator;
use crate::citations::CitationReport;
use crate::compare::{compare_facts, ComparisonReport};
use crate::lock_gate::{EntityLockGate, EntityLockState};
use crate::persistence::{DocumentMetadata, RegistryDocument, FORMAT_VERSION};
use crate::snapshot;
use crate::{RegistryConfig, StoreError};
use chrono::{DateTime, Utc};
use dossier_domain::{
    similarity, Entity, Fact, FactQuery, FactStore, Gap, IdKind, Importance, NewFact, Record,
    VerificationStatus,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Counts returned by [`FactRegistry::merge_from`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MergeFromCounts {
    /// Facts imported
    pub facts: usize,
    /// Gaps imported
    pub gaps: usize,
    /// Records skipped because their id already existed
    pub duplicates: usize,
}

/// Aggregate counts over a registry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryStats {
    /// All facts, removed included
    pub total_facts: usize,
    /// Facts flagged removed
    pub removed_facts: usize,
    /// Confirmed live facts
    pub confirmed_facts: usize,
    /// All gaps
    pub total_gaps: usize,
    /// Live facts per domain
    pub by_domain: BTreeMap<String, usize>,
    /// Live facts per entity
    pub by_entity: BTreeMap<String, usize>,
    /// Live facts per status
    pub by_status: BTreeMap<String, usize>,
    /// Gaps per importance
    pub gaps_by_importance: BTreeMap<String, usize>,
}

#[derive(Debug)]
struct RegistryState {
    facts: Vec<Fact>,
    gaps: Vec<Gap>,
    fact_index: HashMap<String, usize>,
    gap_index: HashMap<String, usize>,
    allocator: IdAllocator,
    locks: EntityLockGate,
    created_at: DateTime<Utc>,
}

impl RegistryState {
    fn new() -> Self {
        Self {
            facts: Vec::new(),
            gaps: Vec::new(),
            fact_index: HashMap::new(),
            gap_index: HashMap::new(),
            allocator: IdAllocator::new(),
            locks: EntityLockGate::new(),
            created_at: Utc::now(),
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.fact_index.contains_key(id) || self.gap_index.contains_key(id)
    }

    fn fact(&self, id: &str) -> Option<&Fact> {
        self.fact_index.get(id).map(|&i| &self.facts[i])
    }

    fn fact_mut(&mut self, id: &str) -> Option<&mut Fact> {
        match self.fact_index.get(id) {
            Some(&i) => Some(&mut self.facts[i]),
            None => None,
        }
    }

    /// Insert a fact carrying a foreign id; `false` if the id is taken
    fn import_fact(&mut self, fact: Fact) -> bool {
        if self.fact_index.contains_key(&fact.id) {
            return false;
        }
        self.allocator.observe(&fact.id);
        self.fact_index.insert(fact.id.clone(), self.facts.len());
        self.facts.push(fact);
        true
    }

    /// Insert a gap carrying a foreign id; `false` if the id is taken
    fn import_gap(&mut self, gap: Gap) -> bool {
        if self.gap_index.contains_key(&gap.id) {
            return false;
        }
        self.allocator.observe(&gap.id);
        self.gap_index.insert(gap.id.clone(), self.gaps.len());
        self.gaps.push(gap);
        true
    }

    fn live_facts<'a>(&'a self, entity: Entity, domain: &'a str) -> impl Iterator<Item = &'a Fact> + 'a {
        self.facts
            .iter()
            .filter(move |f| f.is_live() && f.entity == entity && f.domain.eq_ignore_ascii_case(domain))
    }

    /// Most similar live fact with the same entity, domain and category
    fn closest_item(&self, fact: &NewFact) -> Option<(&Fact, f64)> {
        self.facts
            .iter()
            .filter(|f| {
                f.is_live()
                    && f.entity == fact.entity
                    && f.domain.eq_ignore_ascii_case(&fact.domain)
                    && f.category.eq_ignore_ascii_case(&fact.category)
            })
            .map(|f| (f, similarity(&f.item, &fact.item)))
            .fold(None, |best: Option<(&Fact, f64)>, (f, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((f, score)),
            })
    }
}

/// In-memory registry of facts and gaps for one engagement
///
/// Cheap to share: wrap in an `Arc` and call from any thread.
///
/// # Examples
///
/// ```
/// use dossier_domain::{Entity, Evidence, NewFact};
/// use dossier_store::FactRegistry;
///
/// let registry = FactRegistry::new();
/// let id = registry
///     .add_fact(
///         NewFact::new("infrastructure", "hosting", "Primary data center", Entity::Target)
///             .with_detail("vendor", "Equinix")
///             .with_evidence(Evidence::new("Hosted at Equinix DA6", "2.1 Hosting")),
///     )
///     .unwrap();
/// assert_eq!(id, "F-INFRA-001");
///
/// registry.lock(Entity::Target);
/// assert!(registry
///     .add_fact(NewFact::new("infrastructure", "hosting", "Backup DC", Entity::Target))
///     .is_err());
/// ```
#[derive(Debug)]
pub struct FactRegistry {
    state: RwLock<RegistryState>,
    config: RegistryConfig,
}

impl Default for FactRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FactRegistry {
    /// Create an empty registry with the default domain set
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with the given configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            state: RwLock::new(RegistryState::new()),
            config,
        }
    }

    /// The registry's configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Canonical lowercase domain name, or `InvalidDomain`
    fn check_domain(&self, domain: &str) -> Result<String, StoreError> {
        if self.config.is_known_domain(domain) {
            Ok(domain.trim().to_lowercase())
        } else {
            Err(StoreError::InvalidDomain {
                domain: domain.to_string(),
                allowed: self.config.domain_list(),
            })
        }
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Add a fact and return its allocated id
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidDomain`] if the domain is not configured
    /// - [`StoreError::EntityLocked`] if the entity's discovery is complete
    pub fn add_fact(&self, fact: NewFact) -> Result<String, StoreError> {
        let domain = self.check_domain(&fact.domain)?;

        let mut state = self.state.write();
        if state.locks.is_locked(fact.entity) {
            tracing::warn!(entity = %fact.entity, item = %fact.item, "Rejected fact for locked entity");
            return Err(StoreError::EntityLocked(fact.entity));
        }

        let fact = NewFact { domain, ..fact };
        if let Some((existing, score)) = state.closest_item(&fact) {
            if score >= self.config.duplicate_threshold {
                tracing::debug!(
                    existing = %existing.id,
                    item = %fact.item,
                    score,
                    "Adding near-duplicate of an existing fact"
                );
            }
        }

        let id = state.allocator.allocate(IdKind::Fact, &fact.domain)?;
        let stored = fact.into_fact(id.clone(), Utc::now());

        tracing::debug!(id = %id, entity = %stored.entity, item = %stored.item, "Added fact");
        let index = state.facts.len();
        state.fact_index.insert(id.clone(), index);
        state.facts.push(stored);
        Ok(id)
    }

    /// Add a gap and return its allocated id
    ///
    /// Gaps have their own id space and are not subject to entity locks.
    pub fn add_gap(
        &self,
        domain: &str,
        category: &str,
        description: &str,
        importance: Importance,
    ) -> Result<String, StoreError> {
        self.insert_gap(domain, category, description, importance, None)
    }

    /// Add a gap tagged with the entity it was observed for
    pub fn add_entity_gap(
        &self,
        domain: &str,
        category: &str,
        description: &str,
        importance: Importance,
        entity: Entity,
    ) -> Result<String, StoreError> {
        self.insert_gap(domain, category, description, importance, Some(entity))
    }

    fn insert_gap(
        &self,
        domain: &str,
        category: &str,
        description: &str,
        importance: Importance,
        entity: Option<Entity>,
    ) -> Result<String, StoreError> {
        let domain = self.check_domain(domain)?;

        let mut state = self.state.write();
        let id = state.allocator.allocate(IdKind::Gap, &domain)?;
        let gap = Gap {
            id: id.clone(),
            domain,
            category: category.to_string(),
            description: description.to_string(),
            importance,
            entity,
            created_at: Utc::now(),
        };

        tracing::debug!(id = %id, "Added gap");
        let index = state.gaps.len();
        state.gap_index.insert(id.clone(), index);
        state.gaps.push(gap);
        Ok(id)
    }

    /// Freeze an entity's partition with no coverage notes
    ///
    /// Returns `false` if it was already locked.
    pub fn lock(&self, entity: Entity) -> bool {
        self.lock_with_coverage(entity, Vec::new(), Vec::new())
    }

    /// Freeze an entity's partition, recording declared coverage
    pub fn lock_with_coverage(
        &self,
        entity: Entity,
        categories_covered: Vec<String>,
        categories_missing: Vec<String>,
    ) -> bool {
        let mut state = self.state.write();
        let locked = state
            .locks
            .lock(entity, categories_covered, categories_missing, Utc::now());
        if locked {
            let count = state.facts.iter().filter(|f| f.entity == entity).count();
            tracing::info!(entity = %entity, facts = count, "Discovery complete, entity locked");
        } else {
            tracing::info!(entity = %entity, "Entity already locked");
        }
        locked
    }

    /// Mark a fact as confirmed by a reviewer
    ///
    /// A non-empty `note` replaces the verification note.
    pub fn confirm_fact(&self, id: &str, reviewer_id: &str, note: &str) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let fact = state
            .fact_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let now = Utc::now();
        fact.verification_status = VerificationStatus::Confirmed;
        fact.verified_by = Some(reviewer_id.to_string());
        fact.verified_at = Some(now);
        if !note.trim().is_empty() {
            fact.verification_note = note.trim().to_string();
        }
        fact.updated_at = now;
        fact.refresh_confidence();

        tracing::info!(id, reviewer = reviewer_id, "Fact confirmed");
        Ok(())
    }

    /// Absorb every fact and gap from another registry
    ///
    /// Records keep their original ids. Ids already present here are counted
    /// as duplicates and the local record wins. Counters advance past every
    /// imported id that parses. Lock states are not imported.
    pub fn merge_from(&self, other: &FactRegistry) -> MergeFromCounts {
        // Copy out first so merging a registry into itself cannot deadlock
        let (facts, gaps) = {
            let theirs = other.state.read();
            (theirs.facts.clone(), theirs.gaps.clone())
        };

        let mut state = self.state.write();
        let mut counts = MergeFromCounts::default();

        for fact in facts {
            let id = fact.id.clone();
            let entity = fact.entity;
            if state.import_fact(fact) {
                if state.locks.is_locked(entity) {
                    tracing::warn!(id = %id, entity = %entity, "Imported fact into a locked partition");
                }
                counts.facts += 1;
            } else {
                tracing::warn!(id = %id, "Duplicate fact id on merge; keeping existing record");
                counts.duplicates += 1;
            }
        }

        for gap in gaps {
            let id = gap.id.clone();
            if state.import_gap(gap) {
                counts.gaps += 1;
            } else {
                tracing::warn!(id = %id, "Duplicate gap id on merge; keeping existing record");
                counts.duplicates += 1;
            }
        }

        tracing::info!(
            facts = counts.facts,
            gaps = counts.gaps,
            duplicates = counts.duplicates,
            "Merged registry"
        );
        counts
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Look up a fact or gap by id
    pub fn get(&self, id: &str) -> Option<Record> {
        let state = self.state.read();
        if let Some(fact) = state.fact(id) {
            return Some(Record::Fact(fact.clone()));
        }
        state
            .gap_index
            .get(id)
            .map(|&i| Record::Gap(state.gaps[i].clone()))
    }

    /// Look up a gap by id
    pub fn get_gap(&self, id: &str) -> Option<Gap> {
        let state = self.state.read();
        state.gap_index.get(id).map(|&i| state.gaps[i].clone())
    }

    /// Live facts for an entity, optionally restricted to one domain
    pub fn facts_for(&self, entity: Entity, domain: Option<&str>) -> Vec<Fact> {
        self.query_facts(&FactQuery {
            entity: Some(entity),
            domain: domain.map(str::to_string),
            ..Default::default()
        })
    }

    /// Gaps, optionally restricted to one domain
    pub fn gaps_for(&self, domain: Option<&str>) -> Vec<Gap> {
        let state = self.state.read();
        state
            .gaps
            .iter()
            .filter(|g| domain.map_or(true, |d| g.domain.eq_ignore_ascii_case(d)))
            .cloned()
            .collect()
    }

    /// Live fact whose item is at least `duplicate_threshold` similar to `fact`
    ///
    /// Only facts with the same entity, domain and category are considered.
    /// `add_fact` does not reject near-duplicates; extraction passes use
    /// this to skip them, and the incremental merger does its own matching.
    pub fn find_near_duplicate(&self, fact: &NewFact) -> Option<(String, f64)> {
        let state = self.state.read();
        let candidate = NewFact {
            domain: fact.domain.trim().to_lowercase(),
            ..fact.clone()
        };
        state
            .closest_item(&candidate)
            .filter(|(_, score)| *score >= self.config.duplicate_threshold)
            .map(|(existing, score)| (existing.id.clone(), score))
    }

    /// Every fact, removed ones included, in insertion order
    pub fn get_all_facts(&self) -> Vec<Fact> {
        self.state.read().facts.clone()
    }

    /// Every gap in insertion order
    pub fn get_all_gaps(&self) -> Vec<Gap> {
        self.state.read().gaps.clone()
    }

    /// Number of facts, removed ones included
    pub fn fact_count(&self) -> usize {
        self.state.read().facts.len()
    }

    /// Number of gaps
    pub fn gap_count(&self) -> usize {
        self.state.read().gaps.len()
    }

    /// Whether an entity's partition is frozen
    pub fn is_locked(&self, entity: Entity) -> bool {
        self.state.read().locks.is_locked(entity)
    }

    /// Discovery state of an entity
    pub fn lock_state(&self, entity: Entity) -> EntityLockState {
        self.state.read().locks.state(entity)
    }

    /// Ids seen on load or merge that did not match `{F|G}-{PREFIX}-{NNN}`
    pub fn malformed_ids(&self) -> Vec<String> {
        self.state.read().allocator.malformed_ids().to_vec()
    }

    /// Compare two entities' live facts
    ///
    /// See [`ComparisonReport`] for the grouping rules.
    pub fn compare(
        &self,
        entity_a: Entity,
        entity_b: Entity,
        domain: Option<&str>,
        category: Option<&str>,
    ) -> ComparisonReport {
        let query_for = |entity| FactQuery {
            entity: Some(entity),
            domain: domain.map(str::to_string),
            category: category.map(str::to_string),
            ..Default::default()
        };
        let query_a = query_for(entity_a);
        let query_b = query_for(entity_b);

        let state = self.state.read();
        compare_facts(
            entity_a,
            state.facts.iter().filter(|f| query_a.matches(f)),
            entity_b,
            state.facts.iter().filter(|f| query_b.matches(f)),
        )
    }

    /// Text projection of one entity's facts in one domain
    ///
    /// Includes the domain's gaps that are untagged or tagged with `entity`,
    /// and for the target partition a note when buyer facts exist in the
    /// same domain.
    pub fn format_for_reasoning(&self, domain: &str, entity: Entity) -> String {
        let state = self.state.read();
        let facts: Vec<&Fact> = state.live_facts(entity, domain).collect();
        let gaps: Vec<&Gap> = state
            .gaps
            .iter()
            .filter(|g| g.domain.eq_ignore_ascii_case(domain))
            .filter(|g| g.entity.map_or(true, |e| e == entity))
            .collect();
        let buyer_facts = if entity == Entity::Target {
            state.live_facts(Entity::Buyer, domain).count()
        } else {
            0
        };

        snapshot::render(
            domain,
            entity,
            &facts,
            &gaps,
            buyer_facts,
            self.config.evidence_excerpt_chars,
        )
    }

    /// Check cited ids; facts and gaps are both valid targets
    pub fn validate_citations<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> CitationReport {
        let state = self.state.read();
        CitationReport::build(ids, |id| state.contains(id))
    }

    /// Aggregate counts
    pub fn stats(&self) -> RegistryStats {
        let state = self.state.read();
        let mut stats = RegistryStats {
            total_facts: state.facts.len(),
            total_gaps: state.gaps.len(),
            ..Default::default()
        };

        for fact in &state.facts {
            if !fact.is_live() {
                stats.removed_facts += 1;
                continue;
            }
            if fact.is_confirmed() {
                stats.confirmed_facts += 1;
            }
            *stats.by_domain.entry(fact.domain.clone()).or_insert(0) += 1;
            *stats.by_entity.entry(fact.entity.to_string()).or_insert(0) += 1;
            *stats.by_status.entry(fact.status.to_string()).or_insert(0) += 1;
        }
        for gap in &state.gaps {
            *stats.gaps_by_importance.entry(gap.importance.to_string()).or_insert(0) += 1;
        }

        stats
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Snapshot the registry as a persistable document
    pub fn to_document(&self) -> RegistryDocument {
        let state = self.state.read();
        RegistryDocument {
            metadata: DocumentMetadata {
                created_at: state.created_at,
                version: FORMAT_VERSION.to_string(),
                saved_at: Some(Utc::now()),
                fact_count: state.facts.len(),
                gap_count: state.gaps.len(),
                fact_counters: state.allocator.counters(IdKind::Fact).clone(),
                gap_counters: state.allocator.counters(IdKind::Gap).clone(),
            },
            facts: state.facts.clone(),
            gaps: state.gaps.clone(),
            discovery_complete: state.locks.states().clone(),
        }
    }

    /// Rebuild a registry from a document
    ///
    /// Indexes are rebuilt and counters are derived from the ids actually
    /// present (never lowered below the persisted counters). Ids that do not
    /// parse are logged and kept. A repeated id keeps its first record.
    pub fn from_document(document: RegistryDocument, config: RegistryConfig) -> Self {
        let mut state = RegistryState::new();
        state.created_at = document.metadata.created_at;

        for fact in document.facts {
            let id = fact.id.clone();
            if !state.import_fact(fact) {
                tracing::warn!(id = %id, "Repeated fact id in document; keeping first occurrence");
            }
        }
        for gap in document.gaps {
            let id = gap.id.clone();
            if !state.import_gap(gap) {
                tracing::warn!(id = %id, "Repeated gap id in document; keeping first occurrence");
            }
        }

        state
            .allocator
            .restore_counters(IdKind::Fact, &document.metadata.fact_counters);
        state
            .allocator
            .restore_counters(IdKind::Gap, &document.metadata.gap_counters);
        state.locks = EntityLockGate::from_states(document.discovery_complete);

        Self {
            state: RwLock::new(state),
            config,
        }
    }

    /// Write the registry to a JSON file
    ///
    /// The snapshot is taken under the read guard; the file is written after
    /// the guard is released.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        let json = self.to_document().to_json()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, json)?;

        tracing::info!(path = %path.display(), "Saved registry");
        Ok(())
    }

    /// Load a registry from a JSON file with the default configuration
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::load_with_config(path, RegistryConfig::default())
    }

    /// Load a registry from a JSON file
    pub fn load_with_config<P: AsRef<Path>>(path: P, config: RegistryConfig) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let document = RegistryDocument::from_json(&contents)?;
        let registry = Self::from_document(document, config);

        tracing::info!(
            path = %path.display(),
            facts = registry.fact_count(),
            gaps = registry.gap_count(),
            "Loaded registry"
        );
        Ok(registry)
    }
}

impl FactStore for FactRegistry {
    type Error = StoreError;

    fn add_fact(&self, fact: NewFact) -> Result<String, Self::Error> {
        FactRegistry::add_fact(self, fact)
    }

    fn get_fact(&self, id: &str) -> Option<Fact> {
        self.state.read().fact(id).cloned()
    }

    fn query_facts(&self, query: &FactQuery) -> Vec<Fact> {
        self.state
            .read()
            .facts
            .iter()
            .filter(|f| query.matches(f))
            .cloned()
            .collect()
    }

    fn replace_fact(&self, mut fact: Fact) -> Result<(), Self::Error> {
        let mut state = self.state.write();
        let slot = state
            .fact_mut(&fact.id)
            .ok_or_else(|| StoreError::NotFound(fact.id.clone()))?;
        fact.refresh_confidence();
        *slot = fact;
        Ok(())
    }

    fn mark_removed(&self, id: &str) -> Result<(), Self::Error> {
        let mut state = self.state.write();
        let fact = state
            .fact_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let now = Utc::now();
        fact.removed = true;
        fact.removed_at = Some(now);
        fact.updated_at = now;
        tracing::info!(id, "Fact marked removed");
        Ok(())
    }
}

// `query_facts` and `get_fact` are also useful without importing the trait
impl FactRegistry {
    /// Facts matching a query
    pub fn query_facts(&self, query: &FactQuery) -> Vec<Fact> {
        <Self as FactStore>::query_facts(self, query)
    }

    /// Look up a fact by id
    pub fn get_fact(&self, id: &str) -> Option<Fact> {
        <Self as FactStore>::get_fact(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_domain::Evidence;

    fn infra(item: &str, entity: Entity) -> NewFact {
        NewFact::new("infrastructure", "compute", item, entity)
            .with_evidence(Evidence::new(format!("{item} is in production"), "3.2"))
    }

    #[test]
    fn test_add_and_get() {
        let registry = FactRegistry::new();
        let id = registry.add_fact(infra("ESXi hosts", Entity::Target)).unwrap();
        assert_eq!(id, "F-INFRA-001");

        let record = registry.get(&id).unwrap();
        let fact = record.as_fact().unwrap();
        assert_eq!(fact.item, "ESXi hosts");
        assert_eq!(fact.domain, "infrastructure");
        assert!(registry.get("F-INFRA-999").is_none());
    }

    #[test]
    fn test_domain_is_validated_and_normalized() {
        let registry = FactRegistry::new();
        let err = registry
            .add_fact(NewFact::new("marketing", "brand", "Logo", Entity::Target))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidDomain { .. }));

        let id = registry
            .add_fact(NewFact::new(" Network ", "wan", "MPLS", Entity::Buyer))
            .unwrap();
        assert_eq!(id, "F-NET-001");
        assert_eq!(registry.get_fact(&id).unwrap().domain, "network");
    }

    #[test]
    fn test_gaps_have_own_space() {
        let registry = FactRegistry::new();
        registry.add_fact(infra("SAN", Entity::Target)).unwrap();
        let gap = registry
            .add_gap("infrastructure", "backup", "No backup policy", Importance::High)
            .unwrap();
        assert_eq!(gap, "G-INFRA-001");
        assert!(matches!(registry.get(&gap), Some(Record::Gap(_))));
        assert!(registry.add_gap("finance", "x", "y", Importance::Low).is_err());
    }

    #[test]
    fn test_lock_rejects_adds() {
        let registry = FactRegistry::new();
        registry.add_fact(infra("SAN", Entity::Target)).unwrap();
        assert!(registry.lock(Entity::Target));
        assert!(!registry.lock(Entity::Target));

        let err = registry.add_fact(infra("NAS", Entity::Target)).unwrap_err();
        assert!(err.is_locked());

        // Gaps are not entity-scoped
        assert!(registry
            .add_entity_gap("infrastructure", "dr", "No DR", Importance::Critical, Entity::Target)
            .is_ok());
    }

    #[test]
    fn test_confirm_fact() {
        let registry = FactRegistry::new();
        let id = registry.add_fact(infra("SAN", Entity::Target)).unwrap();
        registry.confirm_fact(&id, "analyst-7", "Checked against CMDB").unwrap();

        let fact = registry.get_fact(&id).unwrap();
        assert!(fact.is_confirmed());
        assert_eq!(fact.verified_by.as_deref(), Some("analyst-7"));
        assert_eq!(fact.verification_note, "Checked against CMDB");
        assert!(fact.confidence_score >= 0.9);

        assert!(matches!(
            registry.confirm_fact("F-INFRA-404", "a", ""),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_removed_facts_hidden_from_partition_views() {
        let registry = FactRegistry::new();
        let id = registry.add_fact(infra("SAN", Entity::Target)).unwrap();
        registry.add_fact(infra("NAS", Entity::Target)).unwrap();
        registry.mark_removed(&id).unwrap();

        assert_eq!(registry.facts_for(Entity::Target, None).len(), 1);
        assert_eq!(registry.get_all_facts().len(), 2);
        assert!(registry.get_fact(&id).unwrap().removed);

        let stats = registry.stats();
        assert_eq!(stats.total_facts, 2);
        assert_eq!(stats.removed_facts, 1);
        assert_eq!(stats.by_entity["target"], 1);
    }

    #[test]
    fn test_replace_fact_requires_existing_id() {
        let registry = FactRegistry::new();
        let id = registry.add_fact(infra("SAN", Entity::Target)).unwrap();
        let mut fact = registry.get_fact(&id).unwrap();
        fact.item = "SAN array".to_string();
        registry.replace_fact(fact.clone()).unwrap();
        assert_eq!(registry.get_fact(&id).unwrap().item, "SAN array");

        fact.id = "F-INFRA-050".to_string();
        assert!(registry.replace_fact(fact).is_err());
    }

    #[test]
    fn test_validate_citations_accepts_gaps() {
        let registry = FactRegistry::new();
        let fact = registry.add_fact(infra("SAN", Entity::Target)).unwrap();
        let gap = registry
            .add_gap("infrastructure", "dr", "No DR", Importance::Critical)
            .unwrap();

        let report = registry.validate_citations([fact.as_str(), gap.as_str(), "F-INFRA-404"]);
        assert_eq!(report.valid.len(), 2);
        assert_eq!(report.invalid, vec!["F-INFRA-404"]);
    }
}
