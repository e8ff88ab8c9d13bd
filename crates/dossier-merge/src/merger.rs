//! Incremental merge of re-extracted facts into an existing registry

use crate::conflict::{Conflict, ConflictQueue, ConflictType, FieldConflicts, Resolution};
use crate::types::{FactCandidate, FailedCandidate, MergeAction, MergeDecision, MergeResult};
use crate::{MergeConfig, MergeError};
use chrono::Utc;
use dossier_domain::fact::value_to_string;
use dossier_domain::{similarity, Fact, FactQuery, FactStore, NewFact, VerificationStatus};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt::Display;

/// Marker placed at the front of a verification note when the merger refreshes a fact
pub const UPDATED_MARKER: &str = "[UPDATED]";

/// Field name used for removal conflicts
pub const REMOVED_FIELD: &str = "removed";

/// Reconciles new extractions with a registry without losing human review
///
/// Pending facts are refreshed freely. A confirmed fact is refreshed in place
/// (keeping its verification) only by a document it was already recorded
/// from; a disagreeing new source becomes a [`Conflict`] that waits for
/// [`resolve`](Self::resolve).
pub struct IncrementalMerger<'a, S: FactStore> {
    store: &'a S,
    config: MergeConfig,
    queue: ConflictQueue,
}

impl<'a, S> IncrementalMerger<'a, S>
where
    S: FactStore,
    S::Error: Display,
{
    /// Create a merger over `store` with an empty conflict queue
    pub fn new(store: &'a S, config: MergeConfig) -> Self {
        Self::with_queue(store, config, ConflictQueue::new())
    }

    /// Create a merger that continues an existing conflict queue
    pub fn with_queue(store: &'a S, config: MergeConfig, queue: ConflictQueue) -> Self {
        Self { store, config, queue }
    }

    /// The merger's configuration
    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Every conflict seen so far
    pub fn queue(&self) -> &ConflictQueue {
        &self.queue
    }

    /// Give back the conflict queue, e.g. to persist it
    pub fn into_queue(self) -> ConflictQueue {
        self.queue
    }

    /// Conflicts awaiting review
    pub fn get_pending_conflicts(&self) -> Vec<&Conflict> {
        self.queue.pending()
    }

    /// Weighted match score between an existing fact and a candidate
    ///
    /// The evidence term contributes nothing unless both sides carry a quote.
    pub fn match_score(&self, existing: &Fact, candidate: &NewFact) -> f64 {
        let item = similarity(&existing.item, &candidate.item);
        let evidence = if existing.evidence.has_quote() && candidate.evidence.has_quote() {
            similarity(&existing.evidence.exact_quote, &candidate.evidence.exact_quote)
        } else {
            0.0
        };
        self.config.item_weight * item + self.config.evidence_weight * evidence
    }

    /// Best-scoring live fact of the same entity, domain and category
    ///
    /// Returns `None` unless the best score reaches the match threshold.
    /// Ties keep the earliest fact.
    pub fn find_match(&self, candidate: &NewFact) -> Option<(Fact, f64)> {
        let query = FactQuery {
            entity: Some(candidate.entity),
            domain: Some(candidate.domain.clone()),
            category: Some(candidate.category.clone()),
            ..Default::default()
        };

        let mut best: Option<(Fact, f64)> = None;
        for fact in self.store.query_facts(&query) {
            let score = self.match_score(&fact, candidate);
            if score < self.config.match_threshold {
                continue;
            }
            if best.as_ref().map_or(true, |(_, top)| score > *top) {
                best = Some((fact, score));
            }
        }
        best
    }

    /// Decide what to do with one candidate, without changing anything
    ///
    /// - no match: `Add`
    /// - same source document: `Skip` if item/status/details are identical,
    ///   else `Update` (verification is kept either way)
    /// - new source, pending match: `Update`
    /// - new source, confirmed match: `Conflict` if any field differs, else `Skip`
    pub fn determine_action(&self, candidate: &FactCandidate, source_document: &str) -> MergeDecision {
        let source = effective_source(source_document, &candidate.fact);
        let new = &candidate.fact;

        let by_id = candidate
            .id
            .as_deref()
            .and_then(|id| self.store.get_fact(id))
            .filter(Fact::is_live)
            .map(|fact| (fact, 1.0));
        let Some((existing, score)) = by_id.or_else(|| self.find_match(new)) else {
            return MergeDecision::add(0.0);
        };

        if existing.has_source(&source) {
            let action = if existing.same_content(&new.item, new.status, &new.details) {
                MergeAction::Skip
            } else {
                MergeAction::Update
            };
            return MergeDecision::matched(action, &existing.id, score);
        }

        if !existing.is_confirmed() {
            return MergeDecision::matched(MergeAction::Update, &existing.id, score);
        }

        match self.detect_conflict(&existing, new, &source) {
            Some(conflict) => MergeDecision::conflict(conflict, score),
            None => MergeDecision::matched(MergeAction::Skip, &existing.id, score),
        }
    }

    /// Field-level diff between a confirmed fact and new data
    ///
    /// Compares item, status, each incoming detail key (as text; a missing
    /// key counts as empty) and evidence similarity. Returns `None` when
    /// nothing differs.
    pub fn detect_conflict(&self, existing: &Fact, new: &NewFact, source_document: &str) -> Option<Conflict> {
        let mut fields = FieldConflicts::new();

        if existing.item != new.item {
            fields.insert(
                "item".to_string(),
                (Value::String(existing.item.clone()), Value::String(new.item.clone())),
            );
        }

        if existing.status != new.status {
            fields.insert(
                "status".to_string(),
                (
                    Value::String(existing.status.to_string()),
                    Value::String(new.status.to_string()),
                ),
            );
        }

        for (key, value) in &new.details {
            let old = existing
                .details
                .get(key)
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()));
            if value_to_string(&old) != value_to_string(value) {
                fields.insert(format!("details.{}", key), (old, value.clone()));
            }
        }

        if existing.evidence.has_quote() && new.evidence.has_quote() {
            let score = similarity(&existing.evidence.exact_quote, &new.evidence.exact_quote);
            if score < self.config.evidence_conflict_threshold {
                fields.insert(
                    "evidence".to_string(),
                    (
                        Value::String(existing.evidence.exact_quote.clone()),
                        Value::String(new.evidence.exact_quote.clone()),
                    ),
                );
            }
        }

        if fields.is_empty() {
            return None;
        }

        let conflict_type = if fields.len() == 1 && fields.contains_key("evidence") {
            ConflictType::Evidence
        } else {
            ConflictType::Value
        };

        Some(Conflict::new(
            &existing.id,
            conflict_type,
            fields,
            Some(new.clone()),
            source_document,
        ))
    }

    /// Apply new data on top of an existing fact
    ///
    /// Id, entity, domain, category and the verification fields are kept.
    /// Incoming details are overlaid key by key; evidence is replaced only
    /// when the new data carries a quote.
    pub fn apply_update(&self, existing: &Fact, new: &NewFact, source_document: &str) -> Fact {
        let mut updated = existing.clone();
        updated.item = new.item.clone();
        updated.status = new.status;
        for (key, value) in &new.details {
            updated.details.insert(key.clone(), value.clone());
        }
        if new.evidence.has_quote() {
            updated.evidence = new.evidence.clone();
        }
        updated.verification_note = mark_updated(&existing.verification_note);
        updated.add_source(source_document);
        updated.updated_at = Utc::now();
        updated.refresh_confidence();
        updated
    }

    /// Merge one document's extraction into the store
    ///
    /// Each candidate is decided independently and applied through the
    /// store, so a failure part way leaves earlier candidates applied. A
    /// candidate the store rejects (for example a locked entity) lands in
    /// [`MergeResult::failed`].
    ///
    /// With `remove_missing`, live facts whose source is exactly
    /// `source_document` and that nothing in the batch matched are marked
    /// removed, or raise a removal conflict when confirmed.
    pub fn merge_document_facts(
        &mut self,
        candidates: impl IntoIterator<Item = FactCandidate>,
        source_document: &str,
        remove_missing: bool,
    ) -> Result<MergeResult, MergeError> {
        let document = source_document.trim();
        let mut result = MergeResult::default();
        let mut matched: HashSet<String> = HashSet::new();

        for mut candidate in candidates {
            if !document.is_empty() {
                candidate.fact.source_document = document.to_string();
            }
            let source = effective_source(document, &candidate.fact);
            let decision = self.determine_action(&candidate, &source);
            tracing::debug!(
                item = %candidate.fact.item,
                action = ?decision.action,
                existing = ?decision.existing_id,
                score = decision.score,
                "Merge decision"
            );

            if let Some(id) = &decision.existing_id {
                matched.insert(id.clone());
            }

            match decision.action {
                MergeAction::Add => match self.store.add_fact(candidate.fact.clone()) {
                    Ok(id) => {
                        matched.insert(id.clone());
                        result.added.push(id);
                    }
                    Err(e) => {
                        tracing::warn!(item = %candidate.fact.item, error = %e, "Candidate rejected by store");
                        result.failed.push(FailedCandidate {
                            item: candidate.fact.item.clone(),
                            reason: e.to_string(),
                        });
                    }
                },
                MergeAction::Update => {
                    let id = decision.existing_id.unwrap_or_default();
                    match self.update_fact(&id, &candidate.fact, &source) {
                        Ok(()) => result.updated.push(id),
                        Err(e) => {
                            tracing::warn!(id = %id, error = %e, "Update failed");
                            result.failed.push(FailedCandidate {
                                item: candidate.fact.item.clone(),
                                reason: e.to_string(),
                            });
                        }
                    }
                }
                MergeAction::Skip => {
                    result.skipped.extend(decision.existing_id);
                }
                MergeAction::Conflict => {
                    if let Some(conflict) = decision.conflict {
                        self.queue_conflict(conflict, &mut result);
                    }
                }
            }
        }

        if remove_missing {
            if document.is_empty() {
                tracing::warn!("remove_missing requested without a source document; nothing removed");
            } else {
                self.remove_unmatched(document, &matched, &mut result)?;
            }
        }

        tracing::info!(document, "{}", result.summary());
        Ok(result)
    }

    /// Apply a reviewer's decision to a queued conflict
    ///
    /// - `keep_existing`: no data change, audit note only
    /// - `use_new`: apply the new data (or the removal) and return the fact to pending
    /// - `merge`: join differing values with the configured separator, keep verification
    ///
    /// Resolving an already-resolved conflict is allowed and overwrites its
    /// resolution fields. Returns the fact as stored afterwards.
    pub fn resolve(
        &mut self,
        conflict_id: &str,
        resolution: Resolution,
        resolved_by: &str,
        notes: &str,
    ) -> Result<Fact, MergeError> {
        let conflict = self
            .queue
            .get(conflict_id)
            .cloned()
            .ok_or_else(|| MergeError::ConflictNotFound(conflict_id.to_string()))?;
        let existing = self
            .store
            .get_fact(&conflict.fact_id)
            .ok_or_else(|| MergeError::FactMissing(conflict.fact_id.clone()))?;
        let now = Utc::now();

        let mut fact = match resolution {
            Resolution::Unresolved => {
                return Err(MergeError::InvalidResolution(
                    "a conflict cannot be resolved as 'unresolved'".to_string(),
                ));
            }
            Resolution::KeepExisting => existing,
            Resolution::UseNew => {
                let mut fact = match (conflict.conflict_type, &conflict.new_data) {
                    (ConflictType::Removed, _) => {
                        let mut fact = existing;
                        fact.removed = true;
                        fact.removed_at = Some(now);
                        fact
                    }
                    (_, Some(new)) => self.apply_update(&existing, new, &conflict.source_document),
                    (_, None) => {
                        return Err(MergeError::InvalidResolution(format!(
                            "conflict {} carries no new data",
                            conflict.id
                        )));
                    }
                };
                fact.verification_status = VerificationStatus::Pending;
                fact.verified_by = None;
                fact.verified_at = None;
                fact
            }
            Resolution::Merge => {
                let mut fact = existing;
                self.merge_fields(&mut fact, &conflict);
                fact
            }
        };

        let mut entry = format!("[CONFLICT {}: {} by {}]", conflict.conflict_type, resolution, resolved_by);
        if !notes.trim().is_empty() {
            entry = format!("{} {}", entry, notes.trim());
        }
        fact.verification_note = append_note(&fact.verification_note, &entry);
        fact.updated_at = now;
        fact.refresh_confidence();
        self.store.replace_fact(fact.clone()).map_err(MergeError::store)?;

        if let Some(queued) = self.queue.get_mut(conflict_id) {
            queued.resolution = resolution;
            queued.resolved_by = Some(resolved_by.to_string());
            queued.resolved_at = Some(now);
            queued.resolution_notes = notes.to_string();
        }

        tracing::info!(
            conflict = conflict_id,
            fact = %fact.id,
            resolution = %resolution,
            by = resolved_by,
            "Conflict resolved"
        );
        Ok(fact)
    }

    fn update_fact(&self, id: &str, new: &NewFact, source: &str) -> Result<(), MergeError> {
        let existing = self
            .store
            .get_fact(id)
            .ok_or_else(|| MergeError::FactMissing(id.to_string()))?;
        let updated = self.apply_update(&existing, new, source);
        self.store.replace_fact(updated).map_err(MergeError::store)
    }

    fn queue_conflict(&mut self, conflict: Conflict, result: &mut MergeResult) {
        if self.queue.push(conflict.clone()) {
            tracing::warn!(
                fact = %conflict.fact_id,
                conflict = %conflict.id,
                kind = %conflict.conflict_type,
                fields = ?conflict.field_conflicts.keys().collect::<Vec<_>>(),
                "Conflict queued for review"
            );
            result.conflicts.push(conflict);
        } else {
            tracing::debug!(fact = %conflict.fact_id, "Identical conflict already pending");
            result.skipped.push(conflict.fact_id);
        }
    }

    fn remove_unmatched(
        &mut self,
        document: &str,
        matched: &HashSet<String>,
        result: &mut MergeResult,
    ) -> Result<(), MergeError> {
        let query = FactQuery {
            source_document: Some(document.to_string()),
            ..Default::default()
        };

        for fact in self.store.query_facts(&query) {
            if matched.contains(&fact.id) {
                continue;
            }
            if fact.is_confirmed() {
                let mut fields = FieldConflicts::new();
                fields.insert(REMOVED_FIELD.to_string(), (Value::Bool(false), Value::Bool(true)));
                let conflict = Conflict::new(&fact.id, ConflictType::Removed, fields, None, document);
                self.queue_conflict(conflict, result);
            } else {
                self.store.mark_removed(&fact.id).map_err(MergeError::store)?;
                result.removed.push(fact.id);
            }
        }
        Ok(())
    }

    fn merge_fields(&self, fact: &mut Fact, conflict: &Conflict) {
        let separator = self.config.merge_separator.as_str();
        for (field, (old, new)) in &conflict.field_conflicts {
            let joined = join_values(old, new, separator);
            match field.as_str() {
                "item" => fact.item = joined,
                "evidence" => fact.evidence.exact_quote = joined,
                other => {
                    // Status and removal keep the existing value
                    if let Some(key) = other.strip_prefix("details.") {
                        fact.details.insert(key.to_string(), Value::String(joined));
                    }
                }
            }
        }
        if conflict.conflict_type != ConflictType::Removed {
            fact.add_source(&conflict.source_document);
        }
    }
}

/// Batch document if given, else whatever the candidate recorded
fn effective_source(batch_document: &str, candidate: &NewFact) -> String {
    let batch_document = batch_document.trim();
    if batch_document.is_empty() {
        candidate.source_document.trim().to_string()
    } else {
        batch_document.to_string()
    }
}

fn mark_updated(note: &str) -> String {
    let note = note.trim();
    if note.starts_with(UPDATED_MARKER) {
        note.to_string()
    } else if note.is_empty() {
        UPDATED_MARKER.to_string()
    } else {
        format!("{} {}", UPDATED_MARKER, note)
    }
}

fn append_note(note: &str, entry: &str) -> String {
    let note = note.trim();
    if note.is_empty() {
        entry.to_string()
    } else {
        format!("{} {}", note, entry)
    }
}

fn join_values(old: &Value, new: &Value, separator: &str) -> String {
    let old = value_to_string(old);
    let new = value_to_string(new);
    if old.is_empty() || old == new {
        new
    } else if new.is_empty() {
        old
    } else {
        format!("{}{}{}", old, separator, new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_domain::{Entity, Evidence, FactStatus, IdKind};
    use std::cell::RefCell;

    /// Minimal single-threaded store
    #[derive(Default)]
    struct MemoryStore {
        facts: RefCell<Vec<Fact>>,
    }

    impl FactStore for MemoryStore {
        type Error = String;

        fn add_fact(&self, fact: NewFact) -> Result<String, String> {
            let mut facts = self.facts.borrow_mut();
            let id = IdKind::Fact.format("TEST", facts.len() as u32 + 1);
            facts.push(fact.into_fact(id.clone(), Utc::now()));
            Ok(id)
        }

        fn get_fact(&self, id: &str) -> Option<Fact> {
            self.facts.borrow().iter().find(|f| f.id == id).cloned()
        }

        fn query_facts(&self, query: &FactQuery) -> Vec<Fact> {
            self.facts.borrow().iter().filter(|f| query.matches(f)).cloned().collect()
        }

        fn replace_fact(&self, fact: Fact) -> Result<(), String> {
            let mut facts = self.facts.borrow_mut();
            let slot = facts
                .iter_mut()
                .find(|f| f.id == fact.id)
                .ok_or_else(|| format!("no fact {}", fact.id))?;
            *slot = fact;
            Ok(())
        }

        fn mark_removed(&self, id: &str) -> Result<(), String> {
            let mut facts = self.facts.borrow_mut();
            let fact = facts
                .iter_mut()
                .find(|f| f.id == id)
                .ok_or_else(|| format!("no fact {}", id))?;
            fact.removed = true;
            Ok(())
        }
    }

    fn backup(quote: &str) -> NewFact {
        NewFact::new("infrastructure", "backup", "Backup platform", Entity::Target)
            .with_evidence(Evidence::new(quote, "4.2"))
    }

    #[test]
    fn test_match_score_weights() {
        let store = MemoryStore::default();
        let merger = IncrementalMerger::new(&store, MergeConfig::default());
        let existing = backup("Backups run nightly with Veeam to an offsite repository")
            .into_fact("F-TEST-001".to_string(), Utc::now());

        let same = backup("Backups run nightly with Veeam to an offsite repository");
        assert!((merger.match_score(&existing, &same) - 1.0).abs() < 1e-9);

        // No evidence on the candidate: only the item term counts
        let bare = NewFact::new("infrastructure", "backup", "Backup platform", Entity::Target);
        assert!((merger.match_score(&existing, &bare) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_add_then_skip_same_document() {
        let store = MemoryStore::default();
        let mut merger = IncrementalMerger::new(&store, MergeConfig::default());
        let quote = "Backups run nightly with Veeam to an offsite repository";

        let first = merger
            .merge_document_facts(vec![FactCandidate::new(backup(quote))], "dr_plan.pdf", false)
            .unwrap();
        assert_eq!(first.added, vec!["F-TEST-001"]);

        let second = merger
            .merge_document_facts(vec![FactCandidate::new(backup(quote))], "dr_plan.pdf", false)
            .unwrap();
        assert_eq!(second.skipped, vec!["F-TEST-001"]);
        assert!(second.is_noop());
    }

    #[test]
    fn test_evidence_only_conflict() {
        let store = MemoryStore::default();
        let id = store
            .add_fact(backup("Backups run nightly with Veeam to an offsite repository"))
            .unwrap();
        let mut confirmed = store.get_fact(&id).unwrap();
        confirmed.verification_status = VerificationStatus::Confirmed;
        store.replace_fact(confirmed).unwrap();

        let merger = IncrementalMerger::new(&store, MergeConfig::default());
        let candidate = FactCandidate::new(backup("Backups run weekly with Commvault to tape"));
        let decision = merger.determine_action(&candidate, "dr_plan_v2.pdf");

        assert_eq!(decision.action, MergeAction::Conflict);
        let conflict = decision.conflict.unwrap();
        assert_eq!(conflict.conflict_type, ConflictType::Evidence);
        assert_eq!(conflict.field_conflicts.keys().collect::<Vec<_>>(), vec!["evidence"]);
    }

    #[test]
    fn test_candidate_id_bypasses_similarity() {
        let store = MemoryStore::default();
        let id = store.add_fact(backup("Veeam")).unwrap();
        let merger = IncrementalMerger::new(&store, MergeConfig::default());

        let renamed = NewFact::new("infrastructure", "backup", "Tape rotation", Entity::Target)
            .with_status(FactStatus::Partial);
        let decision = merger.determine_action(&FactCandidate::with_id(&id, renamed.clone()), "x.pdf");
        assert_eq!(decision.action, MergeAction::Update);
        assert_eq!(decision.existing_id.as_deref(), Some(id.as_str()));

        let decision = merger.determine_action(&FactCandidate::new(renamed), "x.pdf");
        assert_eq!(decision.action, MergeAction::Add);
    }

    #[test]
    fn test_update_preserves_review_fields() {
        let store = MemoryStore::default();
        let merger = IncrementalMerger::new(&store, MergeConfig::default());
        let mut existing = backup("Veeam nightly")
            .from_document("a.pdf")
            .into_fact("F-TEST-001".to_string(), Utc::now());
        existing.verification_note = "Spot-checked".to_string();
        existing.verified_by = Some("analyst-2".to_string());

        let new = backup("Veeam nightly, replicated weekly").with_detail("retention", "30 days");
        let updated = merger.apply_update(&existing, &new, "b.pdf");

        assert_eq!(updated.id, existing.id);
        assert_eq!(updated.verification_note, "[UPDATED] Spot-checked");
        assert_eq!(updated.verified_by.as_deref(), Some("analyst-2"));
        assert_eq!(updated.source_document, "a.pdf, b.pdf");
        assert_eq!(updated.details["retention"], "30 days");
        assert_eq!(updated.evidence.exact_quote, "Veeam nightly, replicated weekly");

        // A second refresh does not stack markers
        let again = merger.apply_update(&updated, &new, "b.pdf");
        assert_eq!(again.verification_note, "[UPDATED] Spot-checked");
        assert_eq!(again.source_document, "a.pdf, b.pdf");
    }

    #[test]
    fn test_join_values() {
        use serde_json::json;
        assert_eq!(join_values(&json!("VMware"), &json!("Nutanix"), " | "), "VMware | Nutanix");
        assert_eq!(join_values(&json!(""), &json!("Nutanix"), " | "), "Nutanix");
        assert_eq!(join_values(&json!(12), &json!(12), " | "), "12");
    }
}
