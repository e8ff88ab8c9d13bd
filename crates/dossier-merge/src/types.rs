//! Merge inputs and outcomes

use crate::Conflict;
use dossier_domain::NewFact;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A freshly extracted fact offered to the merger
///
/// When `id` is set and names an existing live fact, that fact is used as
/// the match directly instead of searching by similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCandidate {
    /// Id of the fact this candidate claims to refresh
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Extracted content
    #[serde(flatten)]
    pub fact: NewFact,
}

impl FactCandidate {
    /// Candidate with no claimed id
    pub fn new(fact: NewFact) -> Self {
        Self { id: None, fact }
    }

    /// Candidate that claims to refresh the fact `id`
    pub fn with_id(id: impl Into<String>, fact: NewFact) -> Self {
        Self {
            id: Some(id.into()),
            fact,
        }
    }
}

impl From<NewFact> for FactCandidate {
    fn from(fact: NewFact) -> Self {
        Self::new(fact)
    }
}

/// What the merger decided to do with one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeAction {
    /// No existing fact matches; add a new one
    Add,
    /// Refresh the matched fact in place
    Update,
    /// Nothing new
    Skip,
    /// Matched a confirmed fact with differing content
    Conflict,
}

impl MergeAction {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeAction::Add => "add",
            MergeAction::Update => "update",
            MergeAction::Skip => "skip",
            MergeAction::Conflict => "conflict",
        }
    }
}

impl fmt::Display for MergeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`IncrementalMerger::determine_action`](crate::IncrementalMerger::determine_action)
#[derive(Debug, Clone, PartialEq)]
pub struct MergeDecision {
    /// Chosen action
    pub action: MergeAction,

    /// Matched fact, for every action except `Add`
    pub existing_id: Option<String>,

    /// Match score of the chosen fact (1.0 for an id match, 0.0 when nothing matched)
    pub score: f64,

    /// Detected conflict when `action` is `Conflict`
    pub conflict: Option<Conflict>,
}

impl MergeDecision {
    pub(crate) fn add(score: f64) -> Self {
        Self {
            action: MergeAction::Add,
            existing_id: None,
            score,
            conflict: None,
        }
    }

    pub(crate) fn matched(action: MergeAction, existing_id: &str, score: f64) -> Self {
        Self {
            action,
            existing_id: Some(existing_id.to_string()),
            score,
            conflict: None,
        }
    }

    pub(crate) fn conflict(conflict: Conflict, score: f64) -> Self {
        Self {
            action: MergeAction::Conflict,
            existing_id: Some(conflict.fact_id.clone()),
            score,
            conflict: Some(conflict),
        }
    }
}

/// A candidate that could not be applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedCandidate {
    /// Candidate item label
    pub item: String,
    /// Why it was rejected
    pub reason: String,
}

/// Outcome of one `merge_document_facts` batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeResult {
    /// Ids of newly added facts
    pub added: Vec<String>,
    /// Ids of facts refreshed in place
    pub updated: Vec<String>,
    /// Ids of matched facts left unchanged
    pub skipped: Vec<String>,
    /// Ids of facts marked removed
    pub removed: Vec<String>,
    /// Candidates rejected by the store
    pub failed: Vec<FailedCandidate>,
    /// Conflicts queued by this batch
    pub conflicts: Vec<Conflict>,
}

impl MergeResult {
    /// One-line summary for logs and CLI output
    pub fn summary(&self) -> String {
        format!(
            "added: {}, updated: {}, skipped: {}, removed: {}, conflicts: {}, failed: {}",
            self.added.len(),
            self.updated.len(),
            self.skipped.len(),
            self.removed.len(),
            self.conflicts.len(),
            self.failed.len()
        )
    }

    /// Whether the batch changed nothing and raised nothing
    pub fn is_noop(&self) -> bool {
        self.added.is_empty()
            && self.updated.is_empty()
            && self.removed.is_empty()
            && self.conflicts.is_empty()
    }
}
