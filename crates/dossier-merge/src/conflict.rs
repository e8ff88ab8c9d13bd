//! Conflict records and the queue that holds them between review sessions
//!
//! A conflict ties one existing, human-confirmed fact to a field-level diff
//! against newly extracted data. Conflicts are never resolved automatically;
//! they wait in a [`ConflictQueue`] until someone calls
//! [`IncrementalMerger::resolve`](crate::IncrementalMerger::resolve).

use chrono::{DateTime, Utc};
use dossier_domain::NewFact;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

/// Old and new value of one differing field
pub type FieldConflict = (Value, Value);

/// Field-level diff keyed by field name (`item`, `status`, `details.vendor`, `evidence`)
pub type FieldConflicts = IndexMap<String, FieldConflict>;

/// What kind of disagreement a conflict records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    /// Item, status or detail values differ
    Value,
    /// Only the supporting quote differs
    Evidence,
    /// A confirmed fact vanished from its reprocessed source document
    Removed,
}

impl ConflictType {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictType::Value => "value",
            ConflictType::Evidence => "evidence",
            ConflictType::Removed => "removed",
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolution outcome of a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Awaiting review
    #[default]
    Unresolved,
    /// Keep the confirmed fact as is
    KeepExisting,
    /// Take the new data and return the fact to pending review
    UseNew,
    /// Concatenate old and new values for manual disambiguation
    Merge,
}

impl Resolution {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Unresolved => "unresolved",
            Resolution::KeepExisting => "keep_existing",
            Resolution::UseNew => "use_new",
            Resolution::Merge => "merge",
        }
    }

    /// Parse from a string (case-insensitive, `-` accepted for `_`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "unresolved" => Some(Resolution::Unresolved),
            "keep_existing" | "keep" => Some(Resolution::KeepExisting),
            "use_new" | "new" => Some(Resolution::UseNew),
            "merge" => Some(Resolution::Merge),
            _ => None,
        }
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resolution::parse(s).ok_or_else(|| {
            format!("unknown resolution '{}': expected keep_existing, use_new or merge", s)
        })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field-level disagreement awaiting human review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    /// Conflict id (UUID v7, time-ordered)
    pub id: String,

    /// Existing fact the conflict is about
    pub fact_id: String,

    /// Kind of disagreement
    pub conflict_type: ConflictType,

    /// `{field: (old, new)}`
    pub field_conflicts: FieldConflicts,

    /// Incoming data; absent for removal conflicts
    #[serde(default)]
    pub new_data: Option<NewFact>,

    /// Document the incoming data came from
    #[serde(default)]
    pub source_document: String,

    /// When the conflict was detected
    pub detected_at: DateTime<Utc>,

    /// Resolution outcome
    #[serde(default)]
    pub resolution: Resolution,

    /// Who resolved it
    #[serde(default)]
    pub resolved_by: Option<String>,

    /// When it was resolved
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,

    /// Reviewer notes
    #[serde(default)]
    pub resolution_notes: String,
}

impl Conflict {
    /// Create an unresolved conflict with a fresh id
    pub fn new(
        fact_id: impl Into<String>,
        conflict_type: ConflictType,
        field_conflicts: FieldConflicts,
        new_data: Option<NewFact>,
        source_document: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            fact_id: fact_id.into(),
            conflict_type,
            field_conflicts,
            new_data,
            source_document: source_document.into(),
            detected_at: Utc::now(),
            resolution: Resolution::Unresolved,
            resolved_by: None,
            resolved_at: None,
            resolution_notes: String::new(),
        }
    }

    /// Whether a reviewer has acted on the conflict
    pub fn is_resolved(&self) -> bool {
        self.resolution != Resolution::Unresolved
    }

    /// Whether `other` reports the same diff against the same fact
    pub fn same_diff(&self, other: &Conflict) -> bool {
        self.fact_id == other.fact_id
            && self.conflict_type == other.conflict_type
            && self.field_conflicts == other.field_conflicts
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct QueueDocument {
    #[serde(default)]
    conflicts: Vec<Conflict>,
}

/// Ordered collection of detected conflicts
///
/// Resolved conflicts stay in the queue as an audit trail.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictQueue {
    conflicts: Vec<Conflict>,
}

impl ConflictQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a conflict
    ///
    /// Returns `false` (and drops the conflict) when an unresolved conflict
    /// with the same diff against the same fact is already queued.
    pub fn push(&mut self, conflict: Conflict) -> bool {
        if self.find_equivalent(&conflict).is_some() {
            return false;
        }
        self.conflicts.push(conflict);
        true
    }

    /// Unresolved conflict reporting the same diff, if any
    pub fn find_equivalent(&self, conflict: &Conflict) -> Option<&Conflict> {
        self.conflicts
            .iter()
            .find(|c| !c.is_resolved() && c.same_diff(conflict))
    }

    /// Look up a conflict by id
    pub fn get(&self, id: &str) -> Option<&Conflict> {
        self.conflicts.iter().find(|c| c.id == id)
    }

    /// Mutable lookup by id
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Conflict> {
        self.conflicts.iter_mut().find(|c| c.id == id)
    }

    /// Unresolved conflicts in detection order
    pub fn pending(&self) -> Vec<&Conflict> {
        self.conflicts.iter().filter(|c| !c.is_resolved()).collect()
    }

    /// Every conflict, resolved ones included
    pub fn all(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Number of queued conflicts
    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Write the queue to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), crate::MergeError> {
        let path = path.as_ref();
        let document = QueueDocument {
            conflicts: self.conflicts.clone(),
        };
        let json = serde_json::to_string_pretty(&document)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, json)?;
        tracing::debug!(path = %path.display(), conflicts = self.conflicts.len(), "Saved conflict queue");
        Ok(())
    }

    /// Read a queue from a JSON file; a missing file yields an empty queue
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, crate::MergeError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let contents = fs::read_to_string(path)?;
        let document: QueueDocument = serde_json::from_str(&contents)?;
        Ok(Self {
            conflicts: document.conflicts,
        })
    }
}

impl FromIterator<Conflict> for ConflictQueue {
    fn from_iter<I: IntoIterator<Item = Conflict>>(iter: I) -> Self {
        let mut queue = ConflictQueue::new();
        for conflict in iter {
            queue.push(conflict);
        }
        queue
    }
}
