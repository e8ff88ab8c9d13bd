//! Facts and gaps - the citable records of a due-diligence registry

use crate::confidence::compute_confidence;
use crate::{Entity, FactStatus, Importance, VerificationStatus};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered detail map attached to a fact (`vendor`, `version`, `count`, ...)
pub type Details = IndexMap<String, Value>;

/// Quoted source text backing a fact
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Evidence {
    /// Exact text quoted from the source document
    #[serde(default)]
    pub exact_quote: String,

    /// Section of the document the quote came from
    #[serde(default)]
    pub source_section: String,
}

impl Evidence {
    /// Create evidence from a quote and its section
    pub fn new(exact_quote: impl Into<String>, source_section: impl Into<String>) -> Self {
        Self {
            exact_quote: exact_quote.into(),
            source_section: source_section.into(),
        }
    }

    /// Whether a quote is present
    pub fn has_quote(&self) -> bool {
        !self.exact_quote.trim().is_empty()
    }
}

/// An atomic, evidence-backed observation about one party
///
/// The `id` is allocated once by the registry and never reassigned; a fact
/// that disappears from its source is flagged `removed`, not deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Stable citable identifier, e.g. `F-INFRA-001`
    pub id: String,

    /// Domain the fact belongs to (`infrastructure`, `network`, ...)
    pub domain: String,

    /// Free-form category within the domain
    pub category: String,

    /// Short label
    pub item: String,

    /// Structured details
    #[serde(default)]
    pub details: Details,

    /// Documentation status
    #[serde(default)]
    pub status: FactStatus,

    /// Supporting quote
    #[serde(default)]
    pub evidence: Evidence,

    /// Which party the fact describes
    pub entity: Entity,

    /// Originating document(s), comma-joined when refreshed from several
    #[serde(default)]
    pub source_document: String,

    /// Human review state
    #[serde(default)]
    pub verification_status: VerificationStatus,

    /// Reviewer notes and merge audit markers
    #[serde(default)]
    pub verification_note: String,

    /// Reviewer who confirmed the fact
    #[serde(default)]
    pub verified_by: Option<String>,

    /// When the fact was confirmed
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,

    /// Derived score, see [`crate::confidence`]
    #[serde(default)]
    pub confidence_score: f64,

    /// Set when the fact vanished from a reprocessed source
    #[serde(default)]
    pub removed: bool,

    /// When the fact was marked removed
    #[serde(default)]
    pub removed_at: Option<DateTime<Utc>>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Fact {
    /// Recompute the derived confidence score from current content
    pub fn refresh_confidence(&mut self) {
        self.confidence_score = compute_confidence(self.status, &self.evidence, self.verification_status);
    }

    /// Whether a human has confirmed this fact
    pub fn is_confirmed(&self) -> bool {
        self.verification_status == VerificationStatus::Confirmed
    }

    /// Whether the fact is still part of the active data set
    pub fn is_live(&self) -> bool {
        !self.removed
    }

    /// Individual source documents recorded on the fact
    pub fn source_documents(&self) -> Vec<&str> {
        self.source_document
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Whether `document` is among the recorded sources
    pub fn has_source(&self, document: &str) -> bool {
        let document = document.trim();
        !document.is_empty() && self.source_documents().contains(&document)
    }

    /// Append a source document unless already recorded
    pub fn add_source(&mut self, document: &str) {
        let document = document.trim();
        if document.is_empty() || self.has_source(document) {
            return;
        }
        if self.source_document.trim().is_empty() {
            self.source_document = document.to_string();
        } else {
            self.source_document = format!("{}, {}", self.source_document, document);
        }
    }

    /// A detail value rendered as a string
    pub fn detail_str(&self, key: &str) -> Option<String> {
        self.details.get(key).map(value_to_string)
    }

    /// Whether item, status and details are identical to the given content
    pub fn same_content(&self, item: &str, status: FactStatus, details: &Details) -> bool {
        self.item == item && self.status == status && &self.details == details
    }
}

/// Render a JSON detail value as plain text
///
/// Strings are returned unquoted, `null` becomes the empty string and
/// everything else uses its JSON rendering.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Input for adding a fact to a registry
///
/// # Examples
///
/// ```
/// use dossier_domain::{Entity, Evidence, NewFact};
///
/// let fact = NewFact::new("infrastructure", "hosting", "Primary data center", Entity::Target)
///     .with_detail("vendor", "Equinix")
///     .with_evidence(Evidence::new("Hosted at Equinix DA6", "2.1"))
///     .from_document("it_overview.pdf");
/// assert_eq!(fact.details["vendor"], "Equinix");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFact {
    /// Domain name
    pub domain: String,
    /// Category within the domain
    pub category: String,
    /// Short label
    pub item: String,
    /// Structured details
    #[serde(default)]
    pub details: Details,
    /// Documentation status
    #[serde(default)]
    pub status: FactStatus,
    /// Supporting quote
    #[serde(default)]
    pub evidence: Evidence,
    /// Party described
    pub entity: Entity,
    /// Originating document
    #[serde(default)]
    pub source_document: String,
}

impl NewFact {
    /// Create a documented fact with no details or evidence
    pub fn new(
        domain: impl Into<String>,
        category: impl Into<String>,
        item: impl Into<String>,
        entity: Entity,
    ) -> Self {
        Self {
            domain: domain.into(),
            category: category.into(),
            item: item.into(),
            details: Details::new(),
            status: FactStatus::default(),
            evidence: Evidence::default(),
            entity,
            source_document: String::new(),
        }
    }

    /// Add a single detail
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Replace all details
    pub fn with_details(mut self, details: Details) -> Self {
        self.details = details;
        self
    }

    /// Set the documentation status
    pub fn with_status(mut self, status: FactStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach evidence
    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = evidence;
        self
    }

    /// Record the originating document
    pub fn from_document(mut self, document: impl Into<String>) -> Self {
        self.source_document = document.into();
        self
    }

    /// Materialize as a stored fact with the given id
    pub fn into_fact(self, id: String, now: DateTime<Utc>) -> Fact {
        let mut fact = Fact {
            id,
            domain: self.domain,
            category: self.category,
            item: self.item,
            details: self.details,
            status: self.status,
            evidence: self.evidence,
            entity: self.entity,
            source_document: self.source_document.trim().to_string(),
            verification_status: VerificationStatus::Pending,
            verification_note: String::new(),
            verified_by: None,
            verified_at: None,
            confidence_score: 0.0,
            removed: false,
            removed_at: None,
            created_at: now,
            updated_at: now,
        };
        fact.refresh_confidence();
        fact
    }
}

/// An identified absence of information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    /// Stable citable identifier, e.g. `G-INFRA-001`
    pub id: String,

    /// Domain name
    pub domain: String,

    /// Category within the domain
    pub category: String,

    /// What is missing
    pub description: String,

    /// How much the absence matters
    #[serde(default)]
    pub importance: Importance,

    /// Optional display tag; gaps are not partitioned by entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<Entity>,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Anything a citation can point at
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// A fact
    Fact(Fact),
    /// A gap
    Gap(Gap),
}

impl Record {
    /// The record's id
    pub fn id(&self) -> &str {
        match self {
            Record::Fact(fact) => &fact.id,
            Record::Gap(gap) => &gap.id,
        }
    }

    /// The contained fact, if any
    pub fn as_fact(&self) -> Option<&Fact> {
        match self {
            Record::Fact(fact) => Some(fact),
            Record::Gap(_) => None,
        }
    }

    /// The contained gap, if any
    pub fn as_gap(&self) -> Option<&Gap> {
        match self {
            Record::Gap(gap) => Some(gap),
            Record::Fact(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_fact() -> Fact {
        NewFact::new("infrastructure", "hosting", "Primary DC", Entity::Target)
            .with_detail("vendor", "Equinix")
            .with_detail("racks", 12)
            .from_document("overview.pdf")
            .into_fact("F-INFRA-001".to_string(), Utc::now())
    }

    #[test]
    fn test_into_fact_defaults() {
        let fact = sample_fact();
        assert_eq!(fact.verification_status, VerificationStatus::Pending);
        assert!(fact.is_live());
        assert!(fact.confidence_score > 0.0);
        assert_eq!(fact.created_at, fact.updated_at);
    }

    #[test]
    fn test_add_source_appends_once() {
        let mut fact = sample_fact();
        fact.add_source("addendum.pdf");
        fact.add_source("overview.pdf");
        fact.add_source("addendum.pdf");
        assert_eq!(fact.source_document, "overview.pdf, addendum.pdf");
        assert!(fact.has_source("addendum.pdf"));
        assert!(!fact.has_source(""));
    }

    #[test]
    fn test_add_source_to_empty() {
        let mut fact = sample_fact();
        fact.source_document.clear();
        fact.add_source("a.pdf");
        assert_eq!(fact.source_document, "a.pdf");
    }

    #[test]
    fn test_detail_str() {
        let fact = sample_fact();
        assert_eq!(fact.detail_str("vendor").as_deref(), Some("Equinix"));
        assert_eq!(fact.detail_str("racks").as_deref(), Some("12"));
        assert_eq!(fact.detail_str("missing"), None);
        assert_eq!(value_to_string(&json!(null)), "");
    }

    #[test]
    fn test_fact_serde_keeps_detail_order() {
        let fact = sample_fact();
        let json = serde_json::to_string(&fact).unwrap();
        let back: Fact = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fact);
        let keys: Vec<&String> = back.details.keys().collect();
        assert_eq!(keys, ["vendor", "racks"]);
    }
}
