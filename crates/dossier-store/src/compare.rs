//! Cross-entity comparison report
//!
//! Groups each party's live facts by `(category, item)` case-insensitively
//! and reports what only one side has, what both share, and where both
//! record the same item with a different vendor. Purely a read: nothing in
//! the registry changes.

use dossier_domain::{Entity, Fact};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Detail key compared for vendor mismatches
pub const VENDOR_KEY: &str = "vendor";

/// A fact present on one side only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparedItem {
    /// Fact id
    pub fact_id: String,
    /// Category as recorded
    pub category: String,
    /// Item as recorded
    pub item: String,
}

/// An item both parties record with compatible details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedItem {
    /// Category as recorded by the first entity
    pub category: String,
    /// Item as recorded by the first entity
    pub item: String,
    /// Fact id on the first entity's side
    pub a_id: String,
    /// Fact id on the second entity's side
    pub b_id: String,
}

/// Kind of disagreement found by a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonConflictType {
    /// Same item, different `details.vendor`
    VendorMismatch,
}

/// An item both parties record with differing vendors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonConflict {
    /// What disagrees
    pub conflict_type: ComparisonConflictType,
    /// Category as recorded by the first entity
    pub category: String,
    /// Item as recorded by the first entity
    pub item: String,
    /// Fact id on the first entity's side
    pub a_id: String,
    /// Fact id on the second entity's side
    pub b_id: String,
    /// Vendor on the first entity's side
    pub a_vendor: String,
    /// Vendor on the second entity's side
    pub b_vendor: String,
}

/// Result of comparing two entities' facts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// First entity compared
    pub entity_a: Entity,
    /// Second entity compared
    pub entity_b: Entity,
    /// Items only the first entity has
    pub only_a: Vec<ComparedItem>,
    /// Items only the second entity has
    pub only_b: Vec<ComparedItem>,
    /// Items both have, without a vendor disagreement
    pub shared: Vec<SharedItem>,
    /// Items both have with differing vendors
    pub conflicts: Vec<ComparisonConflict>,
}

impl ComparisonReport {
    /// One-line summary for logs and CLI output
    pub fn summary(&self) -> String {
        format!(
            "{} only: {}, {} only: {}, shared: {}, conflicts: {}",
            self.entity_a,
            self.only_a.len(),
            self.entity_b,
            self.only_b.len(),
            self.shared.len(),
            self.conflicts.len()
        )
    }
}

type GroupKey = (String, String);

/// First fact per lowercased `(category, item)`, in insertion order
fn group<'a>(facts: impl Iterator<Item = &'a Fact>) -> IndexMap<GroupKey, &'a Fact> {
    let mut groups: IndexMap<GroupKey, &Fact> = IndexMap::new();
    for fact in facts {
        let key = (fact.category.trim().to_lowercase(), fact.item.trim().to_lowercase());
        groups.entry(key).or_insert(fact);
    }
    groups
}

fn vendor(fact: &Fact) -> Option<String> {
    fact.detail_str(VENDOR_KEY)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn compared(fact: &Fact) -> ComparedItem {
    ComparedItem {
        fact_id: fact.id.clone(),
        category: fact.category.clone(),
        item: fact.item.clone(),
    }
}

/// Build a comparison report over already-filtered fact sets
pub(crate) fn compare_facts<'a>(
    entity_a: Entity,
    facts_a: impl Iterator<Item = &'a Fact>,
    entity_b: Entity,
    facts_b: impl Iterator<Item = &'a Fact>,
) -> ComparisonReport {
    let groups_a = group(facts_a);
    let groups_b = group(facts_b);

    let mut report = ComparisonReport {
        entity_a,
        entity_b,
        only_a: Vec::new(),
        only_b: Vec::new(),
        shared: Vec::new(),
        conflicts: Vec::new(),
    };

    for (key, a) in &groups_a {
        let Some(b) = groups_b.get(key) else {
            report.only_a.push(compared(a));
            continue;
        };

        match (vendor(a), vendor(b)) {
            (Some(va), Some(vb)) if !va.eq_ignore_ascii_case(&vb) => {
                report.conflicts.push(ComparisonConflict {
                    conflict_type: ComparisonConflictType::VendorMismatch,
                    category: a.category.clone(),
                    item: a.item.clone(),
                    a_id: a.id.clone(),
                    b_id: b.id.clone(),
                    a_vendor: va,
                    b_vendor: vb,
                });
            }
            _ => report.shared.push(SharedItem {
                category: a.category.clone(),
                item: a.item.clone(),
                a_id: a.id.clone(),
                b_id: b.id.clone(),
            }),
        }
    }

    for (key, b) in &groups_b {
        if !groups_a.contains_key(key) {
            report.only_b.push(compared(b));
        }
    }

    report
}
