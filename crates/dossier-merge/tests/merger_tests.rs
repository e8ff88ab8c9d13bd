//! Integration tests for dossier-merge
//!
//! These tests run the merger against a real `FactRegistry` and follow a
//! fact through extraction, review, re-extraction and conflict resolution.

use dossier_domain::{Entity, Evidence, FactStatus, NewFact, VerificationStatus};
use dossier_merge::{
    ConflictQueue, ConflictType, FactCandidate, IncrementalMerger, MergeAction, MergeConfig, MergeError,
    Resolution,
};
use dossier_store::FactRegistry;
use serde_json::json;
use tempfile::TempDir;

const CLUSTER_QUOTE: &str = "Production workloads run on a VMware vSphere 6.7 cluster of 12 hosts.";

fn cluster(vendor: &str) -> NewFact {
    NewFact::new("infrastructure", "compute", "VMware vSphere 6.7 cluster", Entity::Target)
        .with_detail("vendor", vendor)
        .with_evidence(Evidence::new(CLUSTER_QUOTE, "3.1 Compute"))
}

/// Registry holding one cluster fact from `it_overview.pdf`, optionally confirmed
fn seeded(confirm: bool) -> (FactRegistry, String) {
    let registry = FactRegistry::new();
    let id = registry
        .add_fact(cluster("VMware").from_document("it_overview.pdf"))
        .unwrap();
    if confirm {
        registry.confirm_fact(&id, "reviewer-1", "Matches CMDB").unwrap();
    }
    (registry, id)
}

#[test]
fn test_confirmed_vendor_change_raises_one_conflict() {
    let (registry, id) = seeded(true);
    let before = registry.get_fact(&id).unwrap();
    let mut merger = IncrementalMerger::new(&registry, MergeConfig::default());

    let result = merger
        .merge_document_facts(vec![FactCandidate::new(cluster("Nutanix"))], "it_overview_v2.pdf", false)
        .unwrap();

    assert_eq!(result.conflicts.len(), 1);
    assert!(result.added.is_empty());
    assert!(result.updated.is_empty());

    let conflict = &result.conflicts[0];
    assert_eq!(conflict.fact_id, id);
    assert_eq!(conflict.conflict_type, ConflictType::Value);
    assert_eq!(conflict.field_conflicts.len(), 1);
    assert_eq!(
        conflict.field_conflicts["details.vendor"],
        (json!("VMware"), json!("Nutanix"))
    );

    // Untouched until resolved
    assert_eq!(registry.get_fact(&id).unwrap(), before);
    assert_eq!(merger.get_pending_conflicts().len(), 1);
}

#[test]
fn test_pending_vendor_change_updates_in_place() {
    let (registry, id) = seeded(false);
    let mut merger = IncrementalMerger::new(&registry, MergeConfig::default());

    let result = merger
        .merge_document_facts(vec![FactCandidate::new(cluster("Nutanix"))], "it_overview_v2.pdf", false)
        .unwrap();

    assert!(result.conflicts.is_empty());
    assert_eq!(result.updated, vec![id.clone()]);

    let fact = registry.get_fact(&id).unwrap();
    assert_eq!(fact.detail_str("vendor").as_deref(), Some("Nutanix"));
    assert_eq!(fact.source_document, "it_overview.pdf, it_overview_v2.pdf");
    assert_eq!(fact.verification_status, VerificationStatus::Pending);
    assert!(fact.verification_note.starts_with("[UPDATED]"));
    assert_eq!(registry.fact_count(), 1);
}

#[test]
fn test_confirmed_same_source_change_updates_in_place() {
    let (registry, id) = seeded(true);
    let mut merger = IncrementalMerger::new(&registry, MergeConfig::default());

    let result = merger
        .merge_document_facts(vec![FactCandidate::new(cluster("Nutanix"))], "it_overview.pdf", false)
        .unwrap();

    assert!(result.conflicts.is_empty());
    assert_eq!(result.updated, vec![id.clone()]);

    let fact = registry.get_fact(&id).unwrap();
    assert_eq!(fact.detail_str("vendor").as_deref(), Some("Nutanix"));
    assert_eq!(fact.source_document, "it_overview.pdf");
    assert_eq!(fact.verification_status, VerificationStatus::Confirmed);
    assert!(fact.verified_by.is_some());
    assert!(fact.verification_note.starts_with("[UPDATED]"));
}

#[test]
fn test_confirmed_unchanged_from_new_source_is_skipped() {
    let (registry, id) = seeded(true);
    let merger = IncrementalMerger::new(&registry, MergeConfig::default());

    let decision = merger.determine_action(&FactCandidate::new(cluster("VMware")), "it_overview_v2.pdf");
    assert_eq!(decision.action, MergeAction::Skip);
    assert_eq!(decision.existing_id, Some(id));
}

#[test]
fn test_reordered_item_matches_existing_fact() {
    let (registry, id) = seeded(false);
    let merger = IncrementalMerger::new(&registry, MergeConfig::default());

    let reworded = NewFact::new("infrastructure", "compute", "vSphere 6.7 cluster (VMware)", Entity::Target)
        .with_evidence(Evidence::new(CLUSTER_QUOTE, "3.1 Compute"));
    let decision = merger.determine_action(&FactCandidate::new(reworded), "it_overview_v2.pdf");
    assert_eq!(decision.action, MergeAction::Update);
    assert_eq!(decision.existing_id, Some(id));

    let unrelated = NewFact::new("infrastructure", "compute", "Oracle Database 19c", Entity::Target)
        .with_evidence(Evidence::new(
            "Workloads were migrated to Nutanix AHV during 2023 with a new support contract.",
            "3.4",
        ));
    let decision = merger.determine_action(&FactCandidate::new(unrelated), "it_overview_v2.pdf");
    assert_eq!(decision.action, MergeAction::Add);
}

#[test]
fn test_matching_is_scoped_to_entity_and_category() {
    let (registry, _) = seeded(false);
    let mut merger = IncrementalMerger::new(&registry, MergeConfig::default());

    let buyer = NewFact { entity: Entity::Buyer, ..cluster("VMware") };
    let other_category = NewFact {
        category: "virtualization".to_string(),
        ..cluster("VMware")
    };
    let result = merger
        .merge_document_facts(
            vec![FactCandidate::new(buyer), FactCandidate::new(other_category)],
            "buyer_overview.pdf",
            false,
        )
        .unwrap();

    assert_eq!(result.added, vec!["F-INFRA-002", "F-INFRA-003"]);
}

#[test]
fn test_remove_missing() {
    let registry = FactRegistry::new();
    let kept = registry.add_fact(cluster("VMware").from_document("it_overview.pdf")).unwrap();
    let dropped = registry
        .add_fact(
            NewFact::new("infrastructure", "storage", "NetApp AFF A400", Entity::Target)
                .with_evidence(Evidence::new("Primary storage is a NetApp AFF A400 array", "3.2"))
                .from_document("it_overview.pdf"),
        )
        .unwrap();
    let vouched = registry
        .add_fact(
            NewFact::new("infrastructure", "backup", "Backup platform", Entity::Target)
                .with_evidence(Evidence::new("Backups run nightly with Veeam to an offsite repository", "4.2"))
                .from_document("it_overview.pdf"),
        )
        .unwrap();
    let elsewhere = registry
        .add_fact(
            NewFact::new("infrastructure", "storage", "Tape library", Entity::Target)
                .from_document("dr_plan.pdf"),
        )
        .unwrap();
    registry.confirm_fact(&vouched, "reviewer-1", "").unwrap();

    let mut merger = IncrementalMerger::new(&registry, MergeConfig::default());
    let result = merger
        .merge_document_facts(vec![FactCandidate::new(cluster("VMware"))], "it_overview.pdf", true)
        .unwrap();

    assert_eq!(result.skipped, vec![kept.clone()]);
    assert_eq!(result.removed, vec![dropped.clone()]);
    assert_eq!(result.conflicts.len(), 1);
    assert_eq!(result.conflicts[0].fact_id, vouched);
    assert_eq!(result.conflicts[0].conflict_type, ConflictType::Removed);

    assert!(registry.get_fact(&dropped).unwrap().removed);
    assert!(!registry.get_fact(&vouched).unwrap().removed);
    assert!(!registry.get_fact(&elsewhere).unwrap().removed);

    // Running the same batch again does not queue the removal twice
    let again = merger
        .merge_document_facts(vec![FactCandidate::new(cluster("VMware"))], "it_overview.pdf", true)
        .unwrap();
    assert!(again.conflicts.is_empty());
    assert_eq!(merger.get_pending_conflicts().len(), 1);
}

#[test]
fn test_locked_entity_lands_in_failed() {
    let (registry, _) = seeded(false);
    registry.lock(Entity::Target);
    let mut merger = IncrementalMerger::new(&registry, MergeConfig::default());

    let firewall = NewFact::new("network", "security", "Palo Alto PA-3220", Entity::Target);
    let result = merger
        .merge_document_facts(vec![FactCandidate::new(firewall)], "network.pdf", false)
        .unwrap();

    assert!(result.added.is_empty());
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].item, "Palo Alto PA-3220");
    assert!(result.failed[0].reason.contains("locked"));
}

#[test]
fn test_resolve_keep_existing() {
    let (registry, id) = seeded(true);
    let mut merger = IncrementalMerger::new(&registry, MergeConfig::default());
    let result = merger
        .merge_document_facts(vec![FactCandidate::new(cluster("Nutanix"))], "it_overview_v2.pdf", false)
        .unwrap();
    let conflict_id = result.conflicts[0].id.clone();

    let fact = merger
        .resolve(&conflict_id, Resolution::KeepExisting, "lead-1", "Vendor letter confirms VMware")
        .unwrap();

    assert_eq!(fact.detail_str("vendor").as_deref(), Some("VMware"));
    assert!(fact.is_confirmed());
    assert!(fact.verification_note.contains("keep_existing by lead-1"));
    assert!(fact.verification_note.contains("Vendor letter confirms VMware"));
    assert_eq!(registry.get_fact(&id).unwrap(), fact);

    let conflict = merger.queue().get(&conflict_id).unwrap();
    assert_eq!(conflict.resolution, Resolution::KeepExisting);
    assert_eq!(conflict.resolved_by.as_deref(), Some("lead-1"));
    assert!(conflict.resolved_at.is_some());
    assert!(merger.get_pending_conflicts().is_empty());
}

#[test]
fn test_resolve_use_new_downgrades_verification() {
    let (registry, id) = seeded(true);
    let mut merger = IncrementalMerger::new(&registry, MergeConfig::default());
    let result = merger
        .merge_document_facts(vec![FactCandidate::new(cluster("Nutanix"))], "it_overview_v2.pdf", false)
        .unwrap();

    let fact = merger
        .resolve(&result.conflicts[0].id, Resolution::UseNew, "lead-1", "")
        .unwrap();

    assert_eq!(fact.id, id);
    assert_eq!(fact.detail_str("vendor").as_deref(), Some("Nutanix"));
    assert_eq!(fact.verification_status, VerificationStatus::Pending);
    assert!(fact.verified_by.is_none());
    assert_eq!(fact.source_document, "it_overview.pdf, it_overview_v2.pdf");
}

#[test]
fn test_resolve_merge_joins_values() {
    let (registry, _) = seeded(true);
    let mut merger = IncrementalMerger::new(&registry, MergeConfig::default());

    let changed = cluster("Nutanix").with_status(FactStatus::Partial);
    let result = merger
        .merge_document_facts(vec![FactCandidate::new(changed)], "it_overview_v2.pdf", false)
        .unwrap();
    let conflict = &result.conflicts[0];
    assert!(conflict.field_conflicts.contains_key("status"));

    let fact = merger
        .resolve(&conflict.id, Resolution::Merge, "lead-1", "Both vendors in use?")
        .unwrap();

    assert_eq!(fact.detail_str("vendor").as_deref(), Some("VMware | Nutanix"));
    assert_eq!(fact.status, FactStatus::Documented);
    assert!(fact.is_confirmed());
}

#[test]
fn test_resolve_use_new_on_removal_marks_removed() {
    let (registry, id) = seeded(true);
    let mut merger = IncrementalMerger::new(&registry, MergeConfig::default());
    let result = merger
        .merge_document_facts(Vec::<FactCandidate>::new(), "it_overview.pdf", true)
        .unwrap();
    assert_eq!(result.conflicts[0].conflict_type, ConflictType::Removed);

    merger
        .resolve(&result.conflicts[0].id, Resolution::UseNew, "lead-1", "Decommissioned")
        .unwrap();
    assert!(registry.get_fact(&id).unwrap().removed);
    assert!(registry.facts_for(Entity::Target, None).is_empty());
}

#[test]
fn test_resolve_errors() {
    let (registry, _) = seeded(true);
    let mut merger = IncrementalMerger::new(&registry, MergeConfig::default());

    let err = merger
        .resolve("no-such-conflict", Resolution::KeepExisting, "lead-1", "")
        .unwrap_err();
    assert!(matches!(err, MergeError::ConflictNotFound(_)));

    let result = merger
        .merge_document_facts(vec![FactCandidate::new(cluster("Nutanix"))], "it_overview_v2.pdf", false)
        .unwrap();
    let err = merger
        .resolve(&result.conflicts[0].id, Resolution::Unresolved, "lead-1", "")
        .unwrap_err();
    assert!(matches!(err, MergeError::InvalidResolution(_)));
}

#[test]
fn test_queue_survives_between_sessions() {
    let dir = TempDir::new().unwrap();
    let queue_path = dir.path().join("conflicts.json");
    let (registry, _) = seeded(true);

    {
        let mut merger = IncrementalMerger::new(&registry, MergeConfig::default());
        merger
            .merge_document_facts(vec![FactCandidate::new(cluster("Nutanix"))], "it_overview_v2.pdf", false)
            .unwrap();
        merger.into_queue().save(&queue_path).unwrap();
    }

    let queue = ConflictQueue::load(&queue_path).unwrap();
    let mut merger = IncrementalMerger::with_queue(&registry, MergeConfig::default(), queue);

    // Same re-extraction again: already pending, so not queued twice
    let result = merger
        .merge_document_facts(vec![FactCandidate::new(cluster("Nutanix"))], "it_overview_v2.pdf", false)
        .unwrap();
    assert!(result.conflicts.is_empty());
    assert_eq!(merger.get_pending_conflicts().len(), 1);
}
