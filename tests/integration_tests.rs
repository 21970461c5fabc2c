//! Integration tests for the kudos ledger
//!
//! These tests drive the two core services end to end against the in-memory
//! store: awards and balances, proof summaries, and skill attach/detach
//! under each proof status.

use chrono::Utc;
use kudos_ledger::{
    BreakdownMode, KudosLedger, LedgerError, LedgerStore, MemoryStore, Principal, Proof,
    ProofSkillGraph, ProofStatus, Skill, SkillBreakdown, Sponsor, Talent, UserInfo,
};
use std::collections::BTreeSet;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

const OWNER_TALENT: i64 = 1;
const OTHER_TALENT: i64 = 2;
const SPONSOR: i64 = 10;
const SECOND_SPONSOR: i64 = 11;

const GO: i64 = 1;
const RUST: i64 = 2;
const SQL: i64 = 3;

const PUBLISHED_PROOF: i64 = 100;
const DRAFT_PROOF: i64 = 200;
const FOREIGN_DRAFT_PROOF: i64 = 300;
const HIDDEN_PROOF: i64 = 400;
const EMPTY_PUBLISHED_PROOF: i64 = 500;

fn owner() -> Principal {
    Principal::new("owner")
}

fn other_talent() -> Principal {
    Principal::new("other")
}

fn sponsor() -> Principal {
    Principal::new("sponsor")
}

fn second_sponsor() -> Principal {
    Principal::new("sponsor2")
}

fn ids(ids: &[i64]) -> BTreeSet<i64> {
    ids.iter().copied().collect()
}

fn user(id: i64, login: &str, talent_id: Option<i64>, sponsor_id: Option<i64>) -> UserInfo {
    UserInfo {
        id,
        login: login.to_string(),
        talent_id,
        sponsor_id,
    }
}

fn proof(id: i64, talent_id: i64, status: ProofStatus) -> Proof {
    Proof {
        id,
        talent_id,
        status,
        created_at: Utc::now(),
    }
}

/// Two talents, two sponsors (100 and 50 kudos), a three-skill catalogue and
/// one proof per status. The published proof claims Go and Rust.
async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();

    for id in [OWNER_TALENT, OTHER_TALENT] {
        store
            .insert_talent(Talent {
                id,
                first_name: Some(format!("Talent{}", id)),
                last_name: None,
            })
            .await;
    }

    for (id, balance) in [(SPONSOR, 100), (SECOND_SPONSOR, 50)] {
        store
            .insert_sponsor(Sponsor {
                id,
                first_name: Some(format!("Sponsor{}", id)),
                last_name: None,
                image: None,
                kudos_balance: balance,
            })
            .await;
    }

    store.insert_user(user(1, "owner", Some(OWNER_TALENT), None)).await;
    store.insert_user(user(2, "other", Some(OTHER_TALENT), None)).await;
    store.insert_user(user(3, "sponsor", None, Some(SPONSOR))).await;
    store.insert_user(user(4, "sponsor2", None, Some(SECOND_SPONSOR))).await;
    store.insert_user(user(5, "orphan", None, Some(999))).await;

    for (id, name) in [(GO, "Go"), (RUST, "Rust"), (SQL, "SQL")] {
        store
            .insert_skill(Skill {
                id,
                name: name.to_string(),
            })
            .await;
    }

    store.insert_proof(proof(PUBLISHED_PROOF, OWNER_TALENT, ProofStatus::Draft)).await;
    store.attach_skill(PUBLISHED_PROOF, GO).await.unwrap();
    store.attach_skill(PUBLISHED_PROOF, RUST).await.unwrap();
    store
        .set_proof_status(PUBLISHED_PROOF, ProofStatus::Published)
        .await
        .unwrap();

    store.insert_proof(proof(DRAFT_PROOF, OWNER_TALENT, ProofStatus::Draft)).await;
    store.insert_proof(proof(FOREIGN_DRAFT_PROOF, OTHER_TALENT, ProofStatus::Draft)).await;

    store.insert_proof(proof(HIDDEN_PROOF, OWNER_TALENT, ProofStatus::Hidden)).await;
    store.attach_skill(HIDDEN_PROOF, SQL).await.unwrap();

    store
        .insert_proof(proof(EMPTY_PUBLISHED_PROOF, OWNER_TALENT, ProofStatus::Published))
        .await;

    store
}

fn services(store: &MemoryStore) -> (KudosLedger, ProofSkillGraph) {
    let shared: Arc<dyn LedgerStore> = Arc::new(store.clone());
    (KudosLedger::new(shared.clone()), ProofSkillGraph::new(shared))
}

async fn skill_ids_on(store: &MemoryStore, proof_id: i64) -> Vec<i64> {
    store
        .attached_skills(proof_id)
        .await
        .into_iter()
        .map(|ps| ps.skill.id)
        .collect()
}

// ============================================================================
// Award Tests
// ============================================================================

mod award {
    use super::*;

    #[tokio::test]
    async fn test_award_splits_evenly_across_skills() {
        let store = seeded_store().await;
        let (ledger, _) = services(&store);

        ledger.award(PUBLISHED_PROOF, 10, &sponsor()).await.unwrap();

        assert_eq!(store.sponsor_balance(SPONSOR).await, Some(90));

        let records = store.kudos_records().await;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|k| k.amount == 5 && k.sponsor_id == SPONSOR));
        assert_eq!(records.iter().map(|k| k.amount).sum::<i64>(), 10);

        let proof_skill_ids: BTreeSet<i64> = records.iter().map(|k| k.proof_skill_id).collect();
        assert_eq!(proof_skill_ids.len(), 2, "one record per proof skill");

        let summary = ledger
            .proof_kudos_summary(PUBLISHED_PROOF, &owner())
            .await
            .unwrap();
        assert_eq!(summary.total_kudos, 10);
    }

    #[tokio::test]
    async fn test_indivisible_amount_is_rejected() {
        let store = seeded_store().await;
        let (ledger, _) = services(&store);

        let err = ledger.award(PUBLISHED_PROOF, 7, &sponsor()).await.unwrap_err();

        assert!(matches!(err, LedgerError::InvalidArgument(_)));
        assert_eq!(store.sponsor_balance(SPONSOR).await, Some(100));
        assert!(store.kudos_records().await.is_empty());
    }

    #[tokio::test]
    async fn test_amount_above_balance_is_rejected() {
        let store = seeded_store().await;
        let (ledger, _) = services(&store);

        let err = ledger.award(PUBLISHED_PROOF, 102, &sponsor()).await.unwrap_err();

        assert!(matches!(err, LedgerError::PermissionDenied(_)));
        assert_eq!(store.sponsor_balance(SPONSOR).await, Some(100));
        assert!(store.kudos_records().await.is_empty());
    }

    #[tokio::test]
    async fn test_whole_balance_can_be_spent() {
        let store = seeded_store().await;
        let (ledger, _) = services(&store);

        ledger.award(PUBLISHED_PROOF, 100, &sponsor()).await.unwrap();
        assert_eq!(store.sponsor_balance(SPONSOR).await, Some(0));

        let err = ledger.award(PUBLISHED_PROOF, 2, &sponsor()).await.unwrap_err();
        assert!(matches!(err, LedgerError::PermissionDenied(_)));
        assert_eq!(store.sponsor_balance(SPONSOR).await, Some(0));
    }

    #[tokio::test]
    async fn test_unpublished_proofs_cannot_be_kudosed() {
        let store = seeded_store().await;
        let (ledger, _) = services(&store);

        for proof_id in [DRAFT_PROOF, HIDDEN_PROOF] {
            let err = ledger.award(proof_id, 2, &sponsor()).await.unwrap_err();
            assert!(
                matches!(err, LedgerError::PermissionDenied(_)),
                "proof {} gave {:?}",
                proof_id,
                err
            );
        }

        assert_eq!(store.sponsor_balance(SPONSOR).await, Some(100));
        assert!(store.kudos_records().await.is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_amounts_are_rejected() {
        let store = seeded_store().await;
        let (ledger, _) = services(&store);

        for amount in [0, -4] {
            let err = ledger.award(PUBLISHED_PROOF, amount, &sponsor()).await.unwrap_err();
            assert!(matches!(err, LedgerError::InvalidArgument(_)));
        }
        assert_eq!(store.sponsor_balance(SPONSOR).await, Some(100));
    }

    #[tokio::test]
    async fn test_proof_without_skills_cannot_be_kudosed() {
        let store = seeded_store().await;
        let (ledger, _) = services(&store);

        let err = ledger
            .award(EMPTY_PUBLISHED_PROOF, 10, &sponsor())
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::InvalidArgument(_)));
        assert_eq!(store.sponsor_balance(SPONSOR).await, Some(100));
    }

    #[tokio::test]
    async fn test_precondition_failures_are_not_found() {
        let store = seeded_store().await;
        let (ledger, _) = services(&store);

        // unknown login
        let err = ledger
            .award(PUBLISHED_PROOF, 10, &Principal::new("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));

        // user without a sponsor account
        let err = ledger.award(PUBLISHED_PROOF, 10, &owner()).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));

        // linked sponsor row missing
        let err = ledger
            .award(PUBLISHED_PROOF, 10, &Principal::new("orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));

        // unknown proof
        let err = ledger.award(9999, 10, &sponsor()).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_awards_never_overdraw() {
        let store = seeded_store().await;
        let (ledger, _) = services(&store);
        let ledger = Arc::new(ledger);

        // 8 x 20 = 160 requested against a balance of 100
        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger.award(PUBLISHED_PROOF, 20, &sponsor()).await
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => succeeded += 1,
                Err(LedgerError::PermissionDenied(_)) => {}
                Err(other) => panic!("unexpected failure: {:?}", other),
            }
        }

        assert_eq!(succeeded, 5);
        assert_eq!(store.sponsor_balance(SPONSOR).await, Some(0));
        let spent: i64 = store.kudos_records().await.iter().map(|k| k.amount).sum();
        assert_eq!(spent, 100);
    }
}

// ============================================================================
// Balance and Summary Tests
// ============================================================================

mod reporting {
    use super::*;

    #[tokio::test]
    async fn test_sponsor_sees_own_balance() {
        let store = seeded_store().await;
        let (ledger, _) = services(&store);

        assert_eq!(ledger.sponsor_balance(SPONSOR, &sponsor()).await.unwrap(), 100);
    }

    #[tokio::test]
    async fn test_balance_of_another_sponsor_is_denied() {
        let store = seeded_store().await;
        let (ledger, _) = services(&store);

        let err = ledger
            .sponsor_balance(SECOND_SPONSOR, &sponsor())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::PermissionDenied(_)));

        let err = ledger.sponsor_balance(SPONSOR, &owner()).await.unwrap_err();
        assert!(matches!(err, LedgerError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_balance_lookup_not_found() {
        let store = seeded_store().await;
        let (ledger, _) = services(&store);

        let err = ledger
            .sponsor_balance(SPONSOR, &Principal::new("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));

        let err = ledger
            .sponsor_balance(999, &Principal::new("orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_owner_gets_per_skill_breakdown() {
        let store = seeded_store().await;
        let (ledger, _) = services(&store);

        ledger.award(PUBLISHED_PROOF, 10, &sponsor()).await.unwrap();
        ledger.award(PUBLISHED_PROOF, 10, &second_sponsor()).await.unwrap();

        let summary = ledger
            .proof_kudos_summary(PUBLISHED_PROOF, &owner())
            .await
            .unwrap();
        assert_eq!(summary.total_kudos, 20);

        let breakdown = summary.by_sponsor_per_skill.expect("owner sees breakdown");
        assert_eq!(breakdown.len(), 2);
        for skill in ["Go", "Rust"] {
            match &breakdown[skill] {
                SkillBreakdown::PerRecord(entries) => {
                    let sponsors: Vec<Option<i64>> = entries.iter().map(|e| e.sponsor.id).collect();
                    assert_eq!(sponsors, vec![Some(SPONSOR), Some(SECOND_SPONSOR)]);
                    assert!(entries.iter().all(|e| e.amount == 5));
                }
                other => panic!("unexpected breakdown for {}: {:?}", skill, other),
            }
        }
    }

    #[tokio::test]
    async fn test_amount_keyed_breakdown_collapses_equal_awards() {
        let store = seeded_store().await;
        let (ledger, _) = services(&store);
        let ledger = ledger.with_breakdown_mode(BreakdownMode::ByAmount);

        ledger.award(PUBLISHED_PROOF, 10, &sponsor()).await.unwrap();
        ledger.award(PUBLISHED_PROOF, 10, &second_sponsor()).await.unwrap();

        let summary = ledger
            .proof_kudos_summary(PUBLISHED_PROOF, &owner())
            .await
            .unwrap();
        assert_eq!(summary.total_kudos, 20);

        let breakdown = summary.by_sponsor_per_skill.unwrap();
        match &breakdown["Go"] {
            SkillBreakdown::ByAmount(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[&5].id, Some(SECOND_SPONSOR));
            }
            other => panic!("unexpected breakdown: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_owner_gets_total_only() {
        let store = seeded_store().await;
        let (ledger, _) = services(&store);

        ledger.award(PUBLISHED_PROOF, 10, &sponsor()).await.unwrap();

        for principal in [other_talent(), sponsor()] {
            let summary = ledger
                .proof_kudos_summary(PUBLISHED_PROOF, &principal)
                .await
                .unwrap();
            assert_eq!(summary.total_kudos, 10);
            assert!(summary.by_sponsor_per_skill.is_none());
        }
    }

    #[tokio::test]
    async fn test_summary_of_unawarded_proof() {
        let store = seeded_store().await;
        let (ledger, _) = services(&store);

        let summary = ledger
            .proof_kudos_summary(PUBLISHED_PROOF, &owner())
            .await
            .unwrap();
        assert_eq!(summary.total_kudos, 0);
        let breakdown = summary.by_sponsor_per_skill.unwrap();
        assert!(breakdown.values().all(|b| b.is_empty()));
    }

    #[tokio::test]
    async fn test_summary_not_found() {
        let store = seeded_store().await;
        let (ledger, _) = services(&store);

        let err = ledger.proof_kudos_summary(9999, &owner()).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));

        let err = ledger
            .proof_kudos_summary(PUBLISHED_PROOF, &Principal::new("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }
}

// ============================================================================
// Proof Skill Tests
// ============================================================================

mod proof_skills {
    use super::*;

    #[tokio::test]
    async fn test_attach_then_list() {
        let store = seeded_store().await;
        let (_, graph) = services(&store);

        graph
            .attach_skills(OWNER_TALENT, DRAFT_PROOF, &ids(&[GO, SQL]), &owner())
            .await
            .unwrap();

        let skills = graph.list_skills(DRAFT_PROOF, Some(&owner())).await.unwrap();
        let names: Vec<&str> = skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Go", "SQL"]);
    }

    #[tokio::test]
    async fn test_second_overlapping_attach_conflicts_without_changes() {
        let store = seeded_store().await;
        let (_, graph) = services(&store);

        graph
            .attach_skills(OWNER_TALENT, DRAFT_PROOF, &ids(&[GO]), &owner())
            .await
            .unwrap();
        let err = graph
            .attach_skills(OWNER_TALENT, DRAFT_PROOF, &ids(&[GO]), &owner())
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::conflict("skill with id = 1 already on proof"));

        let err = graph
            .attach_skills(OWNER_TALENT, DRAFT_PROOF, &ids(&[RUST, GO]), &owner())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));

        assert_eq!(skill_ids_on(&store, DRAFT_PROOF).await, vec![GO]);
    }

    #[tokio::test]
    async fn test_unknown_skill_attaches_nothing() {
        let store = seeded_store().await;
        let (_, graph) = services(&store);

        let err = graph
            .attach_skills(OWNER_TALENT, DRAFT_PROOF, &ids(&[GO, 42]), &owner())
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::not_found("no such skill with id = 42"));
        assert!(skill_ids_on(&store, DRAFT_PROOF).await.is_empty());
    }

    #[tokio::test]
    async fn test_attach_and_detach_require_draft() {
        let store = seeded_store().await;
        let (_, graph) = services(&store);

        for proof_id in [PUBLISHED_PROOF, HIDDEN_PROOF] {
            let err = graph
                .attach_skills(OWNER_TALENT, proof_id, &ids(&[SQL]), &owner())
                .await
                .unwrap_err();
            assert!(matches!(err, LedgerError::Conflict(_)));

            let err = graph
                .detach_skill(OWNER_TALENT, proof_id, GO, &owner())
                .await
                .unwrap_err();
            assert!(matches!(err, LedgerError::Conflict(_)));
        }

        assert_eq!(skill_ids_on(&store, PUBLISHED_PROOF).await, vec![GO, RUST]);
        assert_eq!(skill_ids_on(&store, HIDDEN_PROOF).await, vec![SQL]);
    }

    #[tokio::test]
    async fn test_cannot_edit_another_talent() {
        let store = seeded_store().await;
        let (_, graph) = services(&store);

        let err = graph
            .attach_skills(OTHER_TALENT, FOREIGN_DRAFT_PROOF, &ids(&[GO]), &owner())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));

        let err = graph
            .detach_skill(OTHER_TALENT, FOREIGN_DRAFT_PROOF, GO, &owner())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));

        // own talent id, someone else's proof
        let err = graph
            .attach_skills(OWNER_TALENT, FOREIGN_DRAFT_PROOF, &ids(&[GO]), &owner())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::BadRequest(_)));

        let err = graph
            .detach_skill(OWNER_TALENT, FOREIGN_DRAFT_PROOF, GO, &owner())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::BadRequest(_)));

        assert!(skill_ids_on(&store, FOREIGN_DRAFT_PROOF).await.is_empty());
    }

    #[tokio::test]
    async fn test_attach_lookups_not_found() {
        let store = seeded_store().await;
        let (_, graph) = services(&store);

        let err = graph
            .attach_skills(77, DRAFT_PROOF, &ids(&[GO]), &owner())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));

        let err = graph
            .attach_skills(OWNER_TALENT, 9999, &ids(&[GO]), &owner())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_attach_is_noop() {
        let store = seeded_store().await;
        let (_, graph) = services(&store);

        graph
            .attach_skills(OWNER_TALENT, DRAFT_PROOF, &BTreeSet::new(), &owner())
            .await
            .unwrap();
        assert!(skill_ids_on(&store, DRAFT_PROOF).await.is_empty());

        // preconditions still apply
        let err = graph
            .attach_skills(OWNER_TALENT, PUBLISHED_PROOF, &BTreeSet::new(), &owner())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
        assert_eq!(skill_ids_on(&store, PUBLISHED_PROOF).await, vec![GO, RUST]);
    }

    #[tokio::test]
    async fn test_attach_to_proof_of_another_talent_is_bad_request() {
        let store = seeded_store().await;
        let (_, graph) = services(&store);

        let err = graph
            .attach_skills(OWNER_TALENT, FOREIGN_DRAFT_PROOF, &ids(&[GO]), &owner())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::bad_request("talentId with id = 1 and proofId with id = 300 do not match")
        );
        assert!(skill_ids_on(&store, FOREIGN_DRAFT_PROOF).await.is_empty());
    }

    #[tokio::test]
    async fn test_detach_removes_only_that_skill() {
        let store = seeded_store().await;
        let (_, graph) = services(&store);

        graph
            .attach_skills(OWNER_TALENT, DRAFT_PROOF, &ids(&[GO, RUST]), &owner())
            .await
            .unwrap();
        graph
            .detach_skill(OWNER_TALENT, DRAFT_PROOF, GO, &owner())
            .await
            .unwrap();

        assert_eq!(skill_ids_on(&store, DRAFT_PROOF).await, vec![RUST]);
    }

    #[tokio::test]
    async fn test_detach_absent_skill_is_noop() {
        let store = seeded_store().await;
        let (_, graph) = services(&store);

        graph
            .attach_skills(OWNER_TALENT, DRAFT_PROOF, &ids(&[GO]), &owner())
            .await
            .unwrap();
        graph
            .detach_skill(OWNER_TALENT, DRAFT_PROOF, SQL, &owner())
            .await
            .unwrap();

        assert_eq!(skill_ids_on(&store, DRAFT_PROOF).await, vec![GO]);
    }

    #[tokio::test]
    async fn test_detach_lookups() {
        let store = seeded_store().await;
        let (_, graph) = services(&store);

        let err = graph
            .detach_skill(OWNER_TALENT, DRAFT_PROOF, GO, &Principal::new("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));

        let err = graph
            .detach_skill(OWNER_TALENT, 9999, GO, &owner())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_published_skills_are_public() {
        let store = seeded_store().await;
        let (_, graph) = services(&store);

        for principal in [None, Some(other_talent()), Some(sponsor())] {
            let skills = graph
                .list_skills(PUBLISHED_PROOF, principal.as_ref())
                .await
                .unwrap();
            let skill_ids: Vec<i64> = skills.iter().map(|s| s.id).collect();
            assert_eq!(skill_ids, vec![GO, RUST]);
        }
    }

    #[tokio::test]
    async fn test_unpublished_skills_are_owner_only() {
        let store = seeded_store().await;
        let (_, graph) = services(&store);

        let skills = graph.list_skills(HIDDEN_PROOF, Some(&owner())).await.unwrap();
        assert_eq!(skills.len(), 1);

        for principal in [None, Some(other_talent()), Some(sponsor())] {
            let err = graph
                .list_skills(HIDDEN_PROOF, principal.as_ref())
                .await
                .unwrap_err();
            assert!(matches!(err, LedgerError::PermissionDenied(_)));
        }

        let err = graph.list_skills(9999, None).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_catalogue_search() {
        let store = seeded_store().await;
        let (_, graph) = services(&store);

        let all = graph.search_catalogue("").await.unwrap();
        assert_eq!(all.len(), 3);

        let matched = graph.search_catalogue("ru").await.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "Rust");
    }

    #[tokio::test]
    async fn test_concurrent_attach_keeps_skills_unique() {
        let store = seeded_store().await;
        let (_, graph) = services(&store);
        let graph = Arc::new(graph);

        let mut handles = Vec::new();
        for _ in 0..6 {
            let graph = graph.clone();
            handles.push(tokio::spawn(async move {
                graph
                    .attach_skills(OWNER_TALENT, DRAFT_PROOF, &ids(&[GO]), &owner())
                    .await
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 1);
        assert_eq!(skill_ids_on(&store, DRAFT_PROOF).await, vec![GO]);
    }
}
