//! Adversarial tests for the quadfund pipeline.
//!
//! These tests attack the computation's integrity guarantees:
//! - corrupt batches must be rejected whole, with no partial results
//! - hostile trust snapshots must degrade, not poison, a computation
//! - tampered claims, proofs, and histories must fail verification
//! - randomized inputs must keep the distribution order-independent and
//!   inside the pot

use proptest::prelude::*;
use qf_commit::{compute_distribution, verify_claim, verify_distribution};
use qf_core::constants::SATURATION_TOLERANCE;
use qf_core::error::{CommitmentError, EngineError, ResolutionWarning, ResolveError, ValidationError};
use qf_core::traits::ContentStore;
use qf_core::types::{Address, ContentId, Contribution, Hash256};
use qf_engine::{RoundConfig, RoundEngine, RoundInputs};
use qf_tests::helpers::*;

use std::collections::HashMap;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Batch rejection
// ---------------------------------------------------------------------------

#[test]
fn poisoned_batch_is_rejected_whole() {
    let grants = vec![grant(1)];
    let engine = RoundEngine::linear();
    let config = RoundConfig::new(100.0, 6);

    for poison in [
        contribution(1, "0xevil", -1.0),
        contribution(1, "0xevil", f64::NAN),
        contribution(1, "0xevil", f64::INFINITY),
        contribution(9, "0xevil", 1.0), // unregistered grant
    ] {
        let mut batch = distinct_donors(1, 5, 1.0);
        batch.push(poison.clone());
        let inputs = RoundInputs::new(&batch, &grants);
        let result = compute_distribution(&engine, &inputs, &config);
        assert!(
            matches!(result, Err(EngineError::Validation(_))),
            "poison {poison:?} was not rejected"
        );
    }
}

#[test]
fn negative_amount_error_names_the_culprit() {
    let grants = vec![grant(1)];
    let batch = vec![contribution(1, "0xmallory", -7.25)];
    let inputs = RoundInputs::new(&batch, &grants);
    let err = compute_distribution(
        &RoundEngine::linear(),
        &inputs,
        &RoundConfig::new(100.0, 6),
    )
    .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation(ValidationError::NegativeAmount {
            grant_id: 1,
            contributor: "0xmallory".into(),
            amount: -7.25,
        })
    );
}

// ---------------------------------------------------------------------------
// Hostile trust sources
// ---------------------------------------------------------------------------

struct MemoryStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
        }
    }

    fn seed(&self, id: &str, bytes: &[u8]) {
        self.blobs
            .lock()
            .unwrap()
            .insert(id.to_string(), bytes.to_vec());
    }
}

impl ContentStore for MemoryStore {
    fn put(&self, bytes: &[u8]) -> Result<ContentId, ResolveError> {
        let id = format!("blob-{}", self.blobs.lock().unwrap().len());
        self.seed(&id, bytes);
        Ok(ContentId::new(id))
    }

    fn get(&self, id: &ContentId) -> Result<Vec<u8>, ResolveError> {
        self.blobs
            .lock()
            .unwrap()
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(id.to_string()))
    }
}

#[test]
fn garbage_snapshot_degrades_to_defaults_with_warning() {
    let store = MemoryStore::new();
    store.seed("hostile", b"\xff\xfe not json");
    let id = ContentId::new("hostile");

    let grants = vec![grant(1), grant(2)];
    let mut batch = distinct_donors(1, 10, 1.0);
    batch.extend(distinct_donors(2, 2, 1.0));
    let inputs = RoundInputs::new(&batch, &grants).with_snapshot(&id, &store);
    let dist = compute_distribution(
        &RoundEngine::linear(),
        &inputs,
        &RoundConfig::new(1_000.0, 6),
    )
    .unwrap();

    // The computation proceeded at the default score: (10√0.5)² − 5 = 45.
    assert!((dist.match_for(1).unwrap() - 45.0).abs() < 1e-9);
    assert_eq!(dist.warnings.len(), 1);
    assert!(matches!(
        dist.warnings[0],
        ResolutionWarning::SnapshotUnresolved { .. }
    ));
}

#[test]
fn vanished_snapshot_degrades_to_defaults_with_warning() {
    let store = MemoryStore::new();
    let id = ContentId::new("never-published");

    let grants = vec![grant(1)];
    let batch = distinct_donors(1, 4, 1.0);
    let inputs = RoundInputs::new(&batch, &grants).with_snapshot(&id, &store);
    let dist = compute_distribution(
        &RoundEngine::linear(),
        &inputs,
        &RoundConfig::new(1_000.0, 6),
    )
    .unwrap();

    assert_eq!(dist.warnings.len(), 1);
    assert!(dist.match_for(1).is_some());
}

#[test]
fn zero_trust_contributions_earn_no_match() {
    // An army of zero-trust sybils buys nothing.
    let grants = vec![grant(1)];
    let batch = distinct_donors(1, 50, 10.0);
    let scores: Vec<qf_core::types::TrustScore> = batch
        .iter()
        .map(|c| qf_core::types::TrustScore {
            address: c.contributor.clone(),
            score: 0.0,
        })
        .collect();
    let inputs = RoundInputs::new(&batch, &grants).with_trust_scores(&scores);
    let dist = compute_distribution(
        &RoundEngine::linear(),
        &inputs,
        &RoundConfig::new(1_000.0, 6),
    )
    .unwrap();
    assert_eq!(dist.match_for(1), Some(0.0));
    assert!(dist.payout_matches.is_empty());
}

// ---------------------------------------------------------------------------
// Commitment tampering
// ---------------------------------------------------------------------------

fn committed_round() -> (
    Vec<Contribution>,
    Vec<qf_core::types::Grant>,
    Vec<qf_core::types::TrustScore>,
    qf_core::types::Commitment,
) {
    let grants = vec![grant(1), grant(2), grant(3)];
    let mut batch = Vec::new();
    for g in [1u64, 2, 3] {
        batch.extend(distinct_donors(g, 3 + g as usize, 2.0));
    }
    let scores = full_trust(&batch);
    let inputs = RoundInputs::new(&batch, &grants).with_trust_scores(&scores);
    let dist = compute_distribution(
        &RoundEngine::linear(),
        &inputs,
        &RoundConfig::new(10_000.0, 6),
    )
    .unwrap();
    let commitment = dist.commitment.unwrap();
    (batch, grants, scores, commitment)
}

#[test]
fn claim_tampering_fails_proof_verification() {
    let (_, _, _, commitment) = committed_round();
    let victim = commitment.claims.keys().next().unwrap().clone();

    // Amount +1 smallest unit.
    let mut tampered = commitment.clone();
    tampered.claims.get_mut(&victim).unwrap().amount += 1;
    assert!(!verify_claim(&tampered, &victim));

    // Borrowed index.
    let mut tampered = commitment.clone();
    tampered.claims.get_mut(&victim).unwrap().index += 1;
    assert!(!verify_claim(&tampered, &victim));

    // Truncated proof.
    let mut tampered = commitment.clone();
    tampered.claims.get_mut(&victim).unwrap().proof.pop();
    assert!(!verify_claim(&tampered, &victim));

    // Honest claim still passes.
    assert!(verify_claim(&commitment, &victim));
}

#[test]
fn claims_do_not_transfer_between_addresses() {
    let (_, _, _, commitment) = committed_round();
    let mut keys = commitment.claims.keys();
    let first = keys.next().unwrap().clone();
    let second = keys.next().unwrap().clone();

    // Replaying the first payee's claim under the second address fails:
    // the leaf commits to the address bytes.
    let mut tampered = commitment.clone();
    let stolen = tampered.claims[&first].clone();
    tampered.claims.insert(second.clone(), stolen);
    assert!(!verify_claim(&tampered, &second));
}

#[test]
fn rewritten_history_fails_root_verification() {
    let (batch, grants, scores, commitment) = committed_round();
    let engine = RoundEngine::linear();
    let config = RoundConfig::new(10_000.0, 6);

    // Dropping a contribution changes the root.
    let truncated = &batch[..batch.len() - 1];
    let inputs = RoundInputs::new(truncated, &grants).with_trust_scores(&scores);
    let outcome = verify_distribution(&engine, &inputs, &config, &commitment.root).unwrap();
    assert!(!outcome.matches);

    // So does a different pot (saturation kicks in differently).
    let inputs = RoundInputs::new(&batch, &grants).with_trust_scores(&scores);
    let outcome =
        verify_distribution(&engine, &inputs, &RoundConfig::new(10.0, 6), &commitment.root)
            .unwrap();
    assert!(!outcome.matches);

    // The honest history still verifies.
    let outcome = verify_distribution(&engine, &inputs, &config, &commitment.root).unwrap();
    assert!(outcome.matches);
}

#[test]
fn single_leaf_round_never_fabricates_a_tree() {
    let grants = vec![grant_to(1, "0xonly"), grant_to(2, "0xonly")];
    let mut batch = distinct_donors(1, 5, 1.0);
    batch.extend(distinct_donors(2, 5, 1.0));
    let scores = full_trust(&batch);
    let inputs = RoundInputs::new(&batch, &grants).with_trust_scores(&scores);
    let config = RoundConfig::new(1_000.0, 6);
    let engine = RoundEngine::linear();

    let dist = compute_distribution(&engine, &inputs, &config).unwrap();
    assert!(dist.commitment.is_none());

    // Verification against any root cannot succeed for a round that
    // could never have committed.
    let err = verify_distribution(&engine, &inputs, &config, &Hash256::ZERO).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Commitment(CommitmentError::InsufficientLeaves { .. })
    ));
}

// ---------------------------------------------------------------------------
// Randomized invariants
// ---------------------------------------------------------------------------

fn arbitrary_batch() -> impl Strategy<Value = Vec<Contribution>> {
    prop::collection::vec(
        (1u64..=3, 0usize..8, 0.0f64..100.0).prop_map(|(grant_id, donor, amount)| {
            contribution(grant_id, &format!("0xdonor{donor}"), amount)
        }),
        1..40,
    )
}

proptest! {
    /// The distribution never exceeds the pot, saturated or not.
    #[test]
    fn total_match_never_exceeds_pot(batch in arbitrary_batch(), pot in 0.0f64..500.0) {
        let grants = vec![grant(1), grant(2), grant(3)];
        let inputs = RoundInputs::new(&batch, &grants);
        let dist = compute_distribution(
            &RoundEngine::linear(),
            &inputs,
            &RoundConfig::new(pot, 6),
        )
        .unwrap();
        prop_assert!(dist.total_matched() <= pot + SATURATION_TOLERANCE);
        for m in &dist.grant_matches {
            prop_assert!(m.match_amount >= 0.0);
        }
    }

    /// Reversing the feed changes nothing, including the optional root.
    #[test]
    fn distribution_is_feed_order_invariant(batch in arbitrary_batch()) {
        let grants = vec![grant(1), grant(2), grant(3)];
        let config = RoundConfig::new(1_000.0, 6);
        let engine = RoundEngine::linear();

        let forward = {
            let inputs = RoundInputs::new(&batch, &grants);
            compute_distribution(&engine, &inputs, &config).unwrap()
        };
        let mut reversed_batch = batch.clone();
        reversed_batch.reverse();
        let reversed = {
            let inputs = RoundInputs::new(&reversed_batch, &grants);
            compute_distribution(&engine, &inputs, &config).unwrap()
        };
        prop_assert_eq!(forward, reversed);
    }

    /// Every committed claim proof verifies, whatever the round shape.
    #[test]
    fn all_claims_always_verify(batch in arbitrary_batch()) {
        let grants = vec![grant(1), grant(2), grant(3)];
        let inputs = RoundInputs::new(&batch, &grants);
        let dist = compute_distribution(
            &RoundEngine::linear(),
            &inputs,
            &RoundConfig::new(1_000.0, 6),
        )
        .unwrap();
        if let Some(commitment) = &dist.commitment {
            for address in commitment.claims.keys() {
                prop_assert!(verify_claim(commitment, address));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Address normalization attacks
// ---------------------------------------------------------------------------

#[test]
fn case_split_donations_cannot_evade_sybil_dampening() {
    // The same donor split across case variants still aggregates to one
    // contributor, so the pair earns a single-donor (zero) match.
    let grants = vec![grant(1)];
    let batch = vec![
        contribution(1, "0xAbCd", 5.0),
        contribution(1, "0xabcd", 5.0),
        contribution(1, "0xABCD", 5.0),
    ];
    let scores = vec![qf_core::types::TrustScore {
        address: Address::new("0xabcd"),
        score: 1.0,
    }];
    let inputs = RoundInputs::new(&batch, &grants).with_trust_scores(&scores);
    let dist = compute_distribution(
        &RoundEngine::linear(),
        &inputs,
        &RoundConfig::new(1_000.0, 6),
    )
    .unwrap();
    assert_eq!(dist.match_for(1), Some(0.0));
}
