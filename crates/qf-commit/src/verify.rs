//! Commitment verification against raw round history.
//!
//! `verify_distribution` recomputes the entire pipeline (validation,
//! trust resolution, aggregation, matching, normalization, payout
//! aggregation, root construction) from the raw contribution feed and
//! compares the resulting root to the published one. Equality implies
//! the published distribution is an honest function of the contribution
//! history.
//!
//! A mismatch is an expected, checked condition: the outcome carries
//! both hashes and is never surfaced as an error.

use tracing::{info, warn};

use qf_core::error::EngineError;
use qf_core::traits::MatchingAlgorithm;
use qf_core::types::{Hash256, VerificationOutcome};
use qf_engine::{RoundConfig, RoundEngine, RoundInputs};

use crate::commitment::compute_root;
use crate::payout::aggregate_payouts;

/// Recompute the payout root from raw inputs and compare against
/// `expected_root`.
///
/// Errors only when the recomputation itself cannot run (validation
/// failure, or too few payout leaves to ever have committed).
pub fn verify_distribution<A: MatchingAlgorithm>(
    engine: &RoundEngine<A>,
    inputs: &RoundInputs<'_>,
    config: &RoundConfig,
    expected_root: &Hash256,
) -> Result<VerificationOutcome, EngineError> {
    let outcome = engine.compute_matches(inputs, config)?;
    let payouts = aggregate_payouts(&outcome.grant_matches);
    let computed_root = compute_root(&payouts, config.token_decimals)?;

    let matches = computed_root == *expected_root;
    if matches {
        info!(root = %computed_root, "verification: roots match");
    } else {
        warn!(
            expected = %expected_root,
            computed = %computed_root,
            "verification: root mismatch"
        );
    }

    Ok(VerificationOutcome {
        matches,
        expected_root: *expected_root,
        computed_root,
    })
}
