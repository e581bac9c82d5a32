//! Full distribution assembly: matches → payouts → optional commitment.

use tracing::debug;

use qf_core::error::{CommitmentError, EngineError};
use qf_core::traits::MatchingAlgorithm;
use qf_core::types::Distribution;
use qf_engine::{RoundConfig, RoundEngine, RoundInputs};

use crate::commitment::build_commitment;
use crate::payout::aggregate_payouts;

/// Run the whole pipeline and assemble a [`Distribution`].
///
/// A commitment is attached when at least two payout leaves exist;
/// otherwise `commitment` is `None` ("commitment unavailable") and the
/// matches remain usable. Other commitment failures propagate.
pub fn compute_distribution<A: MatchingAlgorithm>(
    engine: &RoundEngine<A>,
    inputs: &RoundInputs<'_>,
    config: &RoundConfig,
) -> Result<Distribution, EngineError> {
    let outcome = engine.compute_matches(inputs, config)?;
    let payout_matches = aggregate_payouts(&outcome.grant_matches);

    let commitment = match build_commitment(&payout_matches, config.token_decimals) {
        Ok(commitment) => Some(commitment),
        Err(CommitmentError::InsufficientLeaves { have, need }) => {
            debug!(have, need, "distribution: commitment unavailable");
            None
        }
        Err(err) => return Err(err.into()),
    };

    Ok(Distribution {
        grant_matches: outcome.grant_matches,
        has_saturated: outcome.has_saturated,
        payout_matches,
        commitment,
        warnings: outcome.warnings,
    })
}
