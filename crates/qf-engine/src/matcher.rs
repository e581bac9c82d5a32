//! Linear quadratic-funding matcher.
//!
//! For each grant: `match = (Σ√w)² − Σw` over the trust-weighted,
//! per-contributor summed amounts `w`. The squared-sum-of-square-roots
//! term rewards broad small-donor support over an equal sum from one
//! large donor; subtracting the linear sum keeps matching funds a top-up
//! rather than a duplication of the donations themselves.
//!
//! With non-negative inputs the result is non-negative (power-mean
//! inequality); a single-contributor grant lands exactly on zero up to
//! float rounding, which is clamped away.

use std::collections::BTreeMap;

use tracing::debug;

use qf_core::error::MatchError;
use qf_core::traits::{MatchContext, MatchingAlgorithm};
use qf_core::types::{GrantAggregate, GrantId, GrantMatch};

/// The standard capital-constrained linear QF estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearQf;

impl LinearQf {
    /// Create a new linear matcher.
    pub fn new() -> Self {
        Self
    }
}

impl MatchingAlgorithm for LinearQf {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn compute_raw_matches(
        &self,
        aggregates: &BTreeMap<GrantId, GrantAggregate>,
        _ctx: &MatchContext,
    ) -> Result<Vec<GrantMatch>, MatchError> {
        let mut matches = Vec::with_capacity(aggregates.len());

        // BTreeMap iteration pins the summation order: ascending grant
        // id, then ascending contributor address inside each aggregate.
        for agg in aggregates.values() {
            let mut sum_sqrt = 0.0f64;
            let mut sum_linear = 0.0f64;
            for weighted in agg.contributions.values() {
                sum_sqrt += weighted.sqrt();
                sum_linear += weighted;
            }

            let raw = sum_sqrt * sum_sqrt - sum_linear;
            if !raw.is_finite() {
                return Err(MatchError::NonFiniteIntermediate(agg.grant_id));
            }

            matches.push(GrantMatch {
                grant_id: agg.grant_id,
                payout_address: agg.payout_address.clone(),
                match_amount: raw.max(0.0),
            });
        }

        debug!(grants = matches.len(), "matcher: raw matches computed");
        Ok(matches)
    }
}
