//! The prediction engine: forward-looking "what-if" match curves.
//!
//! For a target grant, each rung of [`PROBE_LADDER`] injects one
//! synthetic anonymous contribution of that size into a clone of the
//! aggregate set and reruns matcher + normalizer. Arbitrary query
//! amounts interpolate piecewise-linearly between the recorded rungs.
//!
//! Probe evaluation is embarrassingly parallel: every probe reruns the
//! pure matcher over its own clone, so rungs are dispatched on the rayon
//! pool and collected in ladder order. The committed aggregates are
//! never mutated.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use qf_core::constants::{DEFAULT_TRUST_SCORE, PROBE_LADDER};
use qf_core::error::{EngineError, ValidationError};
use qf_core::traits::MatchingAlgorithm;
use qf_core::types::{Address, GrantAggregate, GrantId};

use crate::normalizer::normalize_matches;
use crate::pipeline::{RoundConfig, RoundEngine, RoundInputs};

/// Reserved contributor address for injected probe contributions.
///
/// Contains characters outside any ledger address alphabet, so it cannot
/// collide with a normalized real contributor. Like any unknown address
/// it resolves to [`DEFAULT_TRUST_SCORE`].
pub const SYNTHETIC_CONTRIBUTOR: &str = "~synthetic-probe~";

/// One evaluated rung of the probe ladder.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq,
    bincode::Encode, bincode::Decode,
)]
pub struct ProbePoint {
    /// Hypothetical contribution size.
    pub amount: f64,
    /// The grant's post-normalization match with this contribution added.
    pub predicted_match: f64,
    /// `predicted_match − current_match`.
    pub delta: f64,
}

/// A grant's sampled matching-response curve.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq,
    bincode::Encode, bincode::Decode,
)]
pub struct PredictionCurve {
    pub grant_id: GrantId,
    /// The grant's committed match with no synthetic contribution.
    pub current_match: f64,
    /// One point per ladder rung, ascending by amount.
    pub points: Vec<ProbePoint>,
}

impl PredictionCurve {
    /// Predicted match delta for an arbitrary contribution amount.
    ///
    /// Interpolates linearly between the bracketing rungs; amounts above
    /// the top rung extend the last segment's slope. Zero, negative, or
    /// non-finite amounts answer `0`, as do curves with fewer than two
    /// points.
    pub fn delta_at(&self, amount: f64) -> f64 {
        if !amount.is_finite() || amount <= 0.0 || self.points.len() < 2 {
            return 0.0;
        }

        if let Some(exact) = self.points.iter().find(|p| p.amount == amount) {
            return exact.delta;
        }

        let last = &self.points[self.points.len() - 1];
        if amount > last.amount {
            let prev = &self.points[self.points.len() - 2];
            let slope = (last.delta - prev.delta) / (last.amount - prev.amount);
            return last.delta + (amount - last.amount) * slope;
        }

        for pair in self.points.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            if amount > lo.amount && amount < hi.amount {
                let t = (amount - lo.amount) / (hi.amount - lo.amount);
                return lo.delta + t * (hi.delta - lo.delta);
            }
        }

        0.0
    }

    /// Predicted absolute match for an arbitrary contribution amount.
    pub fn match_at(&self, amount: f64) -> f64 {
        self.current_match + self.delta_at(amount)
    }
}

impl<A: MatchingAlgorithm> RoundEngine<A> {
    /// Build the prediction curve for one grant.
    ///
    /// The grant must be registered; an empty contribution batch is
    /// allowed here (predicting the first donation is the point).
    pub fn prediction_curve(
        &self,
        inputs: &RoundInputs<'_>,
        config: &RoundConfig,
        grant_id: GrantId,
    ) -> Result<PredictionCurve, EngineError> {
        let Some(grant) = inputs.grants.iter().find(|g| g.id == grant_id) else {
            return Err(ValidationError::UnknownGrant(grant_id).into());
        };

        let prepared = self.prepare(inputs, config, true)?;
        let ctx = config.match_context();

        let current_match = {
            let raw = self
                .algorithm()
                .compute_raw_matches(&prepared.aggregates, &ctx)?;
            let normalized = normalize_matches(raw, config.total_pot);
            normalized
                .matches
                .iter()
                .find(|m| m.grant_id == grant_id)
                .map_or(0.0, |m| m.match_amount)
        };

        let synthetic = Address::new(SYNTHETIC_CONTRIBUTOR);
        let ladder: &[f64] = &PROBE_LADDER;

        let points = ladder
            .par_iter()
            .map(|&amount| -> Result<ProbePoint, EngineError> {
                let predicted = if amount == 0.0 {
                    current_match
                } else {
                    let mut probe = prepared.aggregates.clone();
                    inject_probe(&mut probe, grant_id, &grant.payout_address, &synthetic, amount);
                    let raw = self.algorithm().compute_raw_matches(&probe, &ctx)?;
                    let normalized = normalize_matches(raw, config.total_pot);
                    normalized
                        .matches
                        .iter()
                        .find(|m| m.grant_id == grant_id)
                        .map_or(0.0, |m| m.match_amount)
                };
                Ok(ProbePoint {
                    amount,
                    predicted_match: predicted,
                    delta: predicted - current_match,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(grant_id, current_match, rungs = points.len(), "prediction: curve built");

        Ok(PredictionCurve {
            grant_id,
            current_match,
            points,
        })
    }
}

/// Add the synthetic probe contribution to the target grant's aggregate,
/// creating the aggregate if the grant has no donations yet.
fn inject_probe(
    aggregates: &mut std::collections::BTreeMap<GrantId, GrantAggregate>,
    grant_id: GrantId,
    payout_address: &Address,
    synthetic: &Address,
    amount: f64,
) {
    let weighted = amount * DEFAULT_TRUST_SCORE;
    aggregates
        .entry(grant_id)
        .or_insert_with(|| GrantAggregate {
            grant_id,
            payout_address: payout_address.clone(),
            contributions: std::collections::BTreeMap::new(),
        })
        .contributions
        .entry(synthetic.clone())
        .and_modify(|sum| *sum += weighted)
        .or_insert(weighted);
}
