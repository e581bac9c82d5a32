//! Saturation normalization.
//!
//! Runs exactly once per computation, after all grants' raw matches are
//! known: normalization needs the global total, so it cannot be applied
//! grant-by-grant.

use tracing::debug;

use qf_core::types::GrantMatch;

/// Normalizer output: the (possibly scaled) matches plus the saturation
/// flag carried into the distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMatches {
    pub matches: Vec<GrantMatch>,
    pub has_saturated: bool,
}

/// Scale matches down proportionally when their sum exceeds the pot.
///
/// When `Σ match > total_pot`, every match is multiplied by
/// `total_pot / Σ match`, preserving each grant's share; otherwise the
/// matches pass through unchanged.
pub fn normalize_matches(raw: Vec<GrantMatch>, total_pot: f64) -> NormalizedMatches {
    let total: f64 = raw.iter().map(|m| m.match_amount).sum();

    if total <= total_pot || total <= 0.0 {
        return NormalizedMatches {
            matches: raw,
            has_saturated: false,
        };
    }

    let scale = total_pot / total;
    debug!(total, total_pot, scale, "normalizer: pot saturated, scaling down");

    let matches = raw
        .into_iter()
        .map(|m| GrantMatch {
            match_amount: m.match_amount * scale,
            ..m
        })
        .collect();

    NormalizedMatches {
        matches,
        has_saturated: true,
    }
}
