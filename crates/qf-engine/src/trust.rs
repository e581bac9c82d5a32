//! Trust-bonus resolution.
//!
//! Produces an `address → score` map covering every contributor address
//! of the current batch, from up to three layered sources:
//! 1. a caller-supplied score list,
//! 2. a published snapshot resolved through the content-addressed store
//!    (a JSON array of [`TrustScore`]),
//! 3. a live reputation service query for still-uncovered addresses.
//!
//! Trust bonus is an adjustment, not a correctness-critical input: a
//! failing source degrades to [`DEFAULT_TRUST_SCORE`] for the addresses
//! it would have covered and surfaces a [`ResolutionWarning`] instead of
//! failing the computation. Scores outside `[0, 1]` are clamped, also
//! with a warning.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use qf_core::constants::DEFAULT_TRUST_SCORE;
use qf_core::error::{ResolutionWarning, ResolveError};
use qf_core::traits::{ContentStore, ScoreSource};
use qf_core::types::{Address, ContentId, TrustScore};

/// The resolver's output: a complete score map plus any degradation
/// notices to attach to the distribution.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedScores {
    /// Covers every requested address.
    pub scores: BTreeMap<Address, f64>,
    pub warnings: Vec<ResolutionWarning>,
}

/// Resolve trust scores for `addresses`.
///
/// Precedence: supplied list, then snapshot, then service; the first
/// source to cover an address wins. Anything still uncovered afterwards
/// defaults to [`DEFAULT_TRUST_SCORE`].
pub fn resolve_scores(
    addresses: &BTreeSet<Address>,
    supplied: Option<&[TrustScore]>,
    snapshot: Option<(&ContentId, &dyn ContentStore)>,
    source: Option<&dyn ScoreSource>,
) -> ResolvedScores {
    let mut resolved = ResolvedScores::default();

    if let Some(list) = supplied {
        apply_scores(&mut resolved, addresses, list);
        debug!(covered = resolved.scores.len(), "trust: applied supplied scores");
    }

    if resolved.scores.len() < addresses.len() {
        if let Some((content_id, store)) = snapshot {
            match fetch_snapshot(content_id, store) {
                Ok(list) => {
                    apply_scores(&mut resolved, addresses, &list);
                    debug!(
                        %content_id,
                        covered = resolved.scores.len(),
                        "trust: applied snapshot scores"
                    );
                }
                Err(err) => {
                    let affected = addresses.len() - resolved.scores.len();
                    warn!(%content_id, %err, affected, "trust: snapshot unresolved, defaulting");
                    resolved.warnings.push(ResolutionWarning::SnapshotUnresolved {
                        content_id: content_id.to_string(),
                        reason: err.to_string(),
                        affected,
                    });
                }
            }
        }
    }

    if resolved.scores.len() < addresses.len() {
        if let Some(service) = source {
            let uncovered: Vec<Address> = addresses
                .iter()
                .filter(|a| !resolved.scores.contains_key(*a))
                .cloned()
                .collect();
            match service.fetch_scores(&uncovered) {
                Ok(list) => {
                    apply_scores(&mut resolved, addresses, &list);
                    debug!(covered = resolved.scores.len(), "trust: applied service scores");
                }
                Err(err) => {
                    warn!(%err, affected = uncovered.len(), "trust: service unresolved, defaulting");
                    resolved.warnings.push(ResolutionWarning::ServiceUnresolved {
                        reason: err.to_string(),
                        affected: uncovered.len(),
                    });
                }
            }
        }
    }

    for address in addresses {
        resolved
            .scores
            .entry(address.clone())
            .or_insert(DEFAULT_TRUST_SCORE);
    }

    resolved
}

/// Serialize a score list and publish it to the content-addressed store,
/// returning the snapshot's content id for later rounds.
pub fn publish_snapshot(
    scores: &[TrustScore],
    store: &dyn ContentStore,
) -> Result<ContentId, ResolveError> {
    let bytes = serde_json::to_vec(scores)
        .map_err(|e| ResolveError::Malformed(e.to_string()))?;
    store.put(&bytes)
}

fn fetch_snapshot(
    content_id: &ContentId,
    store: &dyn ContentStore,
) -> Result<Vec<TrustScore>, ResolveError> {
    let bytes = store.get(content_id)?;
    serde_json::from_slice(&bytes).map_err(|e| ResolveError::Malformed(e.to_string()))
}

/// Merge a score list into the resolved map, first source wins.
/// Out-of-range scores clamp into `[0, 1]` with a warning.
fn apply_scores(resolved: &mut ResolvedScores, addresses: &BTreeSet<Address>, list: &[TrustScore]) {
    for entry in list {
        if !addresses.contains(&entry.address) || resolved.scores.contains_key(&entry.address) {
            continue;
        }
        let mut score = entry.score;
        if !(0.0..=1.0).contains(&score) || score.is_nan() {
            warn!(address = %entry.address, score, "trust: score out of range, clamping");
            resolved.warnings.push(ResolutionWarning::ScoreClamped {
                address: entry.address.to_string(),
                score,
            });
            score = if score.is_nan() {
                DEFAULT_TRUST_SCORE
            } else {
                score.clamp(0.0, 1.0)
            };
        }
        resolved.scores.insert(entry.address.clone(), score);
    }
}
