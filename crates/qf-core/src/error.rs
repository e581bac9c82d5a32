//! Error types for the quadfund engine.
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::GrantId;

/// Malformed or out-of-domain input. Aborts the whole computation before
/// any aggregation; no partial results are produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("negative amount {amount} from {contributor} to grant {grant_id}")] NegativeAmount { grant_id: GrantId, contributor: String, amount: f64 },
    #[error("non-finite amount from {contributor} to grant {grant_id}")] NonFiniteAmount { grant_id: GrantId, contributor: String },
    #[error("empty contributor address on a contribution to grant {0}")] EmptyContributorAddress(GrantId),
    #[error("contribution references unknown grant {0}")] UnknownGrant(GrantId),
    #[error("duplicate grant id {0} in registry")] DuplicateGrant(GrantId),
    #[error("empty payout address for grant {0}")] EmptyPayoutAddress(GrantId),
    #[error("empty contribution set")] EmptyContributionSet,
    #[error("invalid matching pot: {0}")] InvalidPot(f64),
    #[error("token decimals {got} exceed maximum {max}")] TokenDecimalsTooLarge { got: u32, max: u32 },
}

/// Numeric failure inside a matching algorithm.
///
/// The linear QF matcher cannot produce these on validated input; the
/// variant exists for the trait contract so other algorithms can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("non-finite intermediate while matching grant {0}")] NonFiniteIntermediate(GrantId),
}

/// Commitment construction failure.
///
/// `InsufficientLeaves` is the "commitment unavailable" outcome: raw
/// matches and predictions stay valid without a merkle artifact.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommitmentError {
    #[error("insufficient payout leaves: have {have}, need {need}")] InsufficientLeaves { have: usize, need: usize },
    #[error("match amount {amount} for {address} out of smallest-unit range")] AmountOutOfRange { address: String, amount: f64 },
    #[error("token total overflow")] TokenTotalOverflow,
}

/// Failure reported by a [`ScoreSource`](crate::traits::ScoreSource) or
/// [`ContentStore`](crate::traits::ContentStore) implementation.
///
/// The trust resolver converts these into [`ResolutionWarning`]s and
/// falls back to default scores; they never abort a computation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("timed out after {0:?}")] Timeout(Duration),
    #[error("unavailable: {0}")] Unavailable(String),
    #[error("malformed payload: {0}")] Malformed(String),
    #[error("not found: {0}")] NotFound(String),
}

/// Non-fatal notice attached to a [`Distribution`](crate::types::Distribution)
/// when trust-score resolution degraded to defaults.
#[derive(
    Error, Debug, Clone, PartialEq, Serialize, Deserialize,
    bincode::Encode, bincode::Decode,
)]
pub enum ResolutionWarning {
    #[error("trust snapshot {content_id} unresolved ({reason}); {affected} addresses defaulted")] SnapshotUnresolved { content_id: String, reason: String, affected: usize },
    #[error("score service unresolved ({reason}); {affected} addresses defaulted")] ServiceUnresolved { reason: String, affected: usize },
    #[error("score {score} for {address} outside [0, 1]; clamped")] ScoreClamped { address: String, score: f64 },
}

/// Umbrella error for the full pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)] Validation(#[from] ValidationError),
    #[error(transparent)] Match(#[from] MatchError),
    #[error(transparent)] Commitment(#[from] CommitmentError),
}
