//! Trait interfaces for the quadfund engine.
//!
//! These traits define the contracts between crates and toward external
//! collaborators:
//! - [`MatchingAlgorithm`] — raw match computation (qf-engine implements)
//! - [`ScoreSource`] — the external reputation service
//! - [`ContentStore`] — the content-addressed store for published snapshots
//!
//! `ScoreSource` and `ContentStore` implementations perform the only
//! blocking reads in a computation. Implementations must bound their own
//! I/O with the caller-configured fetch timeout and return
//! [`ResolveError::Timeout`] rather than hang; the resolver degrades to
//! default scores on any failure.

use std::collections::BTreeMap;

use crate::error::{MatchError, ResolveError};
use crate::types::{Address, ContentId, GrantAggregate, GrantId, GrantMatch, TrustScore};

/// Immutable per-computation context handed to a matching algorithm.
///
/// Constructed once per request from the round configuration; algorithms
/// must not depend on anything outside the aggregates and this context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchContext {
    /// Fixed matching pool in the round's common denomination.
    pub total_pot: f64,
    /// Smallest-unit decimals of the matching token.
    pub token_decimals: u32,
}

/// A matching formula turning grant aggregates into raw match amounts.
///
/// One entry per aggregate must be produced, in ascending grant-id order,
/// including zero-match entries, so the normalizer and commitment layers
/// see every grant with at least one qualifying contribution.
pub trait MatchingAlgorithm: Send + Sync {
    /// Short stable identifier ("linear"), recorded in logs.
    fn name(&self) -> &'static str;

    /// Compute raw (pre-normalization) matches for all aggregates.
    fn compute_raw_matches(
        &self,
        aggregates: &BTreeMap<GrantId, GrantAggregate>,
        ctx: &MatchContext,
    ) -> Result<Vec<GrantMatch>, MatchError>;
}

/// External reputation service returning per-address trust scores.
///
/// Queried at most once per computation, for the set of addresses not
/// already covered by supplied scores or a resolved snapshot.
pub trait ScoreSource: Send + Sync {
    /// Fetch scores for the given addresses. Addresses the service does
    /// not know may simply be absent from the result.
    fn fetch_scores(&self, addresses: &[Address]) -> Result<Vec<TrustScore>, ResolveError>;
}

/// Content-addressed store used to publish and resolve score snapshots
/// and round metadata. Opaque key/value; retries are the caller's
/// responsibility.
pub trait ContentStore: Send + Sync {
    /// Publish bytes, returning their content id.
    fn put(&self, bytes: &[u8]) -> Result<ContentId, ResolveError>;

    /// Resolve a content id back to its bytes.
    fn get(&self, id: &ContentId) -> Result<Vec<u8>, ResolveError>;
}
