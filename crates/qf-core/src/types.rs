//! Core round types: contributions, grants, matches, claims.
//!
//! Monetary amounts stay in double-precision floats denominated in the
//! round's matching token until commitment time, where they are converted
//! to integer smallest units. Every map keyed by address or grant id is a
//! BTree collection so that iteration (and therefore floating-point
//! summation) follows one pinned ascending order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ResolutionWarning;
use crate::merkle::ProofStep;

/// Stable numeric identifier of a grant within a round.
pub type GrantId = u64;

/// A 32-byte hash value.
///
/// Used for merkle leaves, internal nodes, and the published root
/// (all BLAKE3).
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The zero hash (32 zero bytes). Root of an empty tree.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create a Hash256 from a byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a 64-character hex string, as published in a round artifact.
    pub fn from_hex(s: &str) -> Option<Self> {
        let raw = hex::decode(s.trim()).ok()?;
        let bytes: [u8; 32] = raw.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A contributor or payout address, normalized at construction.
///
/// Addresses arrive from the ledger layer in mixed case; normalization
/// (trim + lowercase) makes same-contributor aggregation and the
/// ascending leaf order independent of how the feed rendered them.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
    bincode::Encode, bincode::Decode,
)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Normalize a raw address string.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_lowercase())
    }

    /// The normalized address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The normalized address bytes, as committed in merkle leaves.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Whether normalization left nothing behind.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Opaque key into the content-addressed store.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
    bincode::Encode, bincode::Decode,
)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fundable recipient registered for the round.
///
/// The payout address comes from the round registry, never from
/// contribution records.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct Grant {
    /// Stable grant identifier.
    pub id: GrantId,
    /// Address that claims this grant's match.
    pub payout_address: Address,
}

/// One recorded donation. Immutable; many contributions may exist per
/// (grant, contributor) pair and are summed, never overwritten.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq,
    bincode::Encode, bincode::Decode,
)]
pub struct Contribution {
    /// Grant receiving the donation.
    pub grant_id: GrantId,
    /// Donor address.
    pub contributor: Address,
    /// Non-negative amount in the round's common denomination.
    pub amount: f64,
}

/// Per-address trust-bonus score in `[0, 1]`.
///
/// A read-only input snapshot; absent addresses default to
/// [`DEFAULT_TRUST_SCORE`](crate::constants::DEFAULT_TRUST_SCORE).
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq,
    bincode::Encode, bincode::Decode,
)]
pub struct TrustScore {
    pub address: Address,
    pub score: f64,
}

/// Per-grant view of the contribution set after weighting and
/// same-contributor summing. Built fresh on every computation.
#[derive(Clone, Debug, PartialEq)]
pub struct GrantAggregate {
    pub grant_id: GrantId,
    pub payout_address: Address,
    /// Contributor address → summed trust-weighted amount.
    pub contributions: BTreeMap<Address, f64>,
}

impl GrantAggregate {
    /// Number of distinct contributors.
    pub fn contributor_count(&self) -> usize {
        self.contributions.len()
    }

    /// Sum of weighted amounts, in ascending contributor order.
    pub fn total_weighted(&self) -> f64 {
        self.contributions.values().sum()
    }
}

/// One grant's match amount: the matcher's output before normalization,
/// and the normalizer's output after.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq,
    bincode::Encode, bincode::Decode,
)]
pub struct GrantMatch {
    pub grant_id: GrantId,
    pub payout_address: Address,
    pub match_amount: f64,
}

/// Per-payout-address collapse of grant matches. One entry per unique
/// address; a payee may own multiple grants.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq,
    bincode::Encode, bincode::Decode,
)]
pub struct PayoutAggregate {
    pub payout_address: Address,
    /// Deduplicated grants this address collects for.
    pub grant_ids: BTreeSet<GrantId>,
    pub match_amount: f64,
}

/// A single authorizable claim within a commitment.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct Claim {
    /// Leaf index, assigned by ascending payout address.
    pub index: u32,
    /// Match amount in smallest token units (round-half-up).
    pub amount: u128,
    /// Sibling hashes from leaf level up to the root.
    pub proof: Vec<ProofStep>,
}

/// The published payout commitment: a merkle root over all claims plus
/// the claims map itself.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct Commitment {
    /// Root of the claim tree; the externally verifiable artifact.
    pub root: Hash256,
    /// Sum of all claim amounts in smallest token units.
    pub token_total: u128,
    /// Payout address → claim, in ascending address order.
    pub claims: BTreeMap<Address, Claim>,
}

impl Commitment {
    /// The root as a hex string, as committed on-chain.
    pub fn root_hex(&self) -> String {
        self.root.to_string()
    }

    /// Look up the claim for a payout address.
    pub fn claim_for(&self, address: &Address) -> Option<&Claim> {
        self.claims.get(address)
    }
}

/// The full result of one matching computation. A value type: recomputed,
/// never mutated.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq,
    bincode::Encode, bincode::Decode,
)]
pub struct Distribution {
    /// One entry per grant with at least one qualifying contribution.
    pub grant_matches: Vec<GrantMatch>,
    /// Whether matches were proportionally scaled down to fit the pot.
    pub has_saturated: bool,
    /// Per-payout-address totals; zero-match grants excluded.
    pub payout_matches: Vec<PayoutAggregate>,
    /// `None` when fewer than two payout leaves exist.
    pub commitment: Option<Commitment>,
    /// Non-fatal notices from trust-score resolution.
    pub warnings: Vec<ResolutionWarning>,
}

impl Distribution {
    /// Match amount for a grant, if it received contributions.
    pub fn match_for(&self, grant_id: GrantId) -> Option<f64> {
        self.grant_matches
            .iter()
            .find(|m| m.grant_id == grant_id)
            .map(|m| m.match_amount)
    }

    /// Sum of all grant matches.
    pub fn total_matched(&self) -> f64 {
        self.grant_matches.iter().map(|m| m.match_amount).sum()
    }
}

/// Result of checking a recomputed distribution against a published root.
///
/// A mismatch is a reportable outcome, never an error; both hashes are
/// carried for audit.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct VerificationOutcome {
    pub matches: bool,
    pub expected_root: Hash256,
    pub computed_root: Hash256,
}
