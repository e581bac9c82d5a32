//! Merkle commitment construction over payout aggregates.
//!
//! Each leaf commits to `(index, payout address, amount)` with a fixed
//! byte layout: `index (u32 LE) || address bytes || amount (u128 LE)`.
//! Indexes are assigned by ascending payout address, so two independent
//! recomputations over the same input set produce identical indexes and
//! therefore identical proofs.
//!
//! Amounts are converted to integer smallest units with round-half-up at
//! `token_decimals` before hashing: the eventual payout is an integer
//! token transfer, and the rounding rule is part of what the root
//! commits to.

use tracing::debug;

use qf_core::constants::MIN_COMMITMENT_LEAVES;
use qf_core::error::CommitmentError;
use qf_core::merkle::{self, MerkleTree, ProofStep};
use qf_core::types::{Address, Claim, Commitment, Hash256, PayoutAggregate};

/// Convert a match amount to smallest token units, rounding half up.
///
/// `floor(amount * 10^decimals + 0.5)`. Returns `None` for negative or
/// non-finite amounts, or when the scaled value leaves u128 range.
pub fn to_smallest_units(amount: f64, decimals: u32) -> Option<u128> {
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    let scaled = amount * 10f64.powi(decimals as i32) + 0.5;
    if !scaled.is_finite() || scaled >= u128::MAX as f64 {
        return None;
    }
    Some(scaled.floor() as u128)
}

/// Encode one claim leaf: `index (u32 LE) || address || amount (u128 LE)`.
pub fn encode_leaf(index: u32, address: &Address, amount: u128) -> Vec<u8> {
    let mut leaf = Vec::with_capacity(4 + address.as_bytes().len() + 16);
    leaf.extend_from_slice(&index.to_le_bytes());
    leaf.extend_from_slice(address.as_bytes());
    leaf.extend_from_slice(&amount.to_le_bytes());
    leaf
}

/// Order payouts by ascending address and convert amounts to units.
///
/// Shared by [`build_commitment`] and [`compute_root`] so both commit to
/// exactly the same leaf set.
fn claim_rows(
    payouts: &[PayoutAggregate],
    token_decimals: u32,
) -> Result<Vec<(u32, &Address, u128)>, CommitmentError> {
    let mut ordered: Vec<&PayoutAggregate> = payouts.iter().collect();
    ordered.sort_by(|a, b| a.payout_address.cmp(&b.payout_address));

    let mut rows = Vec::with_capacity(ordered.len());
    for (index, agg) in ordered.iter().enumerate() {
        let amount = to_smallest_units(agg.match_amount, token_decimals).ok_or_else(|| {
            CommitmentError::AmountOutOfRange {
                address: agg.payout_address.to_string(),
                amount: agg.match_amount,
            }
        })?;
        rows.push((index as u32, &agg.payout_address, amount));
    }
    Ok(rows)
}

/// Build the full payout commitment: root, token total, and the claims
/// map with per-claim proofs.
///
/// Requires at least [`MIN_COMMITMENT_LEAVES`] payout aggregates;
/// with fewer the commitment is unavailable
/// ([`CommitmentError::InsufficientLeaves`]).
pub fn build_commitment(
    payouts: &[PayoutAggregate],
    token_decimals: u32,
) -> Result<Commitment, CommitmentError> {
    if payouts.len() < MIN_COMMITMENT_LEAVES {
        return Err(CommitmentError::InsufficientLeaves {
            have: payouts.len(),
            need: MIN_COMMITMENT_LEAVES,
        });
    }

    let rows = claim_rows(payouts, token_decimals)?;

    let mut token_total: u128 = 0;
    for (_, _, amount) in &rows {
        token_total = token_total
            .checked_add(*amount)
            .ok_or(CommitmentError::TokenTotalOverflow)?;
    }

    let leaves: Vec<Vec<u8>> = rows
        .iter()
        .map(|(index, address, amount)| encode_leaf(*index, address, *amount))
        .collect();
    let tree = MerkleTree::from_leaves(&leaves);

    let mut claims = std::collections::BTreeMap::new();
    for (index, address, amount) in rows {
        // Index is in bounds by construction.
        let proof = tree
            .proof(index as usize)
            .map(|p| p.path)
            .unwrap_or_default();
        claims.insert(
            (*address).clone(),
            Claim {
                index,
                amount,
                proof,
            },
        );
    }

    let root = tree.root();
    debug!(%root, leaves = claims.len(), token_total, "commitment: built");

    Ok(Commitment {
        root,
        token_total,
        claims,
    })
}

/// Compute only the root over a payout set, without proofs.
///
/// The verify path recomputes this from raw inputs and compares against
/// a published root.
pub fn compute_root(
    payouts: &[PayoutAggregate],
    token_decimals: u32,
) -> Result<Hash256, CommitmentError> {
    if payouts.len() < MIN_COMMITMENT_LEAVES {
        return Err(CommitmentError::InsufficientLeaves {
            have: payouts.len(),
            need: MIN_COMMITMENT_LEAVES,
        });
    }
    let rows = claim_rows(payouts, token_decimals)?;
    let leaves: Vec<Vec<u8>> = rows
        .iter()
        .map(|(index, address, amount)| encode_leaf(*index, address, *amount))
        .collect();
    Ok(merkle::merkle_root(&leaves))
}

/// The sibling hashes proving a payee's claim, if the payee is committed.
pub fn proof_for<'a>(commitment: &'a Commitment, address: &Address) -> Option<&'a [ProofStep]> {
    commitment.claims.get(address).map(|c| c.proof.as_slice())
}

/// Check a single claim against the commitment's root using standard
/// merkle proof verification over the re-encoded leaf.
pub fn verify_claim(commitment: &Commitment, address: &Address) -> bool {
    let Some(claim) = commitment.claims.get(address) else {
        return false;
    };
    let leaf = encode_leaf(claim.index, address, claim.amount);
    merkle::fold_path(merkle::leaf_hash(&leaf), &claim.proof) == commitment.root
}
