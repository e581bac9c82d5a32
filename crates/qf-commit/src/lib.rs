//! # qf-commit — Payout aggregation and merkle commitments.
//!
//! Turns normalized per-grant matches into the published payout artifact:
//! - **Payout aggregation**: one claim per payout address, never per
//!   grant, so the payout contract sees no duplicate-claim ambiguity.
//! - **Commitment construction**: a domain-separated BLAKE3 merkle tree
//!   over `(index, address, amount)` leaves with per-claim proofs.
//! - **Verification**: recompute the whole pipeline from raw inputs and
//!   compare roots; a mismatch is a reported outcome, not an error.

pub mod commitment;
pub mod distribute;
pub mod payout;
pub mod verify;

pub use commitment::{build_commitment, compute_root, encode_leaf, proof_for, verify_claim};
pub use distribute::compute_distribution;
pub use payout::aggregate_payouts;
pub use verify::verify_distribution;
