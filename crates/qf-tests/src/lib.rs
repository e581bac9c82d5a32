//! End-to-end and adversarial test suite for quadfund.
//!
//! This crate contains integration tests that exercise the complete
//! pipeline (validation, trust resolution, aggregation, matching,
//! normalization, payout aggregation, commitment) and attempt to break
//! its invariants from an attacker's perspective.

pub mod helpers;
