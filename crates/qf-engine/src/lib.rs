//! # qf-engine — Quadratic-funding match computation.
//!
//! All matching arithmetic is double-precision floating point with a
//! pinned summation order (ascending grant id, then ascending contributor
//! address), so results are reproducible bit-for-bit.
//!
//! This crate implements the computation stages between raw contributions
//! and normalized per-grant matches:
//! - **Contribution aggregation**: per-grant, per-contributor summing with
//!   trust-bonus weighting applied at the summation step.
//! - **Trust-bonus resolution**: layered sources (supplied list, published
//!   snapshot, live service), degrading to a default score with warnings.
//! - **Linear QF matching**: `(Σ√w)² − Σw` per grant, behind the
//!   [`MatchingAlgorithm`](qf_core::traits::MatchingAlgorithm) trait.
//! - **Saturation normalization**: proportional scale-down when the
//!   computed total exceeds the pot.
//! - **Prediction curves**: probe-ladder what-if evaluation over cloned
//!   aggregates with piecewise-linear interpolation.

pub mod aggregate;
pub mod matcher;
pub mod normalizer;
pub mod pipeline;
pub mod prediction;
pub mod trust;

pub use matcher::LinearQf;
pub use normalizer::{normalize_matches, NormalizedMatches};
pub use pipeline::{MatchOutcome, RoundConfig, RoundEngine, RoundInputs};
pub use prediction::{PredictionCurve, ProbePoint};
