//! Engine constants. Amounts are in the round's common denomination.

/// Trust-bonus score assigned to addresses with no resolved score.
pub const DEFAULT_TRUST_SCORE: f64 = 0.5;

/// Hypothetical contribution sizes sampled when building a prediction
/// curve. Arbitrary query amounts interpolate between adjacent rungs.
pub const PROBE_LADDER: [f64; 6] = [0.0, 1.0, 10.0, 100.0, 1_000.0, 10_000.0];

/// Minimum number of payout leaves required to build a commitment.
/// Below this the builder reports "commitment unavailable" instead of
/// fabricating a degenerate tree.
pub const MIN_COMMITMENT_LEAVES: usize = 2;

/// Upper bound on `token_decimals`. Keeps `10^decimals` scaling well
/// inside u128 range together with realistic pot sizes.
pub const MAX_TOKEN_DECIMALS: u32 = 30;

/// Absolute tolerance when asserting that a saturated distribution sums
/// exactly to the pot.
pub const SATURATION_TOLERANCE: f64 = 1e-9;
