//! Whole-batch input validation.
//!
//! A computation request is validated in full before any aggregation:
//! the first offending record aborts the batch with a precise reason.
//! No partial aggregation of a corrupt batch ever happens.

use std::collections::BTreeSet;

use crate::constants::MAX_TOKEN_DECIMALS;
use crate::error::ValidationError;
use crate::types::{Contribution, Grant, GrantId};

/// Validate the matching pot: finite and non-negative.
pub fn validate_pot(total_pot: f64) -> Result<(), ValidationError> {
    if !total_pot.is_finite() || total_pot < 0.0 {
        return Err(ValidationError::InvalidPot(total_pot));
    }
    Ok(())
}

/// Validate the token decimals against the smallest-unit range cap.
pub fn validate_token_decimals(decimals: u32) -> Result<(), ValidationError> {
    if decimals > MAX_TOKEN_DECIMALS {
        return Err(ValidationError::TokenDecimalsTooLarge {
            got: decimals,
            max: MAX_TOKEN_DECIMALS,
        });
    }
    Ok(())
}

/// Validate the grant registry and return the set of known grant ids.
///
/// Rejects duplicate ids and empty payout addresses.
pub fn validate_grants(grants: &[Grant]) -> Result<BTreeSet<GrantId>, ValidationError> {
    let mut known = BTreeSet::new();
    for grant in grants {
        if grant.payout_address.is_empty() {
            return Err(ValidationError::EmptyPayoutAddress(grant.id));
        }
        if !known.insert(grant.id) {
            return Err(ValidationError::DuplicateGrant(grant.id));
        }
    }
    Ok(known)
}

/// Validate a contribution batch against the known grant set.
///
/// Amounts must be finite and non-negative, contributor addresses
/// non-empty, and every referenced grant registered.
pub fn validate_contributions(
    contributions: &[Contribution],
    known_grants: &BTreeSet<GrantId>,
) -> Result<(), ValidationError> {
    if contributions.is_empty() {
        return Err(ValidationError::EmptyContributionSet);
    }
    for c in contributions {
        if !c.amount.is_finite() {
            return Err(ValidationError::NonFiniteAmount {
                grant_id: c.grant_id,
                contributor: c.contributor.to_string(),
            });
        }
        if c.amount < 0.0 {
            return Err(ValidationError::NegativeAmount {
                grant_id: c.grant_id,
                contributor: c.contributor.to_string(),
                amount: c.amount,
            });
        }
        if c.contributor.is_empty() {
            return Err(ValidationError::EmptyContributorAddress(c.grant_id));
        }
        if !known_grants.contains(&c.grant_id) {
            return Err(ValidationError::UnknownGrant(c.grant_id));
        }
    }
    Ok(())
}
