//! Contribution aggregation: group by grant, then by contributor.
//!
//! Same-contributor amounts are summed before the square-root step, which
//! dampens split-donation Sybil attempts. Trust weighting is applied while
//! summing, so a [`GrantAggregate`] holds weighted amounts.
//!
//! Callers must validate the batch first
//! ([`qf_core::validation::validate_contributions`]); this stage assumes
//! in-domain records and silently skips nothing else.

use std::collections::{BTreeMap, BTreeSet};

use qf_core::constants::DEFAULT_TRUST_SCORE;
use qf_core::types::{Address, Contribution, Grant, GrantAggregate, GrantId};

/// Build per-grant aggregates from a validated contribution batch.
///
/// - `scores` maps contributor addresses to trust weights; absent
///   addresses weigh [`DEFAULT_TRUST_SCORE`].
/// - `restrict_to` limits aggregation to the given grant ids; `None`
///   aggregates every registered grant.
///
/// Per-pair amounts are summed smallest-first, so the feed's arrival
/// order cannot leak into float summation: any permutation of the batch
/// produces bit-identical aggregates.
///
/// Grants with no surviving contributions are omitted; the matcher emits
/// zero-match entries only for grants that appear here.
pub fn aggregate_contributions(
    contributions: &[Contribution],
    grants: &[Grant],
    scores: &BTreeMap<Address, f64>,
    restrict_to: Option<&BTreeSet<GrantId>>,
) -> BTreeMap<GrantId, GrantAggregate> {
    let payout_by_grant: BTreeMap<GrantId, &Address> =
        grants.iter().map(|g| (g.id, &g.payout_address)).collect();

    // Collect raw per-pair amounts first, then fold each pair in a
    // pinned order.
    let mut raw: BTreeMap<GrantId, BTreeMap<Address, Vec<f64>>> = BTreeMap::new();
    for c in contributions {
        if let Some(filter) = restrict_to {
            if !filter.contains(&c.grant_id) {
                continue;
            }
        }
        if !payout_by_grant.contains_key(&c.grant_id) {
            // Unknown grants are a validation error upstream.
            continue;
        }
        raw.entry(c.grant_id)
            .or_default()
            .entry(c.contributor.clone())
            .or_default()
            .push(c.amount);
    }

    raw.into_iter()
        .filter_map(|(grant_id, by_contributor)| {
            let payout_address = (*payout_by_grant.get(&grant_id)?).clone();
            let contributions = by_contributor
                .into_iter()
                .map(|(address, mut amounts)| {
                    amounts.sort_by(f64::total_cmp);
                    let sum: f64 = amounts.iter().sum();
                    let weight = scores
                        .get(&address)
                        .copied()
                        .unwrap_or(DEFAULT_TRUST_SCORE);
                    (address, sum * weight)
                })
                .collect();
            Some((
                grant_id,
                GrantAggregate {
                    grant_id,
                    payout_address,
                    contributions,
                },
            ))
        })
        .collect()
}

/// Collect the distinct contributor addresses of a batch, honoring the
/// same grant filter as aggregation. This is the address set handed to
/// trust resolution.
pub fn contributor_addresses(
    contributions: &[Contribution],
    restrict_to: Option<&BTreeSet<GrantId>>,
) -> BTreeSet<Address> {
    contributions
        .iter()
        .filter(|c| restrict_to.is_none_or(|f| f.contains(&c.grant_id)))
        .map(|c| c.contributor.clone())
        .collect()
}
