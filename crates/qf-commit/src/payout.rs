//! Payout aggregation: collapse per-grant matches to per-address totals.
//!
//! A single address may be configured as payee for multiple grants; the
//! commitment must issue one claim per address. Grants whose
//! post-normalization match is exactly zero are excluded: a zero-value
//! leaf is meaningless for a claim.

use std::collections::BTreeMap;

use qf_core::types::{Address, GrantMatch, PayoutAggregate};

/// Group matches by payout address, unioning grant ids and summing
/// amounts. Output is ascending by payout address.
pub fn aggregate_payouts(matches: &[GrantMatch]) -> Vec<PayoutAggregate> {
    let mut by_address: BTreeMap<Address, PayoutAggregate> = BTreeMap::new();

    for m in matches {
        if m.match_amount == 0.0 {
            continue;
        }
        by_address
            .entry(m.payout_address.clone())
            .and_modify(|agg| {
                agg.grant_ids.insert(m.grant_id);
                agg.match_amount += m.match_amount;
            })
            .or_insert_with(|| PayoutAggregate {
                payout_address: m.payout_address.clone(),
                grant_ids: [m.grant_id].into_iter().collect(),
                match_amount: m.match_amount,
            });
    }

    by_address.into_values().collect()
}
