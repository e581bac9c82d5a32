//! Shared test helpers for E2E and adversarial tests.

use qf_core::types::{Address, Contribution, Grant, GrantId, TrustScore};

/// Grant with a payout address derived from its id.
pub fn grant(id: GrantId) -> Grant {
    Grant {
        id,
        payout_address: Address::new(format!("0xpay{id:04x}")),
    }
}

/// Grant with an explicit payout address.
pub fn grant_to(id: GrantId, payout: &str) -> Grant {
    Grant {
        id,
        payout_address: Address::new(payout),
    }
}

/// Single contribution record.
pub fn contribution(grant_id: GrantId, contributor: &str, amount: f64) -> Contribution {
    Contribution {
        grant_id,
        contributor: Address::new(contributor),
        amount,
    }
}

/// `count` contributions of `amount` each, from distinct addresses unique
/// to the grant.
pub fn distinct_donors(grant_id: GrantId, count: usize, amount: f64) -> Vec<Contribution> {
    (0..count)
        .map(|i| contribution(grant_id, &format!("0xg{grant_id}d{i:03}"), amount))
        .collect()
}

/// Full-trust scores covering every contributor of a batch.
pub fn full_trust(batch: &[Contribution]) -> Vec<TrustScore> {
    batch
        .iter()
        .map(|c| TrustScore {
            address: c.contributor.clone(),
            score: 1.0,
        })
        .collect()
}

/// `n` equal donors produce a raw linear QF match of `n²w − nw`; solve a
/// donor layout for a wanted raw match with unit weights.
///
/// `donors_for_match(30)` gives 6 donors of 1.0 (36 − 6), etc. Panics if
/// `wanted` is not exactly `n² − n` for some n, so tests state their
/// arithmetic explicitly.
pub fn donors_for_match(wanted: u64) -> usize {
    for n in 1..=1_000u64 {
        if n * n - n == wanted {
            return n as usize;
        }
    }
    panic!("{wanted} is not n²−n for any small n");
}
