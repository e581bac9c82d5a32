//! The round pipeline: validated inputs through normalized matches.
//!
//! Configuration is an explicit immutable struct built once per
//! computation request; every stage is a pure function of the inputs and
//! this config, so recomputation is bit-for-bit reproducible.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use tracing::debug;

use qf_core::error::{EngineError, ResolutionWarning};
use qf_core::traits::{ContentStore, MatchContext, MatchingAlgorithm, ScoreSource};
use qf_core::types::{
    ContentId, Contribution, Grant, GrantAggregate, GrantId, GrantMatch, TrustScore,
};
use qf_core::validation;

use crate::aggregate::{aggregate_contributions, contributor_addresses};
use crate::matcher::LinearQf;
use crate::normalizer::normalize_matches;
use crate::trust::resolve_scores;

/// Default bound on external fetches (trust snapshots, score service).
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Immutable per-request round configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundConfig {
    /// Fixed matching pool, in the round's common denomination.
    pub total_pot: f64,
    /// Smallest-unit decimals of the matching token.
    pub token_decimals: u32,
    /// Restrict the computation to these grants; `None` means all.
    pub grant_filter: Option<BTreeSet<GrantId>>,
    /// Bound that `ScoreSource`/`ContentStore` implementations must apply
    /// to their blocking reads.
    pub fetch_timeout: Duration,
}

impl RoundConfig {
    /// Config with no grant filter and the default fetch timeout.
    pub fn new(total_pot: f64, token_decimals: u32) -> Self {
        Self {
            total_pot,
            token_decimals,
            grant_filter: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Restrict the computation to a set of grant ids.
    pub fn with_grant_filter(mut self, filter: BTreeSet<GrantId>) -> Self {
        self.grant_filter = Some(filter);
        self
    }

    /// Override the external fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// The context handed to the matching algorithm.
    pub fn match_context(&self) -> MatchContext {
        MatchContext {
            total_pot: self.total_pot,
            token_decimals: self.token_decimals,
        }
    }
}

/// The external feeds for one computation, borrowed for its duration.
///
/// The ledger feed (contributions, grants) is required; trust sources are
/// optional and layered per
/// [`resolve_scores`](crate::trust::resolve_scores).
#[derive(Clone, Copy)]
pub struct RoundInputs<'a> {
    pub contributions: &'a [Contribution],
    pub grants: &'a [Grant],
    pub trust_scores: Option<&'a [TrustScore]>,
    pub score_snapshot: Option<&'a ContentId>,
    pub content_store: Option<&'a dyn ContentStore>,
    pub score_source: Option<&'a dyn ScoreSource>,
}

impl<'a> RoundInputs<'a> {
    /// Inputs with only the ledger feed.
    pub fn new(contributions: &'a [Contribution], grants: &'a [Grant]) -> Self {
        Self {
            contributions,
            grants,
            trust_scores: None,
            score_snapshot: None,
            content_store: None,
            score_source: None,
        }
    }

    /// Attach a caller-supplied score list.
    pub fn with_trust_scores(mut self, scores: &'a [TrustScore]) -> Self {
        self.trust_scores = Some(scores);
        self
    }

    /// Attach a published score snapshot and the store resolving it.
    pub fn with_snapshot(mut self, id: &'a ContentId, store: &'a dyn ContentStore) -> Self {
        self.score_snapshot = Some(id);
        self.content_store = Some(store);
        self
    }

    /// Attach a live reputation service.
    pub fn with_score_source(mut self, source: &'a dyn ScoreSource) -> Self {
        self.score_source = Some(source);
        self
    }
}

/// Matcher + normalizer output for one computation.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// One entry per grant with at least one qualifying contribution,
    /// ascending by grant id.
    pub grant_matches: Vec<GrantMatch>,
    pub has_saturated: bool,
    pub warnings: Vec<ResolutionWarning>,
}

/// Validated and aggregated inputs, shared between the match and
/// prediction paths.
pub(crate) struct PreparedRound {
    pub aggregates: BTreeMap<GrantId, GrantAggregate>,
    pub warnings: Vec<ResolutionWarning>,
}

/// The round computation engine, parameterized by matching algorithm.
#[derive(Debug, Clone, Default)]
pub struct RoundEngine<A: MatchingAlgorithm> {
    algorithm: A,
}

impl RoundEngine<LinearQf> {
    /// Engine with the linear QF matcher.
    pub fn linear() -> Self {
        Self::new(LinearQf::new())
    }
}

impl<A: MatchingAlgorithm> RoundEngine<A> {
    pub fn new(algorithm: A) -> Self {
        Self { algorithm }
    }

    /// The configured matching algorithm.
    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    /// Validate, resolve trust, and aggregate.
    ///
    /// `allow_empty` relaxes the non-empty-batch rule for the prediction
    /// path, where a round may not have received donations yet.
    pub(crate) fn prepare(
        &self,
        inputs: &RoundInputs<'_>,
        config: &RoundConfig,
        allow_empty: bool,
    ) -> Result<PreparedRound, EngineError> {
        validation::validate_pot(config.total_pot)?;
        validation::validate_token_decimals(config.token_decimals)?;
        let known = validation::validate_grants(inputs.grants)?;
        if inputs.contributions.is_empty() && allow_empty {
            return Ok(PreparedRound {
                aggregates: BTreeMap::new(),
                warnings: Vec::new(),
            });
        }
        validation::validate_contributions(inputs.contributions, &known)?;

        let filter = config.grant_filter.as_ref();
        let addresses = contributor_addresses(inputs.contributions, filter);
        let resolved = resolve_scores(
            &addresses,
            inputs.trust_scores,
            inputs
                .score_snapshot
                .zip(inputs.content_store),
            inputs.score_source,
        );

        let aggregates =
            aggregate_contributions(inputs.contributions, inputs.grants, &resolved.scores, filter);
        debug!(
            grants = aggregates.len(),
            contributors = addresses.len(),
            "round: aggregated contributions"
        );

        Ok(PreparedRound {
            aggregates,
            warnings: resolved.warnings,
        })
    }

    /// Run the match pipeline: validate → aggregate → match → normalize.
    pub fn compute_matches(
        &self,
        inputs: &RoundInputs<'_>,
        config: &RoundConfig,
    ) -> Result<MatchOutcome, EngineError> {
        let prepared = self.prepare(inputs, config, false)?;

        let raw = self
            .algorithm
            .compute_raw_matches(&prepared.aggregates, &config.match_context())?;
        let normalized = normalize_matches(raw, config.total_pot);

        debug!(
            algorithm = self.algorithm.name(),
            grants = normalized.matches.len(),
            saturated = normalized.has_saturated,
            "round: matches computed"
        );

        Ok(MatchOutcome {
            grant_matches: normalized.matches,
            has_saturated: normalized.has_saturated,
            warnings: prepared.warnings,
        })
    }
}
