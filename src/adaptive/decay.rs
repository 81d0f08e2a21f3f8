//! Time decay of stored mastery.
//!
//! decayed = mastery - days_elapsed * max(0, 1 - mastery / rate_divisor) * daily_factor
//!
//! Higher mastery decays slower. Nothing decays inside the grace period, and
//! the result is floored at 0 and rounded to `decimals` places.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::adaptive::config::DecayParams;
use crate::adaptive::graph::ConceptGraph;
use crate::adaptive::mastery::clamp_mastery;
use crate::adaptive::types::LearnerStateSnapshot;

const MS_PER_DAY: f64 = 86_400_000.0;

/// concept_id -> mastery after decay. The only mastery decisions may read.
pub type EffectiveMasteryMap = BTreeMap<String, f64>;

pub fn effective_mastery(
    mastery: f64,
    last_seen: DateTime<Utc>,
    now: DateTime<Utc>,
    params: &DecayParams,
) -> f64 {
    let mastery = clamp_mastery(mastery);
    let elapsed = now - last_seen;
    // grace_minutes may exceed what a Duration can hold
    if elapsed.num_minutes() < params.grace_minutes {
        return mastery;
    }

    let days_elapsed = elapsed.num_milliseconds() as f64 / MS_PER_DAY;
    let decay_rate = (1.0 - mastery / params.rate_divisor).max(0.0);
    let decayed = mastery - days_elapsed * decay_rate * params.daily_factor;

    let scale = 10f64.powi(params.decimals);
    // rounding must not lift the value above what was stored
    ((decayed * scale).round() / scale).max(0.0).min(mastery)
}

/// Effective mastery for every concept in the graph. Concepts the learner has
/// never touched fall back to the graph's seed values; a seed without a
/// last-seen time does not decay.
pub fn compute_effective_mastery(
    graph: &ConceptGraph,
    ledger: &LearnerStateSnapshot,
    now: DateTime<Utc>,
    params: &DecayParams,
) -> EffectiveMasteryMap {
    graph
        .concepts()
        .iter()
        .map(|concept| {
            let value = match ledger.concepts.get(&concept.concept_id) {
                Some(progress) => {
                    effective_mastery(progress.mastery, progress.last_seen, now, params)
                }
                None => match concept.last_seen {
                    Some(last_seen) => effective_mastery(concept.mastery, last_seen, now, params),
                    None => clamp_mastery(concept.mastery),
                },
            };
            (concept.concept_id.clone(), value)
        })
        .collect()
}
