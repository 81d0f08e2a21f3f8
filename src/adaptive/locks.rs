use std::collections::HashSet;

use crate::adaptive::config::LockParams;
use crate::adaptive::decay::EffectiveMasteryMap;
use crate::adaptive::graph::ConceptGraph;
use crate::adaptive::types::ConceptLockState;

/// One lock state per concept, in graph order. A prerequisite missing from the
/// mastery map counts as 0.
pub fn compute_locks(
    graph: &ConceptGraph,
    effective: &EffectiveMasteryMap,
    params: &LockParams,
) -> Vec<ConceptLockState> {
    graph
        .concepts()
        .iter()
        .map(|concept| {
            let unmet_prerequisites: Vec<String> = concept
                .prerequisites
                .iter()
                .filter(|id| effective.get(*id).copied().unwrap_or(0.0) < params.threshold)
                .cloned()
                .collect();
            ConceptLockState {
                concept_id: concept.concept_id.clone(),
                locked: !unmet_prerequisites.is_empty(),
                unmet_prerequisites,
            }
        })
        .collect()
}

pub fn locked_ids(locks: &[ConceptLockState]) -> HashSet<&str> {
    locks
        .iter()
        .filter(|l| l.locked)
        .map(|l| l.concept_id.as_str())
        .collect()
}
