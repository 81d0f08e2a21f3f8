use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adaptive::cognitive::{assess_cognitive_state, BehavioralSignals};
use crate::adaptive::config::AdaptiveConfig;
use crate::adaptive::decay::compute_effective_mastery;
use crate::adaptive::decision::decide_next_action;
use crate::adaptive::error::AdaptiveError;
use crate::adaptive::graph::ConceptGraph;
use crate::adaptive::locks::compute_locks;
use crate::adaptive::mastery::{
    apply_interaction_events, validate_batch, InteractionEvent, MasteryDelta,
};
use crate::adaptive::store::LearnerStore;
use crate::adaptive::types::{
    CognitiveState, ConceptLockState, ExplanationMode, LearnerStateSnapshot, NextAction,
    SessionParams,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionOutcome {
    pub updates: Vec<MasteryDelta>,
    pub learner_state: LearnerStateSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    #[serde(flatten)]
    pub action: NextAction,
    pub prerequisite_locks: Vec<ConceptLockState>,
}

/// One full update-assess-decide round for a learner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CycleRequest {
    #[serde(default)]
    pub events: Vec<InteractionEvent>,
    #[serde(default)]
    pub explicit_checkin: Option<CognitiveState>,
    #[serde(default)]
    pub signals: BehavioralSignals,
    #[serde(default)]
    pub current_modality: Option<ExplanationMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleResponse {
    pub updates: Vec<MasteryDelta>,
    pub session_params: SessionParams,
    pub decision: Decision,
    pub learner_state: LearnerStateSnapshot,
}

pub struct AdaptiveEngine {
    config: Arc<AdaptiveConfig>,
    store: LearnerStore,
}

impl AdaptiveEngine {
    pub fn new(config: AdaptiveConfig) -> Self {
        Self {
            config: Arc::new(config),
            store: LearnerStore::new(),
        }
    }

    pub fn learner_state(&self, learner_id: &str) -> Option<LearnerStateSnapshot> {
        self.store.snapshot(learner_id)
    }

    pub fn record_interactions(
        &self,
        learner_id: &str,
        graph: &ConceptGraph,
        events: &[InteractionEvent],
        now: DateTime<Utc>,
    ) -> Result<InteractionOutcome, AdaptiveError> {
        // reject before the learner's slot is even created
        if let Err(err) = validate_batch(graph, events) {
            tracing::warn!(learner_id, error = %err, "interaction batch rejected");
            return Err(err);
        }

        let gains = &self.config.mastery;
        self.store
            .with_learner(learner_id, |state| -> Result<InteractionOutcome, AdaptiveError> {
                let updates = apply_interaction_events(graph, state, events, now, gains)?;
                tracing::info!(learner_id, events = updates.len(), "interaction batch applied");
                Ok(InteractionOutcome {
                    updates,
                    learner_state: state.clone(),
                })
            })
    }

    pub fn assess(
        &self,
        learner_id: &str,
        explicit_checkin: Option<CognitiveState>,
        signals: &BehavioralSignals,
        current_modality: Option<ExplanationMode>,
    ) -> SessionParams {
        self.store.with_learner(learner_id, |state| {
            self.assess_locked(state, explicit_checkin, signals, current_modality)
        })
    }

    pub fn next_action(
        &self,
        learner_id: &str,
        graph: &ConceptGraph,
        session: &SessionParams,
        now: DateTime<Utc>,
    ) -> Decision {
        self.store
            .with_learner(learner_id, |state| self.decide_locked(state, graph, session, now))
    }

    /// Applies the events, assesses the learner and picks the next action while
    /// holding the learner's lock for the whole round.
    pub fn run_cycle(
        &self,
        learner_id: &str,
        graph: &ConceptGraph,
        request: &CycleRequest,
        now: DateTime<Utc>,
    ) -> Result<CycleResponse, AdaptiveError> {
        if let Err(err) = validate_batch(graph, &request.events) {
            tracing::warn!(learner_id, error = %err, "interaction batch rejected");
            return Err(err);
        }

        let gains = &self.config.mastery;
        self.store.with_learner(learner_id, |state| -> Result<CycleResponse, AdaptiveError> {
            let updates = apply_interaction_events(graph, state, &request.events, now, gains)?;
            let session_params = self.assess_locked(
                state,
                request.explicit_checkin,
                &request.signals,
                request.current_modality,
            );
            let decision = self.decide_locked(state, graph, &session_params, now);

            tracing::info!(
                learner_id,
                events = updates.len(),
                state = session_params.cognitive_state.as_str(),
                next = decision.action.next_concept_id.as_deref().unwrap_or("-"),
                "adaptive cycle complete"
            );
            Ok(CycleResponse {
                updates,
                session_params,
                decision,
                learner_state: state.clone(),
            })
        })
    }

    pub fn record_session_minutes(&self, learner_id: &str, minutes: f64) -> f64 {
        self.store.with_learner(learner_id, |state| {
            if minutes.is_finite() && minutes > 0.0 {
                state.session_minutes += minutes;
            }
            state.session_minutes
        })
    }

    fn assess_locked(
        &self,
        state: &mut LearnerStateSnapshot,
        explicit_checkin: Option<CognitiveState>,
        signals: &BehavioralSignals,
        current_modality: Option<ExplanationMode>,
    ) -> SessionParams {
        let session = assess_cognitive_state(
            explicit_checkin,
            signals,
            current_modality.unwrap_or_default(),
            &self.config.cognitive,
        );
        state.cognitive_state = session.cognitive_state;
        session
    }

    fn decide_locked(
        &self,
        state: &LearnerStateSnapshot,
        graph: &ConceptGraph,
        session: &SessionParams,
        now: DateTime<Utc>,
    ) -> Decision {
        let effective = compute_effective_mastery(graph, state, now, &self.config.decay);
        let locks = compute_locks(graph, &effective, &self.config.locks);
        let action = decide_next_action(graph, &effective, session, &locks, &self.config.selection);
        Decision {
            action,
            prerequisite_locks: locks,
        }
    }
}

impl Default for AdaptiveEngine {
    fn default() -> Self {
        Self::new(AdaptiveConfig::default())
    }
}
