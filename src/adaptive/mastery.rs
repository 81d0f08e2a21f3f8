//! Mastery update rules: folding interaction events into the learner ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adaptive::config::{MasteryGains, MASTERY_MAX, MASTERY_MIN};
use crate::adaptive::error::AdaptiveError;
use crate::adaptive::graph::ConceptGraph;
use crate::adaptive::types::{ConceptProgress, Difficulty, ExplanationMode, LearnerStateSnapshot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionEvent {
    QuizCorrect {
        concept_id: String,
        difficulty: Difficulty,
    },
    QuizIncorrect {
        concept_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_pattern: Option<String>,
    },
    ExplanationRead {
        concept_id: String,
    },
    ExplainDifferently {
        concept_id: String,
        new_mode: ExplanationMode,
    },
    ChallengeComplete {
        concept_id: String,
        difficulty: Difficulty,
    },
}

impl InteractionEvent {
    pub fn concept_id(&self) -> &str {
        match self {
            Self::QuizCorrect { concept_id, .. }
            | Self::QuizIncorrect { concept_id, .. }
            | Self::ExplanationRead { concept_id }
            | Self::ExplainDifferently { concept_id, .. }
            | Self::ChallengeComplete { concept_id, .. } => concept_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::QuizCorrect { .. } => "quiz_correct",
            Self::QuizIncorrect { .. } => "quiz_incorrect",
            Self::ExplanationRead { .. } => "explanation_read",
            Self::ExplainDifferently { .. } => "explain_differently",
            Self::ChallengeComplete { .. } => "challenge_complete",
        }
    }

    /// Quiz answers and challenges count toward a concept's attempts.
    pub fn is_attempt(&self) -> bool {
        match self {
            Self::QuizCorrect { .. }
            | Self::QuizIncorrect { .. }
            | Self::ChallengeComplete { .. } => true,
            Self::ExplanationRead { .. } | Self::ExplainDifferently { .. } => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteryDelta {
    pub concept_id: String,
    /// Nominal change of the rule that fired; `new_mastery` is clamped.
    pub mastery_change: f64,
    pub new_mastery: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_pattern_added: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_mode_update: Option<ExplanationMode>,
}

pub fn clamp_mastery(value: f64) -> f64 {
    value.clamp(MASTERY_MIN, MASTERY_MAX)
}

pub fn compute_mastery_update(
    event: &InteractionEvent,
    current_mastery: f64,
    gains: &MasteryGains,
) -> MasteryDelta {
    let mut delta = MasteryDelta {
        concept_id: event.concept_id().to_string(),
        mastery_change: 0.0,
        new_mastery: clamp_mastery(current_mastery),
        error_pattern_added: None,
        preferred_mode_update: None,
    };

    let change = match event {
        InteractionEvent::QuizCorrect { difficulty, .. } => gains.quiz_gain(*difficulty),
        InteractionEvent::QuizIncorrect { error_pattern, .. } => {
            delta.error_pattern_added = error_pattern.clone().filter(|p| !p.is_empty());
            -gains.incorrect_penalty
        }
        InteractionEvent::ExplanationRead { .. } => gains.explanation_read,
        InteractionEvent::ExplainDifferently { new_mode, .. } => {
            delta.preferred_mode_update = Some(*new_mode);
            0.0
        }
        InteractionEvent::ChallengeComplete { difficulty, .. } => gains.challenge_gain(*difficulty),
    };

    delta.mastery_change = change;
    delta.new_mastery = clamp_mastery(current_mastery + change);
    delta
}

/// Checks every event against the graph. Nothing is applied unless the whole
/// batch passes.
pub fn validate_batch(
    graph: &ConceptGraph,
    batch: &[InteractionEvent],
) -> Result<(), AdaptiveError> {
    for (index, event) in batch.iter().enumerate() {
        let concept_id = event.concept_id();
        if concept_id.trim().is_empty() {
            return Err(AdaptiveError::MissingConceptId { index });
        }
        if !graph.contains(concept_id) {
            return Err(AdaptiveError::UnknownConcept {
                index,
                concept_id: concept_id.to_string(),
            });
        }
    }
    Ok(())
}

/// Applies a batch in order, each event against the mastery left by the
/// previous one. The ledger is untouched when validation fails.
pub fn apply_interaction_events(
    graph: &ConceptGraph,
    ledger: &mut LearnerStateSnapshot,
    batch: &[InteractionEvent],
    now: DateTime<Utc>,
    gains: &MasteryGains,
) -> Result<Vec<MasteryDelta>, AdaptiveError> {
    validate_batch(graph, batch)?;

    let mut updates = Vec::with_capacity(batch.len());
    for event in batch {
        let concept_id = event.concept_id();
        let Some(node) = graph.get(concept_id) else {
            continue;
        };
        let progress = ledger
            .concepts
            .entry(concept_id.to_string())
            .or_insert_with(|| ConceptProgress::seeded_from(node, now));

        let delta = compute_mastery_update(event, progress.mastery, gains);
        progress.mastery = delta.new_mastery;
        progress.last_seen = now;
        if event.is_attempt() {
            progress.attempts = progress.attempts.saturating_add(1);
        }
        if let Some(ref pattern) = delta.error_pattern_added {
            progress.record_error_pattern(pattern);
        }
        if let Some(mode) = delta.preferred_mode_update {
            progress.preferred_mode = Some(mode);
        }

        tracing::debug!(
            concept_id,
            kind = event.kind(),
            change = delta.mastery_change,
            mastery = delta.new_mastery,
            "mastery updated"
        );
        updates.push(delta);
    }

    Ok(updates)
}

/// Decodes a JSON array of tagged events, reporting the offending index.
pub fn parse_event_batch(json: &str) -> Result<Vec<InteractionEvent>, AdaptiveError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)
        .map_err(|e| AdaptiveError::InvalidEvent(format!("events array required: {e}")))?;
    parse_events(values)
}

pub fn parse_events(
    values: Vec<serde_json::Value>,
) -> Result<Vec<InteractionEvent>, AdaptiveError> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let has_concept = value
                .get("concept_id")
                .and_then(|v| v.as_str())
                .is_some_and(|id| !id.trim().is_empty());
            if !has_concept {
                return Err(AdaptiveError::MissingConceptId { index });
            }
            serde_json::from_value(value)
                .map_err(|e| AdaptiveError::InvalidEvent(format!("event {index}: {e}")))
        })
        .collect()
}
