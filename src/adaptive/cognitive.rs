//! Cognitive state classifier. Stateless: every call derives the state from the
//! inputs it is given, with this precedence:
//!
//! 1. explicit check-in
//! 2. chunk-time ratio, then the explain-differently limit
//! 3. quiz-speed override on top of either

use serde::{Deserialize, Deserializer, Serialize};

use crate::adaptive::config::CognitiveParams;
use crate::adaptive::types::{CognitiveState, ExplanationMode, SessionParams};

/// Client-reported timings. Times are milliseconds and may be fractional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehavioralSignals {
    #[serde(default, deserialize_with = "non_negative_ms")]
    pub avg_time_on_chunk_ms: Option<f64>,
    #[serde(default, deserialize_with = "non_negative_ms")]
    pub current_chunk_time_ms: Option<f64>,
    #[serde(default)]
    pub explain_differently_count: Option<u32>,
    #[serde(default, deserialize_with = "non_negative_ms")]
    pub recent_quiz_speed_ms: Option<f64>,
    #[serde(default)]
    pub recent_quiz_correct: Option<bool>,
}

fn non_negative_ms<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<f64>::deserialize(deserializer)? {
        Some(ms) if !ms.is_finite() || ms < 0.0 => Err(serde::de::Error::custom(format!(
            "duration must be a non-negative number of milliseconds, got {ms}"
        ))),
        value => Ok(value),
    }
}

fn classify_behavior(signals: &BehavioralSignals, params: &CognitiveParams) -> CognitiveState {
    let mut state = CognitiveState::Okay;

    let timings = (signals.avg_time_on_chunk_ms, signals.current_chunk_time_ms);
    if let (Some(avg), Some(current)) = timings {
        if avg > 0.0 && current > 0.0 {
            let ratio = current / avg;
            if ratio < params.focused_ratio {
                state = CognitiveState::Focused;
            } else if ratio > params.drifting_ratio {
                state = CognitiveState::Drifting;
            }
        }
    }

    if signals.explain_differently_count.unwrap_or(0) >= params.explain_differently_limit {
        state = CognitiveState::Drifting;
    }

    state
}

fn apply_quiz_override(
    state: CognitiveState,
    signals: &BehavioralSignals,
    params: &CognitiveParams,
) -> CognitiveState {
    let (Some(speed_ms), Some(correct)) =
        (signals.recent_quiz_speed_ms, signals.recent_quiz_correct)
    else {
        return state;
    };
    if speed_ms >= params.fast_quiz_ms {
        return state;
    }

    match (correct, state) {
        (true, CognitiveState::Okay) => CognitiveState::Focused,
        // fast and wrong reads as guessing
        (false, s) if s != CognitiveState::Done => CognitiveState::Drifting,
        (_, s) => s,
    }
}

pub fn assess_cognitive_state(
    explicit_checkin: Option<CognitiveState>,
    signals: &BehavioralSignals,
    current_modality: ExplanationMode,
    params: &CognitiveParams,
) -> SessionParams {
    let base = explicit_checkin.unwrap_or_else(|| classify_behavior(signals, params));
    let state = apply_quiz_override(base, signals, params);

    let mut session = SessionParams::for_state(state, current_modality);
    if state == CognitiveState::Drifting && current_modality == ExplanationMode::StepByStep {
        session.preferred_modality = ExplanationMode::Visual;
    }

    tracing::debug!(
        checkin = explicit_checkin.map(|s| s.as_str()).unwrap_or("-"),
        state = state.as_str(),
        modality = session.preferred_modality.as_str(),
        "cognitive state assessed"
    );
    session
}
