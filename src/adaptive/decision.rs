//! Next-action selection.
//!
//! Candidates are the unlocked concepts, bucketed by effective mastery:
//! ZPD [30, 70) first, then needs-review (0, 30), then fresh (== 0). The
//! weakest concept of the first non-empty bucket wins; ties keep graph order.
//! When every bucket is empty the first unlocked concept is used.

use crate::adaptive::config::SelectionParams;
use crate::adaptive::decay::EffectiveMasteryMap;
use crate::adaptive::graph::ConceptGraph;
use crate::adaptive::locks::locked_ids;
use crate::adaptive::types::{
    Activity, ChunkSize, CognitiveState, ConceptLockState, ConceptNode, Difficulty, NextAction,
    RoomCommand, SessionParams,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidatePool {
    Zpd,
    NeedsReview,
    Fresh,
    Fallback,
}

impl CandidatePool {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Zpd => "ZPD zone",
            Self::NeedsReview => "review needed",
            Self::Fresh => "fresh concepts",
            Self::Fallback => "remaining unlocked concepts",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    concept: &'a ConceptNode,
    mastery: f64,
}

fn select_candidate<'a>(
    available: &[Candidate<'a>],
    params: &SelectionParams,
) -> Option<(Candidate<'a>, CandidatePool)> {
    let in_pool = |pool: CandidatePool, m: f64| match pool {
        CandidatePool::Zpd => m >= params.zpd_lower && m < params.zpd_upper,
        CandidatePool::NeedsReview => m > 0.0 && m < params.zpd_lower,
        CandidatePool::Fresh => m == 0.0,
        CandidatePool::Fallback => true,
    };

    for pool in [CandidatePool::Zpd, CandidatePool::NeedsReview, CandidatePool::Fresh] {
        let mut members: Vec<Candidate<'a>> =
            available.iter().copied().filter(|c| in_pool(pool, c.mastery)).collect();
        // stable sort keeps graph order among equal masteries
        members.sort_by(|a, b| a.mastery.total_cmp(&b.mastery));
        if let Some(&head) = members.first() {
            return Some((head, pool));
        }
    }

    available.first().map(|&c| (c, CandidatePool::Fallback))
}

fn select_activity(mastery: f64, state: CognitiveState, params: &SelectionParams) -> Activity {
    let drifting = state == CognitiveState::Drifting;
    if mastery >= params.quiz_threshold && !drifting {
        Activity::Quiz
    } else if drifting && mastery >= params.challenge_lower && mastery < params.challenge_upper {
        Activity::Challenge
    } else if mastery > 0.0 && mastery < params.zpd_lower {
        Activity::Review
    } else {
        Activity::Explanation
    }
}

fn mood_command(state: CognitiveState, params: &SelectionParams) -> RoomCommand {
    match state {
        CognitiveState::Focused => RoomCommand::DeepFocus {
            dim_level: params.deep_focus_dim,
        },
        CognitiveState::Drifting => RoomCommand::DriftMode {
            glow_intensity: params.drift_glow,
        },
        CognitiveState::Okay | CognitiveState::Done => RoomCommand::Neutral,
    }
}

/// Re-emits the full lock set on every call, not a diff.
fn lock_commands(locks: &[ConceptLockState]) -> impl Iterator<Item = RoomCommand> + '_ {
    locks.iter().map(|l| {
        let concept_id = l.concept_id.clone();
        if l.locked {
            RoomCommand::LockConcept { concept_id }
        } else {
            RoomCommand::UnlockConcept { concept_id }
        }
    })
}

pub fn decide_next_action(
    graph: &ConceptGraph,
    effective: &EffectiveMasteryMap,
    session: &SessionParams,
    locks: &[ConceptLockState],
    params: &SelectionParams,
) -> NextAction {
    if session.cognitive_state == CognitiveState::Done {
        return NextAction {
            next_concept_id: None,
            difficulty: Difficulty::Easy,
            modality: session.preferred_modality,
            chunk_size: ChunkSize::Short,
            activity: Activity::Break,
            room_commands: vec![RoomCommand::SessionEnd],
            reasoning: "Learner indicated they are done. Wrap up with a session summary."
                .to_string(),
        };
    }

    let locked = locked_ids(locks);
    let available: Vec<Candidate<'_>> = graph
        .concepts()
        .iter()
        .filter(|c| !locked.contains(c.concept_id.as_str()))
        .map(|concept| Candidate {
            concept,
            mastery: effective.get(&concept.concept_id).copied().unwrap_or(0.0),
        })
        .collect();

    let selected = select_candidate(&available, params);
    let state = session.cognitive_state;

    let activity = selected
        .map(|(c, _)| select_activity(c.mastery, state, params))
        .unwrap_or(Activity::Explanation);

    let mut room_commands = Vec::with_capacity(locks.len() + 1);
    room_commands.push(mood_command(state, params));
    room_commands.extend(lock_commands(locks));

    let reasoning = match selected {
        Some((c, pool)) => format!(
            "Selected \"{}\" (mastery: {:.0}%) from {}. Cognitive state: {}.",
            c.concept.name,
            c.mastery,
            pool.label(),
            state.as_str()
        ),
        None => format!(
            "No available concepts ({} total, {} locked). Cognitive state: {}.",
            graph.len(),
            locked.len(),
            state.as_str()
        ),
    };

    tracing::debug!(
        concept_id = selected.map(|(c, _)| c.concept.concept_id.as_str()).unwrap_or("-"),
        pool = selected.map(|(_, p)| p.label()).unwrap_or("-"),
        state = state.as_str(),
        "next action decided"
    );

    NextAction {
        next_concept_id: selected.map(|(c, _)| c.concept.concept_id.clone()),
        difficulty: session.difficulty_bias.difficulty(),
        modality: session.preferred_modality,
        chunk_size: session.chunk_size,
        activity,
        room_commands,
        reasoning,
    }
}
