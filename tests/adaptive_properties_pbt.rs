//! Property-based tests for the adaptive core.
//!
//! Invariants covered:
//! - Mastery stays within [0, 100] for any event sequence
//! - Decay is a no-op inside the grace period and never increases with time
//! - Two hours after the last review any positive mastery has decayed
//! - A concept is locked iff one of its prerequisites is below the threshold
//! - Identical inputs always produce identical decisions

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;

use focusflow_adaptive::adaptive::cognitive::{assess_cognitive_state, BehavioralSignals};
use focusflow_adaptive::adaptive::config::{
    CognitiveParams, DecayParams, LockParams, MasteryGains, SelectionParams,
};
use focusflow_adaptive::adaptive::decay::{effective_mastery, EffectiveMasteryMap};
use focusflow_adaptive::adaptive::decision::decide_next_action;
use focusflow_adaptive::adaptive::locks::compute_locks;
use focusflow_adaptive::adaptive::mastery::{apply_interaction_events, InteractionEvent};
use focusflow_adaptive::adaptive::types::{
    CognitiveState, ConceptNode, Difficulty, ExplanationMode, LearnerStateSnapshot,
};
use focusflow_adaptive::adaptive::ConceptGraph;

// ============================================================================
// Arbitrary Generators
// ============================================================================

const IDS: [&str; 4] = ["c0", "c1", "c2", "c3"];

fn base_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn arb_difficulty() -> impl Strategy<Value = Difficulty> {
    prop_oneof![
        Just(Difficulty::Easy),
        Just(Difficulty::Medium),
        Just(Difficulty::Hard),
    ]
}

fn arb_mode() -> impl Strategy<Value = ExplanationMode> {
    prop_oneof![
        Just(ExplanationMode::Visual),
        Just(ExplanationMode::Analogy),
        Just(ExplanationMode::StepByStep),
        Just(ExplanationMode::Socratic),
    ]
}

fn arb_state() -> impl Strategy<Value = CognitiveState> {
    prop_oneof![
        Just(CognitiveState::Focused),
        Just(CognitiveState::Okay),
        Just(CognitiveState::Drifting),
        Just(CognitiveState::Done),
    ]
}

fn arb_event() -> impl Strategy<Value = InteractionEvent> {
    let id = (0..IDS.len()).prop_map(|i| IDS[i].to_string());
    prop_oneof![
        (id.clone(), arb_difficulty()).prop_map(|(concept_id, difficulty)| {
            InteractionEvent::QuizCorrect {
                concept_id,
                difficulty,
            }
        }),
        (id.clone(), proptest::option::of("[a-z]{1,6}")).prop_map(
            |(concept_id, error_pattern)| InteractionEvent::QuizIncorrect {
                concept_id,
                error_pattern,
            }
        ),
        id.clone()
            .prop_map(|concept_id| InteractionEvent::ExplanationRead { concept_id }),
        (id.clone(), arb_mode()).prop_map(|(concept_id, new_mode)| {
            InteractionEvent::ExplainDifferently {
                concept_id,
                new_mode,
            }
        }),
        (id, arb_difficulty()).prop_map(|(concept_id, difficulty)| {
            InteractionEvent::ChallengeComplete {
                concept_id,
                difficulty,
            }
        }),
    ]
}

fn flat_graph() -> ConceptGraph {
    ConceptGraph::new(IDS.iter().map(|id| ConceptNode::new(*id, *id)).collect()).unwrap()
}

fn arb_mastery() -> impl Strategy<Value = f64> {
    (0u32..=1000u32).prop_map(|v| v as f64 / 10.0)
}

/// Graph over `IDS` where each concept may depend on any earlier one.
fn arb_graph() -> impl Strategy<Value = ConceptGraph> {
    let row = proptest::collection::vec(any::<bool>(), IDS.len());
    proptest::collection::vec(row, IDS.len()).prop_map(|deps| {
        let concepts = IDS
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let prerequisites: Vec<&str> =
                    (0..i).filter(|&j| deps[i][j]).map(|j| IDS[j]).collect();
                ConceptNode::new(*id, id.to_uppercase()).with_prerequisites(prerequisites)
            })
            .collect();
        ConceptGraph::new(concepts).unwrap()
    })
}

fn arb_effective() -> impl Strategy<Value = EffectiveMasteryMap> {
    proptest::collection::vec(arb_mastery(), IDS.len())
        .prop_map(|values| IDS.iter().map(|id| id.to_string()).zip(values).collect())
}

/// Millisecond timings with a fractional part, as browsers report them.
fn arb_ms(max: u32) -> impl Strategy<Value = Option<f64>> {
    proptest::option::of((0..max * 4).prop_map(|quarters| quarters as f64 / 4.0))
}

fn arb_signals() -> impl Strategy<Value = BehavioralSignals> {
    (
        arb_ms(60_000),
        arb_ms(120_000),
        proptest::option::of(0u32..6),
        arb_ms(20_000),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(avg, current, explain, speed, correct)| BehavioralSignals {
            avg_time_on_chunk_ms: avg,
            current_chunk_time_ms: current,
            explain_differently_count: explain,
            recent_quiz_speed_ms: speed,
            recent_quiz_correct: correct,
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn mastery_stays_in_bounds(events in proptest::collection::vec(arb_event(), 0..40)) {
        let graph = flat_graph();
        let mut ledger = LearnerStateSnapshot::default();
        let gains = MasteryGains::default();
        let updates =
            apply_interaction_events(&graph, &mut ledger, &events, base_time(), &gains).unwrap();

        prop_assert_eq!(updates.len(), events.len());
        for update in &updates {
            prop_assert!((0.0..=100.0).contains(&update.new_mastery));
        }
        for progress in ledger.concepts.values() {
            prop_assert!((0.0..=100.0).contains(&progress.mastery));
        }
    }

    #[test]
    fn empty_batch_never_changes_ledger(events in proptest::collection::vec(arb_event(), 0..10)) {
        let graph = flat_graph();
        let mut ledger = LearnerStateSnapshot::default();
        let gains = MasteryGains::default();
        apply_interaction_events(&graph, &mut ledger, &events, base_time(), &gains).unwrap();
        let before = serde_json::to_vec(&ledger).unwrap();

        let later = base_time() + Duration::days(9);
        apply_interaction_events(&graph, &mut ledger, &[], later, &gains).unwrap();
        prop_assert_eq!(before, serde_json::to_vec(&ledger).unwrap());
    }

    #[test]
    fn decay_is_noop_within_grace(mastery in arb_mastery(), minutes in 0i64..60) {
        let now = base_time();
        let seen = now - Duration::minutes(minutes);
        prop_assert_eq!(effective_mastery(mastery, seen, now, &DecayParams::default()), mastery);
    }

    #[test]
    fn decay_is_visible_two_hours_out(mastery in arb_mastery(), minutes in 120i64..600) {
        let now = base_time();
        let seen = now - Duration::minutes(minutes);
        let value = effective_mastery(mastery, seen, now, &DecayParams::default());
        prop_assert!(value <= mastery);
        if mastery > 0.0 {
            prop_assert!(value < mastery);
        }
    }

    #[test]
    fn decay_is_monotone_in_elapsed_time(
        mastery in arb_mastery(),
        a in 0i64..20_000,
        b in 0i64..20_000,
    ) {
        let (short, long) = if a <= b { (a, b) } else { (b, a) };
        let now = base_time();
        let params = DecayParams::default();
        let near = effective_mastery(mastery, now - Duration::minutes(short), now, &params);
        let far = effective_mastery(mastery, now - Duration::minutes(long), now, &params);
        prop_assert!(near <= mastery);
        prop_assert!(far <= near);
        prop_assert!(far >= 0.0);
    }

    #[test]
    fn locked_iff_prerequisite_below_threshold(graph in arb_graph(), effective in arb_effective()) {
        let params = LockParams::default();
        let locks = compute_locks(&graph, &effective, &params);
        prop_assert_eq!(locks.len(), graph.len());

        for (concept, lock) in graph.concepts().iter().zip(&locks) {
            let expected = concept.prerequisites.iter().any(|p| effective[p] < params.threshold);
            prop_assert_eq!(lock.locked, expected);
            if concept.prerequisites.is_empty() {
                prop_assert!(!lock.locked);
            }
        }
    }

    #[test]
    fn decisions_are_deterministic(
        graph in arb_graph(),
        effective in arb_effective(),
        checkin in proptest::option::of(arb_state()),
        signals in arb_signals(),
        mode in arb_mode(),
    ) {
        let session = assess_cognitive_state(checkin, &signals, mode, &CognitiveParams::default());
        let locks = compute_locks(&graph, &effective, &LockParams::default());
        let params = SelectionParams::default();
        let first = decide_next_action(&graph, &effective, &session, &locks, &params);
        let second = decide_next_action(&graph, &effective, &session, &locks, &params);
        prop_assert_eq!(&first, &second);

        if checkin == Some(CognitiveState::Done) {
            prop_assert!(first.next_concept_id.is_none());
        } else if let Some(id) = first.next_concept_id.as_deref() {
            let lock = locks.iter().find(|l| l.concept_id == id).unwrap();
            prop_assert!(!lock.locked);
        }
    }
}
