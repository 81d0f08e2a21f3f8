use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ExplanationMode {
    #[serde(rename = "visual")]
    Visual,
    #[serde(rename = "analogy")]
    Analogy,
    #[default]
    #[serde(rename = "step-by-step")]
    StepByStep,
    #[serde(rename = "socratic")]
    Socratic,
}

impl ExplanationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::Analogy => "analogy",
            Self::StepByStep => "step-by-step",
            Self::Socratic => "socratic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CognitiveState {
    Focused,
    #[default]
    Okay,
    Drifting,
    Done,
}

impl CognitiveState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Focused => "focused",
            Self::Okay => "okay",
            Self::Drifting => "drifting",
            Self::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChunkSize {
    Short,
    #[default]
    Medium,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyBias {
    Easier,
    #[default]
    Normal,
    Harder,
}

impl DifficultyBias {
    pub fn difficulty(&self) -> Difficulty {
        match self {
            Self::Easier => Difficulty::Easy,
            Self::Normal => Difficulty::Medium,
            Self::Harder => Difficulty::Hard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Explanation,
    Quiz,
    Challenge,
    Review,
    Break,
}

/// Abstract instruction for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomCommand {
    DeepFocus {
        #[serde(rename = "dimLevel")]
        dim_level: f64,
    },
    DriftMode {
        #[serde(rename = "glowIntensity")]
        glow_intensity: f64,
    },
    Neutral,
    SessionEnd,
    LockConcept {
        concept_id: String,
    },
    UnlockConcept {
        concept_id: String,
    },
}

/// A concept as produced by ingestion. `mastery`, `attempts`, `last_seen` and
/// `error_patterns` are seed values; the learner ledger owns them afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptNode {
    pub concept_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub mastery: f64,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_patterns: Vec<String>,
    #[serde(default)]
    pub preferred_mode: ExplanationMode,
}

impl ConceptNode {
    pub fn new(concept_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            concept_id: concept_id.into(),
            name: name.into(),
            description: None,
            prerequisites: Vec::new(),
            mastery: 0.0,
            attempts: 0,
            last_seen: None,
            error_patterns: Vec::new(),
            preferred_mode: ExplanationMode::default(),
        }
    }

    pub fn with_prerequisites<I, S>(mut self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prerequisites = prerequisites.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mastery(mut self, mastery: f64) -> Self {
        self.mastery = mastery;
        self
    }
}

/// `from` is a prerequisite of `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteEdge {
    pub from: String,
    pub to: String,
}

/// Graph payload handed over by the ingestion collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub concepts: Vec<ConceptNode>,
    #[serde(default)]
    pub edges: Vec<PrerequisiteEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_document_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptProgress {
    pub mastery: f64,
    #[serde(default)]
    pub attempts: u32,
    pub last_seen: DateTime<Utc>,
    #[serde(default)]
    pub error_patterns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_mode: Option<ExplanationMode>,
}

impl ConceptProgress {
    /// Starting ledger entry for a concept the learner has not touched yet.
    pub fn seeded_from(node: &ConceptNode, now: DateTime<Utc>) -> Self {
        Self {
            mastery: node.mastery,
            attempts: node.attempts,
            last_seen: node.last_seen.unwrap_or(now),
            error_patterns: node.error_patterns.clone(),
            preferred_mode: None,
        }
    }

    pub fn record_error_pattern(&mut self, pattern: &str) -> bool {
        if self.error_patterns.iter().any(|p| p == pattern) {
            return false;
        }
        self.error_patterns.push(pattern.to_string());
        true
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LearnerStateSnapshot {
    #[serde(default)]
    pub concepts: BTreeMap<String, ConceptProgress>,
    #[serde(default)]
    pub cognitive_state: CognitiveState,
    #[serde(default)]
    pub session_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionParams {
    pub cognitive_state: CognitiveState,
    pub chunk_size: ChunkSize,
    pub difficulty_bias: DifficultyBias,
    pub preferred_modality: ExplanationMode,
    pub suggest_break: bool,
}

impl SessionParams {
    /// Pacing derived from a cognitive state, before any modality override.
    pub fn for_state(state: CognitiveState, modality: ExplanationMode) -> Self {
        let (chunk_size, difficulty_bias) = match state {
            CognitiveState::Focused => (ChunkSize::Long, DifficultyBias::Harder),
            CognitiveState::Drifting => (ChunkSize::Short, DifficultyBias::Easier),
            CognitiveState::Okay | CognitiveState::Done => {
                (ChunkSize::Medium, DifficultyBias::Normal)
            }
        };
        Self {
            cognitive_state: state,
            chunk_size,
            difficulty_bias,
            preferred_modality: modality,
            suggest_break: state == CognitiveState::Done,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptLockState {
    pub concept_id: String,
    pub locked: bool,
    pub unmet_prerequisites: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextAction {
    pub next_concept_id: Option<String>,
    pub difficulty: Difficulty,
    pub modality: ExplanationMode,
    pub chunk_size: ChunkSize,
    pub activity: Activity,
    pub room_commands: Vec<RoomCommand>,
    pub reasoning: String,
}
