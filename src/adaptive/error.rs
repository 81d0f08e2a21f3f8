#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdaptiveError {
    #[error("event {index}: concept_id required")]
    MissingConceptId { index: usize },
    #[error("event {index}: unknown concept {concept_id}")]
    UnknownConcept { index: usize, concept_id: String },
    #[error("invalid event: {0}")]
    InvalidEvent(String),
    #[error("duplicate concept: {0}")]
    DuplicateConcept(String),
    #[error("edge {from} -> {to} references an unknown concept")]
    UnknownEdgeEndpoint { from: String, to: String },
}
