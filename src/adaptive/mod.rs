//! Adaptive decision core: mastery updates, time decay, prerequisite locks,
//! cognitive state assessment and next-action selection.

pub mod cognitive;
pub mod config;
pub mod decay;
pub mod decision;
pub mod engine;
pub mod error;
pub mod graph;
pub mod locks;
pub mod mastery;
pub mod store;
pub mod types;

pub use config::AdaptiveConfig;
pub use engine::AdaptiveEngine;
pub use error::AdaptiveError;
pub use graph::ConceptGraph;
pub use types::*;
