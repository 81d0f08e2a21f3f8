use std::io::Read;
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use focusflow_adaptive::adaptive::cognitive::BehavioralSignals;
use focusflow_adaptive::adaptive::engine::{AdaptiveEngine, CycleRequest};
use focusflow_adaptive::adaptive::mastery::parse_events;
use focusflow_adaptive::adaptive::types::{CognitiveState, ExplanationMode, KnowledgeGraph};
use focusflow_adaptive::adaptive::{AdaptiveError, ConceptGraph};
use focusflow_adaptive::config::Config;
use focusflow_adaptive::logging::init_tracing;

#[derive(Debug, Deserialize)]
struct DriverRequest {
    #[serde(default = "default_learner_id")]
    learner_id: String,
    knowledge_graph: KnowledgeGraph,
    #[serde(default)]
    events: Vec<serde_json::Value>,
    #[serde(default)]
    explicit_checkin: Option<CognitiveState>,
    #[serde(default)]
    signals: BehavioralSignals,
    #[serde(default)]
    current_modality: Option<ExplanationMode>,
    #[serde(default)]
    now: Option<DateTime<Utc>>,
}

fn default_learner_id() -> String {
    "demo-user".to_string()
}

#[derive(Debug, thiserror::Error)]
enum DriverError {
    #[error("failed to read request: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed request: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Adaptive(#[from] AdaptiveError),
}

fn read_input() -> Result<String, DriverError> {
    match std::env::args().nth(1) {
        Some(path) if path != "-" => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn run(engine: &AdaptiveEngine) -> Result<String, DriverError> {
    let request: DriverRequest = serde_json::from_str(&read_input()?)?;
    let graph = ConceptGraph::from_knowledge_graph(request.knowledge_graph)?;
    let cycle = CycleRequest {
        events: parse_events(request.events)?,
        explicit_checkin: request.explicit_checkin,
        signals: request.signals,
        current_modality: request.current_modality,
    };
    let now = request.now.unwrap_or_else(Utc::now);

    let response = engine.run_cycle(&request.learner_id, &graph, &cycle, now)?;
    Ok(serde_json::to_string_pretty(&response)?)
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = init_tracing(&config.logging);

    let engine = AdaptiveEngine::new(config.adaptive);
    match run(&engine) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "adaptive cycle failed");
            ExitCode::from(2)
        }
    }
}
