use crate::config::ConfigError;
use crate::patient::SnapshotError;
use crate::scoring::{EngineKind, RuleKind};
use crate::telemetry::TelemetryError;

/// Why a pattern, field or rule could not be evaluated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationFault {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("weight must be a positive finite number (found {0})")]
    InvalidWeight(f64),
    #[error("pattern declares no weighted criteria")]
    EmptyPattern,
    #[error("{} rules cannot force a score floor", .0.label())]
    ForbiddenFloor(RuleKind),
    #[error("{} rules cannot shift field intensities", .0.label())]
    ForbiddenShift(RuleKind),
}

/// Fatal failure of one pipeline run, tagged with the engine and the failing element.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("{engine} field '{field}' failed: {source}")]
    Field {
        engine: EngineKind,
        field: String,
        #[source]
        source: EvaluationFault,
    },
    #[error("{engine} pattern '{pattern}' failed: {source}")]
    Pattern {
        engine: EngineKind,
        pattern: String,
        #[source]
        source: EvaluationFault,
    },
    #[error("{engine} rule '{rule}' failed: {source}")]
    Rule {
        engine: EngineKind,
        rule: String,
        #[source]
        source: EvaluationFault,
    },
}

impl PipelineError {
    pub fn engine(&self) -> EngineKind {
        match self {
            Self::Field { engine, .. } | Self::Pattern { engine, .. } | Self::Rule { engine, .. } => {
                *engine
            }
        }
    }
}

/// Top-level error surfaced by the command-line binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
