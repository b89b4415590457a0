//! Deterministic five-engine clinical scoring for pediatric neuro-inflammatory cases.
//!
//! A [`PatientState`] is built from a validated [`PatientSnapshot`]; [`Pipeline::run`]
//! then attaches one [`EngineResult`] per engine and the merged alert and
//! recommendation lists.

pub mod config;
pub mod engines;
pub mod error;
pub mod patient;
pub mod pipeline;
pub mod scoring;
pub mod telemetry;

pub use config::EngineTables;
pub use error::{AppError, EvaluationFault, PipelineError};
pub use patient::{PatientSnapshot, PatientState, ScoreHistory, SnapshotError};
pub use pipeline::{run_pipeline, Pipeline};
pub use scoring::{EngineKind, EngineResult};
