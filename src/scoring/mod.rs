//! The four-layer evaluation protocol shared by every engine:
//! intention (signals, fields, patterns), context, rules and curve, followed by synthesis.

pub mod context;
pub mod curve;
pub mod intention;
pub mod rules;
pub mod signal;
pub mod synthesis;

pub use context::{Context, ContextBuilder, ContextDetail, ContextKind, PriorResults};
pub use curve::{Curve, Trend};
pub use intention::{Criterion, FieldSpec, Intention, Pattern, PatternSpec, SemanticField};
pub use rules::{
    DetectedInteraction, DoseAdjustment, FiredRule, Firing, Rule, RuleAdjustment, RuleInput,
    RuleKind, TherapeuticOption,
};
pub use signal::{normalize, AgeBandedRange, Direction, ReferenceRange, Signal, SignalStatus};
pub use synthesis::{Synthesis, SynthesisProfile};

use crate::config::EngineTables;
use crate::error::PipelineError;
use crate::patient::{HistoryPoint, PatientSnapshot};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    VitalPrognosis,
    TherapeuticDecision,
    Pharmacovigilance,
    EarlyWarning,
    TherapeuticProspection,
}

impl EngineKind {
    /// Fixed execution order; later engines may read earlier ones.
    pub const fn ordered() -> [Self; 5] {
        [
            Self::VitalPrognosis,
            Self::TherapeuticDecision,
            Self::Pharmacovigilance,
            Self::EarlyWarning,
            Self::TherapeuticProspection,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::VitalPrognosis => "vital_prognosis",
            Self::TherapeuticDecision => "therapeutic_decision",
            Self::Pharmacovigilance => "pharmacovigilance",
            Self::EarlyWarning => "early_warning",
            Self::TherapeuticProspection => "therapeutic_prospection",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::VitalPrognosis => "Vital Prognosis",
            Self::TherapeuticDecision => "Therapeutic Decision",
            Self::Pharmacovigilance => "Pharmacovigilance",
            Self::EarlyWarning => "Early Warning",
            Self::TherapeuticProspection => "Therapeutic Prospection",
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Immutable output of one engine run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineResult {
    pub engine: EngineKind,
    pub intention: Intention,
    pub context: Context,
    pub rules: Vec<FiredRule>,
    pub curve: Curve,
    pub synthesis: Synthesis,
}

/// Engine-specific content plugged into the shared protocol.
pub trait Engine {
    fn kind(&self) -> EngineKind;

    fn profile(&self) -> SynthesisProfile;

    /// Normalized signals grouped into fields, in declaration order.
    fn fields(&self, snapshot: &PatientSnapshot) -> Vec<FieldSpec>;

    fn patterns(&self, snapshot: &PatientSnapshot) -> Vec<PatternSpec>;

    fn context(
        &self,
        snapshot: &PatientSnapshot,
        intention: &Intention,
        prior: PriorResults<'_>,
    ) -> Context;

    fn rules(&self) -> &'static [Rule];
}

/// Run the full protocol for one engine. Nothing is returned unless every layer succeeds.
pub fn evaluate(
    engine: &dyn Engine,
    snapshot: &PatientSnapshot,
    history: &[HistoryPoint],
    prior: PriorResults<'_>,
    tables: &EngineTables,
) -> Result<EngineResult, PipelineError> {
    let kind = engine.kind();

    let intention = intention::aggregate(kind, engine.fields(snapshot), engine.patterns(snapshot))?;
    debug!(
        engine = %kind,
        fields = intention.fields.len(),
        patterns = intention.patterns.len(),
        "intention layer aggregated"
    );

    let context = engine.context(snapshot, &intention, prior);
    debug!(engine = %kind, modifier = context.context_modifier, "context layer computed");

    let input = RuleInput {
        snapshot,
        intention: &intention,
        context: &context,
    };
    let fired = rules::evaluate_rules(kind, engine.rules(), &input)?;
    if let Some(floor) = synthesis::guard_floor(&fired) {
        warn!(engine = %kind, floor, "guard rule forced a score floor");
    }

    let composite = synthesis::composite(&intention, &context, &fired);
    let curve = curve::compute_curve(composite, snapshot.hospital_day, history, &tables.curve);

    let synthesis = synthesis::synthesize(
        &engine.profile(),
        &intention,
        &fired,
        composite,
        &tables.synthesis,
    );
    info!(
        engine = %kind,
        score = synthesis.score,
        level = synthesis.level,
        trend = curve.trend.label(),
        "engine synthesis complete"
    );

    Ok(EngineResult {
        engine: kind,
        intention,
        context,
        rules: fired,
        curve,
        synthesis,
    })
}
