//! Orchestrates the five engines over one `PatientState`.

use crate::config::EngineTables;
use crate::engines::standard_engines;
use crate::error::PipelineError;
use crate::patient::{merge_deduplicated, PatientState};
use crate::scoring::{evaluate, Engine, EngineKind, EngineResult, PriorResults};
use tracing::{error, info};

/// Runs the engines in their fixed order against injected, read-only tables.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    tables: EngineTables,
}

impl Pipeline {
    pub fn new(tables: EngineTables) -> Self {
        Self { tables }
    }

    /// Attach all five engine results and the merged alert and recommendation lists.
    ///
    /// Each result is attached as soon as its engine completes. When an engine fails
    /// the run stops there: earlier results stay attached, while the failing engine's
    /// slot, every later slot and the merged lists are cleared so no output from a
    /// previous run survives next to the new one.
    pub fn run<'s>(
        &self,
        state: &'s mut PatientState,
    ) -> Result<&'s mut PatientState, PipelineError> {
        let engines = standard_engines(&self.tables);
        run_engines(&engines, &self.tables, state)
    }
}

/// Run the standard pipeline with the default tables.
pub fn run_pipeline(state: &mut PatientState) -> Result<&mut PatientState, PipelineError> {
    Pipeline::default().run(state)
}

fn run_engines<'s>(
    engines: &[Box<dyn Engine + '_>],
    tables: &EngineTables,
    state: &'s mut PatientState,
) -> Result<&'s mut PatientState, PipelineError> {
    for engine in engines {
        let kind = engine.kind();
        let outcome = {
            let prior: Vec<(EngineKind, &EngineResult)> = state
                .results()
                .iter()
                .filter(|(earlier, _)| *earlier < kind)
                .collect();
            evaluate(
                engine.as_ref(),
                state.snapshot(),
                state.history().points(kind),
                PriorResults::new(&prior),
                tables,
            )
        };

        match outcome {
            Ok(result) => state.attach(kind, result),
            Err(err) => {
                error!(engine = %err.engine(), error = %err, "pipeline aborted");
                state.discard_from(kind);
                return Err(err);
            }
        }
    }

    let alerts = merge_deduplicated(
        state
            .results()
            .iter()
            .map(|(_, result)| result.synthesis.alerts.as_slice()),
    );
    let recommendations = merge_deduplicated(
        state
            .results()
            .iter()
            .map(|(_, result)| result.synthesis.recommendations.as_slice()),
    );
    info!(
        engines = engines.len(),
        alerts = alerts.len(),
        recommendations = recommendations.len(),
        "pipeline complete"
    );
    state.set_merged(alerts, recommendations);

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::tests::common::{baseline_snapshot, fires_snapshot};
    use crate::engines::VitalPrognosisEngine;
    use crate::error::EvaluationFault;
    use crate::patient::PatientSnapshot;
    use crate::scoring::{
        Context, FieldSpec, Intention, PatternSpec, Rule, SynthesisProfile,
    };

    struct Hollow;

    impl Engine for Hollow {
        fn kind(&self) -> EngineKind {
            EngineKind::TherapeuticDecision
        }

        fn profile(&self) -> SynthesisProfile {
            SynthesisProfile {
                engine: EngineKind::TherapeuticDecision,
                levels: ["A", "B", "C", "D"],
                critical_advice: ("", ""),
            }
        }

        fn fields(&self, _: &PatientSnapshot) -> Vec<FieldSpec> {
            Vec::new()
        }

        fn patterns(&self, _: &PatientSnapshot) -> Vec<PatternSpec> {
            vec![PatternSpec::new("Hollow", "no criteria", 0.5)]
        }

        fn context(&self, _: &PatientSnapshot, _: &Intention, _: PriorResults<'_>) -> Context {
            Context::neutral()
        }

        fn rules(&self) -> &'static [Rule] {
            &[]
        }
    }

    #[test]
    fn attaches_every_engine_in_order() {
        let mut state = PatientState::new(fires_snapshot()).expect("valid snapshot");

        run_pipeline(&mut state).expect("pipeline runs");

        let kinds: Vec<_> = state.results().iter().map(|(kind, _)| kind).collect();
        assert_eq!(kinds, EngineKind::ordered().to_vec());
        assert!(!state.alerts().is_empty());
    }

    #[test]
    fn rerun_replaces_results_wholesale() {
        let mut state = PatientState::new(fires_snapshot()).expect("valid snapshot");
        let pipeline = Pipeline::default();

        pipeline.run(&mut state).expect("first run");
        let first = state.clone();
        pipeline.run(&mut state).expect("second run");

        assert_eq!(first, state);
    }

    #[test]
    fn failing_engine_keeps_earlier_results_only() {
        let tables = EngineTables::default();
        let engines: Vec<Box<dyn Engine + '_>> = vec![
            Box::new(VitalPrognosisEngine::new(&tables.ranges, &tables.vital)),
            Box::new(Hollow),
        ];
        let mut state = PatientState::new(baseline_snapshot()).expect("valid snapshot");

        let err = run_engines(&engines, &tables, &mut state).expect_err("hollow pattern fails");

        assert_eq!(err.engine(), EngineKind::TherapeuticDecision);
        match err {
            PipelineError::Pattern { pattern, source, .. } => {
                assert_eq!(pattern, "Hollow");
                assert_eq!(source, EvaluationFault::EmptyPattern);
            }
            other => panic!("expected pattern error, got {other:?}"),
        }
        assert!(state.vital_prognosis().is_some());
        assert!(state.therapeutic_decision().is_none());
        assert!(state.alerts().is_empty());
    }

    #[test]
    fn failed_rerun_clears_results_from_the_previous_run() {
        let tables = EngineTables::default();
        let mut state = PatientState::new(fires_snapshot()).expect("valid snapshot");
        Pipeline::new(tables.clone()).run(&mut state).expect("first run");
        assert!(!state.alerts().is_empty());

        let engines: Vec<Box<dyn Engine + '_>> = vec![
            Box::new(VitalPrognosisEngine::new(&tables.ranges, &tables.vital)),
            Box::new(Hollow),
        ];
        run_engines(&engines, &tables, &mut state).expect_err("hollow pattern fails");

        let kinds: Vec<_> = state.results().iter().map(|(kind, _)| kind).collect();
        assert_eq!(kinds, vec![EngineKind::VitalPrognosis]);
        assert!(state.early_warning().is_none());
        assert!(state.therapeutic_prospection().is_none());
        assert!(state.alerts().is_empty());
        assert!(state.recommendations().is_empty());
    }
}
