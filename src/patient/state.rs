use super::alerts::{Alert, Recommendation};
use super::snapshot::{PatientSnapshot, SnapshotError};
use crate::scoring::{EngineKind, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One prior synthesis score, stamped with the hospitalization day it was computed on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub day: u32,
    pub score: f64,
}

/// Prior synthesis scores per engine, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreHistory {
    engines: BTreeMap<EngineKind, Vec<HistoryPoint>>,
}

impl ScoreHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, engine: EngineKind, day: u32, score: f64) {
        self.engines
            .entry(engine)
            .or_default()
            .push(HistoryPoint { day, score });
    }

    pub fn points(&self, engine: EngineKind) -> &[HistoryPoint] {
        self.engines
            .get(&engine)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Outputs of the five engines, each `None` until the pipeline attaches it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineResults {
    pub vital_prognosis: Option<EngineResult>,
    pub therapeutic_decision: Option<EngineResult>,
    pub pharmacovigilance: Option<EngineResult>,
    pub early_warning: Option<EngineResult>,
    pub therapeutic_prospection: Option<EngineResult>,
}

impl EngineResults {
    pub fn get(&self, engine: EngineKind) -> Option<&EngineResult> {
        match engine {
            EngineKind::VitalPrognosis => self.vital_prognosis.as_ref(),
            EngineKind::TherapeuticDecision => self.therapeutic_decision.as_ref(),
            EngineKind::Pharmacovigilance => self.pharmacovigilance.as_ref(),
            EngineKind::EarlyWarning => self.early_warning.as_ref(),
            EngineKind::TherapeuticProspection => self.therapeutic_prospection.as_ref(),
        }
    }

    fn slot(&mut self, engine: EngineKind) -> &mut Option<EngineResult> {
        match engine {
            EngineKind::VitalPrognosis => &mut self.vital_prognosis,
            EngineKind::TherapeuticDecision => &mut self.therapeutic_decision,
            EngineKind::Pharmacovigilance => &mut self.pharmacovigilance,
            EngineKind::EarlyWarning => &mut self.early_warning,
            EngineKind::TherapeuticProspection => &mut self.therapeutic_prospection,
        }
    }

    /// Attached results in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (EngineKind, &EngineResult)> + '_ {
        EngineKind::ordered()
            .into_iter()
            .filter_map(move |kind| self.get(kind).map(|result| (kind, result)))
    }
}

/// Root aggregate for one clinical case: the validated snapshot plus every derived output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientState {
    snapshot: PatientSnapshot,
    history: ScoreHistory,
    results: EngineResults,
    alerts: Vec<Alert>,
    recommendations: Vec<Recommendation>,
}

impl PatientState {
    pub fn new(snapshot: PatientSnapshot) -> Result<Self, SnapshotError> {
        Self::with_history(snapshot, ScoreHistory::default())
    }

    pub fn with_history(
        snapshot: PatientSnapshot,
        history: ScoreHistory,
    ) -> Result<Self, SnapshotError> {
        snapshot.validate()?;
        Ok(Self {
            snapshot,
            history,
            results: EngineResults::default(),
            alerts: Vec::new(),
            recommendations: Vec::new(),
        })
    }

    /// Build the next snapshot's state, carrying forward the scores computed on `previous`.
    ///
    /// History keeps the unrounded composite so it compares like for like with the
    /// next run's current point.
    pub fn follow_up(
        previous: &PatientState,
        snapshot: PatientSnapshot,
    ) -> Result<Self, SnapshotError> {
        let mut history = previous.history.clone();
        let day = previous.snapshot.hospital_day;
        for (kind, result) in previous.results.iter() {
            history.record(kind, day, result.curve.global_intensity);
        }
        Self::with_history(snapshot, history)
    }

    pub fn snapshot(&self) -> &PatientSnapshot {
        &self.snapshot
    }

    pub fn history(&self) -> &ScoreHistory {
        &self.history
    }

    pub fn results(&self) -> &EngineResults {
        &self.results
    }

    pub fn result(&self, engine: EngineKind) -> Option<&EngineResult> {
        self.results.get(engine)
    }

    pub fn vital_prognosis(&self) -> Option<&EngineResult> {
        self.results.vital_prognosis.as_ref()
    }

    pub fn therapeutic_decision(&self) -> Option<&EngineResult> {
        self.results.therapeutic_decision.as_ref()
    }

    pub fn pharmacovigilance(&self) -> Option<&EngineResult> {
        self.results.pharmacovigilance.as_ref()
    }

    pub fn early_warning(&self) -> Option<&EngineResult> {
        self.results.early_warning.as_ref()
    }

    pub fn therapeutic_prospection(&self) -> Option<&EngineResult> {
        self.results.therapeutic_prospection.as_ref()
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    pub(crate) fn attach(&mut self, engine: EngineKind, result: EngineResult) {
        *self.results.slot(engine) = Some(result);
    }

    /// Drop `engine`'s result, every later result and the merged lists.
    pub(crate) fn discard_from(&mut self, engine: EngineKind) {
        for kind in EngineKind::ordered().into_iter().filter(|kind| *kind >= engine) {
            *self.results.slot(kind) = None;
        }
        self.alerts.clear();
        self.recommendations.clear();
    }

    pub(crate) fn set_merged(&mut self, alerts: Vec<Alert>, recommendations: Vec<Recommendation>) {
        self.alerts = alerts;
        self.recommendations = recommendations;
    }
}
