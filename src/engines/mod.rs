//! The five clinical engines. Each plugs its fields, patterns, context factors and
//! rules into the shared protocol in [`crate::scoring`].

pub mod early_warning;
pub mod knowledge;
pub mod pharmacovigilance;
pub mod prospection;
pub mod therapeutic;
pub mod vital;

#[cfg(test)]
pub(crate) mod tests;

pub use early_warning::EarlyWarningEngine;
pub use pharmacovigilance::PharmacovigilanceEngine;
pub use prospection::TherapeuticProspectionEngine;
pub use therapeutic::TherapeuticDecisionEngine;
pub use vital::VitalPrognosisEngine;

use crate::config::EngineTables;
use crate::patient::PatientSnapshot;
use crate::scoring::Engine;

/// All engines over one set of tables, in execution order.
pub fn standard_engines(tables: &EngineTables) -> Vec<Box<dyn Engine + '_>> {
    vec![
        Box::new(VitalPrognosisEngine::new(&tables.ranges, &tables.vital)),
        Box::new(TherapeuticDecisionEngine::new(&tables.ranges, &tables.therapeutic)),
        Box::new(PharmacovigilanceEngine::new(&tables.ranges, &tables.pharmacovigilance)),
        Box::new(EarlyWarningEngine::new(&tables.ranges, &tables.early_warning)),
        Box::new(TherapeuticProspectionEngine::new(&tables.ranges, &tables.prospection)),
    ]
}

fn gcs(snapshot: &PatientSnapshot) -> Option<f64> {
    snapshot.neuro.gcs.map(f64::from)
}

fn count(value: Option<u32>) -> Option<f64> {
    value.map(f64::from)
}

fn tally(value: usize) -> Option<f64> {
    Some(value as f64)
}
