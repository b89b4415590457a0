//! Static clinical knowledge consulted by the engines: drug profiles, interaction
//! pairs and treatment-line classification.

mod drugs;
mod treatments;

pub use drugs::{
    detect_interactions, dose_adjustments, identify, overdose_ratio, DrugProfile,
    InteractionSeverity,
};
pub use treatments::{classify, summarize, TherapyLine, TreatmentSummary};
