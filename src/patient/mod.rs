//! Patient state: validated clinical snapshot, score history and attached engine outputs.

pub mod alerts;
pub mod snapshot;
mod state;

pub use alerts::{merge_deduplicated, Alert, AlertSeverity, Mergeable, Priority, Recommendation};
pub use snapshot::{
    AgeBand, AntibodyResult, Biology, Comorbidities, CsfProfile, CytokinePanel, DrugOrder,
    Hemodynamics, MogadMarkers, NeuroExam, PatientSnapshot, PimsMarkers, PupilState, Route,
    SeizureType, Sex, SnapshotError, TreatmentCourse, TreatmentResponse, MAX_AGE_MONTHS,
};
pub use state::{EngineResults, HistoryPoint, PatientState, ScoreHistory};
