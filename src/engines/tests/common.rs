use crate::config::EngineTables;
use crate::engines::standard_engines;
use crate::patient::{
    AntibodyResult, Biology, CsfProfile, Hemodynamics, NeuroExam, PatientSnapshot, PupilState,
    SeizureType, Sex, TreatmentCourse, TreatmentResponse,
};
use crate::scoring::{evaluate, EngineKind, EngineResult, PriorResults};

/// Six-year-old with textbook-normal vitals and labs, day 1, no drugs.
pub(crate) fn baseline_snapshot() -> PatientSnapshot {
    PatientSnapshot {
        age_months: 72,
        weight_kg: 20.0,
        sex: Sex::Female,
        hospital_day: 1,
        neuro: NeuroExam {
            gcs: Some(15),
            gcs_history: Vec::new(),
            pupils: PupilState::Reactive,
            seizures_24h: Some(0),
            seizure_duration_min: None,
            seizure_type: SeizureType::None,
        },
        hemodynamics: Hemodynamics {
            heart_rate: Some(95.0),
            systolic_bp: Some(105.0),
            diastolic_bp: Some(65.0),
            spo2: Some(98.0),
            temperature: Some(36.8),
            respiratory_rate: Some(22.0),
        },
        biology: Biology {
            crp: Some(2.0),
            pct: Some(0.1),
            ferritin: Some(80.0),
            wbc: Some(8.0),
            platelets: Some(250.0),
            lactate: Some(1.0),
            alt: Some(20.0),
            creatinine: Some(40.0),
            ammonia: Some(30.0),
            sodium: Some(139.0),
        },
        csf: CsfProfile {
            cells: Some(2.0),
            protein: Some(0.3),
            antibodies: AntibodyResult::NotTested,
        },
        drugs: Vec::new(),
        treatment_history: Vec::new(),
        comorbidities: Default::default(),
        pims: None,
        mogad: None,
        cytokines: None,
    }
}

/// Explosive refractory seizures, deep coma, high CRP and negative antibodies.
pub(crate) fn fires_snapshot() -> PatientSnapshot {
    let mut snapshot = baseline_snapshot();
    snapshot.neuro.gcs = Some(5);
    snapshot.neuro.seizures_24h = Some(15);
    snapshot.biology.crp = Some(145.0);
    snapshot.csf.antibodies = AntibodyResult::Negative;
    snapshot
}

pub(crate) fn course(treatment: &str, response: TreatmentResponse) -> TreatmentCourse {
    TreatmentCourse {
        treatment: treatment.to_string(),
        period: "D1-D5".to_string(),
        response,
    }
}

/// Run every engine up to and including `target`, feeding earlier results forward.
pub(crate) fn run_until(snapshot: &PatientSnapshot, target: EngineKind) -> EngineResult {
    let tables = EngineTables::default();
    let mut done: Vec<EngineResult> = Vec::new();

    for engine in standard_engines(&tables) {
        let entries: Vec<(EngineKind, &EngineResult)> =
            done.iter().map(|result| (result.engine, result)).collect();
        let result = evaluate(
            engine.as_ref(),
            snapshot,
            &[],
            PriorResults::new(&entries),
            &tables,
        )
        .expect("engine evaluates");
        let kind = result.engine;
        done.push(result);
        if kind == target {
            break;
        }
    }

    done.pop().expect("target engine ran")
}

pub(crate) fn fired(result: &EngineResult, rule: &str) -> bool {
    result.rules.iter().any(|fired| fired.name == rule)
}
