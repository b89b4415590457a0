use neuro_engines::{run_pipeline, EngineKind, PatientSnapshot, PatientState};
use proptest::prelude::*;

fn snapshot(age_months: u32, gcs: u8, seizures: u32, crp: f64, spo2: f64) -> PatientSnapshot {
    let mut snapshot: PatientSnapshot = serde_json::from_value(serde_json::json!({
        "age_months": age_months,
        "weight_kg": 18.0,
        "sex": "female",
    }))
    .expect("minimal snapshot deserializes");
    snapshot.neuro.gcs = Some(gcs);
    snapshot.neuro.seizures_24h = Some(seizures);
    snapshot.biology.crp = Some(crp);
    snapshot.hemodynamics.spo2 = Some(spo2);
    snapshot
}

fn score(snapshot: PatientSnapshot, engine: EngineKind) -> u8 {
    let mut state = PatientState::new(snapshot).expect("generated snapshot is valid");
    run_pipeline(&mut state).expect("pipeline completes");
    state.result(engine).expect("engine attached").synthesis.score
}

proptest! {
    #[test]
    fn every_score_stays_within_bounds(
        age in 0u32..=216,
        gcs in 3u8..=15,
        seizures in 0u32..60,
        crp in 0.0f64..600.0,
        spo2 in 40.0f64..=100.0,
    ) {
        let mut state = PatientState::new(snapshot(age, gcs, seizures, crp, spo2))
            .expect("generated snapshot is valid");
        run_pipeline(&mut state).expect("pipeline completes");
        for (_, result) in state.results().iter() {
            prop_assert!(result.synthesis.score <= 100);
            prop_assert!(result.curve.global_intensity >= 0.0);
            prop_assert!(result.curve.global_intensity <= 100.0);
        }
    }

    #[test]
    fn rising_crp_never_lowers_vital_prognosis(
        gcs in 3u8..=15,
        seizures in 0u32..30,
        low in 0.0f64..300.0,
        extra in 0.0f64..300.0,
    ) {
        let before = score(snapshot(72, gcs, seizures, low, 98.0), EngineKind::VitalPrognosis);
        let after = score(snapshot(72, gcs, seizures, low + extra, 98.0), EngineKind::VitalPrognosis);
        prop_assert!(after >= before, "crp {low} -> {} lowered {before} to {after}", low + extra);
    }

    #[test]
    fn falling_spo2_never_lowers_early_warning(
        age in 0u32..=216,
        high in 60.0f64..=100.0,
        drop in 0.0f64..20.0,
    ) {
        let before = score(snapshot(age, 15, 0, 2.0, high), EngineKind::EarlyWarning);
        let after = score(snapshot(age, 15, 0, 2.0, high - drop), EngineKind::EarlyWarning);
        prop_assert!(after >= before, "spo2 {high} -> {} lowered {before} to {after}", high - drop);
    }

    #[test]
    fn more_seizures_never_lower_therapeutic_decision(
        gcs in 3u8..=15,
        low in 0u32..30,
        extra in 0u32..30,
    ) {
        let before = score(snapshot(72, gcs, low, 2.0, 98.0), EngineKind::TherapeuticDecision);
        let after = score(
            snapshot(72, gcs, low + extra, 2.0, 98.0),
            EngineKind::TherapeuticDecision,
        );
        prop_assert!(after >= before, "seizures {low} -> {} lowered {before} to {after}", low + extra);
    }
}
