use std::collections::BTreeSet;

use neuro_engines::engines::prospection::DISEASE_MARKERS;
use neuro_engines::patient::{AlertSeverity, AntibodyResult, DrugOrder};
use neuro_engines::scoring::Trend;
use neuro_engines::{
    run_pipeline, EngineKind, EngineTables, PatientSnapshot, PatientState, Pipeline,
    SnapshotError,
};
use serde_json::json;

fn normal_snapshot() -> PatientSnapshot {
    serde_json::from_value(json!({
        "age_months": 72,
        "weight_kg": 20.0,
        "sex": "male",
        "hospital_day": 1,
        "neuro": { "gcs": 15, "pupils": "reactive", "seizures_24h": 0, "seizure_type": "none" },
        "hemodynamics": {
            "heart_rate": 95.0, "systolic_bp": 105.0, "diastolic_bp": 65.0,
            "spo2": 98.0, "temperature": 36.8, "respiratory_rate": 22.0
        },
        "biology": {
            "crp": 2.0, "pct": 0.1, "ferritin": 80.0, "wbc": 8.0, "platelets": 250.0,
            "lactate": 1.0, "alt": 20.0, "creatinine": 40.0, "ammonia": 30.0, "sodium": 139.0
        },
        "csf": { "cells": 2.0, "protein": 0.3, "antibodies": "not_tested" },
        "drugs": []
    }))
    .expect("normal snapshot deserializes")
}

fn fires_snapshot() -> PatientSnapshot {
    let mut snapshot = normal_snapshot();
    snapshot.neuro.gcs = Some(5);
    snapshot.neuro.seizures_24h = Some(15);
    snapshot.biology.crp = Some(145.0);
    snapshot.csf.antibodies = AntibodyResult::Negative;
    snapshot
}

fn scored(snapshot: PatientSnapshot) -> PatientState {
    let mut state = PatientState::new(snapshot).expect("snapshot is valid");
    run_pipeline(&mut state).expect("pipeline completes");
    state
}

#[test]
fn fires_archetype_is_critical_for_vital_prognosis() {
    let state = scored(fires_snapshot());

    let vital = state.vital_prognosis().expect("vital prognosis attached");
    assert!(
        vital.synthesis.score >= 75,
        "FIRES archetype should be critical, got {}",
        vital.synthesis.score
    );
    assert_eq!(vital.synthesis.level, "CRITIQUE");
    assert!(state.alerts().iter().any(|alert| {
        alert.severity == AlertSeverity::Critical && alert.source == EngineKind::VitalPrognosis
    }));
}

#[test]
fn textbook_normal_patient_raises_nothing() {
    let state = scored(normal_snapshot());

    let lowest = [
        (EngineKind::VitalPrognosis, "STABLE"),
        (EngineKind::TherapeuticDecision, "SURVEILLANCE"),
        (EngineKind::Pharmacovigilance, "RISQUE FAIBLE"),
        (EngineKind::EarlyWarning, "CALME"),
        (EngineKind::TherapeuticProspection, "CONSOLIDÉ"),
    ];
    for (kind, level) in lowest {
        let result = state.result(kind).expect("engine attached");
        assert!(result.synthesis.score < 25, "{kind} scored {}", result.synthesis.score);
        assert_eq!(result.synthesis.level, level);
    }
    assert!(state.alerts().is_empty(), "unexpected alerts: {:?}", state.alerts());
}

#[test]
fn identical_snapshots_serialize_identically() {
    let first = scored(fires_snapshot());
    let second = scored(fires_snapshot());

    let first_json = serde_json::to_string(&first).expect("serializes");
    let second_json = serde_json::to_string(&second).expect("serializes");
    assert_eq!(first_json, second_json);
}

#[test]
fn merged_alerts_are_unique_per_title_and_source() {
    let mut snapshot = fires_snapshot();
    snapshot.drugs = vec![
        DrugOrder::named("Valproate").with_dose(30.0),
        DrugOrder::named("Meropenem").with_dose(60.0),
    ];
    let state = scored(snapshot);

    let keys: BTreeSet<_> = state
        .alerts()
        .iter()
        .map(|alert| (alert.title.as_str(), alert.source))
        .collect();
    assert_eq!(keys.len(), state.alerts().len());

    let engine_total: usize = state
        .results()
        .iter()
        .map(|(_, result)| result.synthesis.alerts.len())
        .sum();
    assert_eq!(engine_total, state.alerts().len());
    assert_eq!(state.alerts()[0].source, EngineKind::VitalPrognosis);
}

#[test]
fn falling_gcs_on_follow_up_worsens_the_vital_curve() {
    let mut day_one = normal_snapshot();
    day_one.neuro.gcs = Some(13);
    let first = scored(day_one);

    let mut day_two = normal_snapshot();
    day_two.hospital_day = 2;
    day_two.neuro.gcs = Some(8);
    let mut second = PatientState::follow_up(&first, day_two).expect("follow-up is valid");
    run_pipeline(&mut second).expect("pipeline completes");

    let curve = &second.vital_prognosis().expect("attached").curve;
    assert!(
        matches!(curve.trend, Trend::Worsening | Trend::HighRisk),
        "got {:?}",
        curve.trend
    );
    assert_eq!(curve.labels, vec!["D1".to_string(), "D2".to_string()]);
    assert_eq!(curve.curve_data.len(), 2);
    assert_eq!(
        second.history().points(EngineKind::VitalPrognosis).len(),
        1,
        "one prior point per engine"
    );
}

#[test]
fn one_point_gcs_drop_on_follow_up_worsens_the_vital_curve() {
    for (before, after) in [(15, 14), (14, 13), (12, 11), (10, 9)] {
        let mut day_one = normal_snapshot();
        day_one.neuro.gcs = Some(before);
        let first = scored(day_one);

        let mut day_two = normal_snapshot();
        day_two.hospital_day = 2;
        day_two.neuro.gcs = Some(after);
        let mut second = PatientState::follow_up(&first, day_two).expect("follow-up is valid");
        run_pipeline(&mut second).expect("pipeline completes");

        let previous = first.vital_prognosis().expect("attached").curve.global_intensity;
        let curve = &second.vital_prognosis().expect("attached").curve;
        assert_eq!(curve.curve_data[0], previous, "history keeps the unrounded composite");
        assert!(
            matches!(curve.trend, Trend::Worsening | Trend::HighRisk),
            "GCS {before} -> {after}: got {:?} over {:?}",
            curve.trend,
            curve.curve_data
        );
    }
}

#[test]
fn omitted_disease_records_default_to_zero() {
    let state = scored(normal_snapshot());

    let prospection = state.therapeutic_prospection().expect("attached");
    let field = prospection
        .intention
        .field(DISEASE_MARKERS)
        .expect("disease-specific field kept");
    assert_eq!(field.intensity, 0.0);
}

#[test]
fn critical_interaction_guard_holds_the_score_at_ninety() {
    let mut snapshot = normal_snapshot();
    snapshot.drugs = vec![
        DrugOrder::named("Carbamazepine").with_dose(10.0),
        DrugOrder::named("Clarithromycin").with_dose(15.0),
    ];
    let state = scored(snapshot);

    let pharmaco = state.pharmacovigilance().expect("attached");
    assert!(pharmaco.synthesis.score >= 90);
    assert!(state
        .alerts()
        .iter()
        .any(|alert| alert.title == "Critical drug interaction"
            && alert.source == EngineKind::Pharmacovigilance));
}

#[test]
fn invalid_snapshots_are_rejected_at_construction() {
    let mut snapshot = normal_snapshot();
    snapshot.neuro.gcs = Some(2);
    assert_eq!(
        PatientState::new(snapshot).expect_err("GCS below 3"),
        SnapshotError::GcsOutOfRange(2)
    );

    let mut snapshot = normal_snapshot();
    snapshot.weight_kg = -4.0;
    assert!(matches!(
        PatientState::new(snapshot),
        Err(SnapshotError::InvalidWeight(_))
    ));
}

#[test]
fn injected_tables_change_what_gets_published() {
    let tables = EngineTables::from_json(r#"{"synthesis":{"pattern_publish_threshold":0.95}}"#)
        .expect("tables parse");
    let pipeline = Pipeline::new(tables);
    let mut state = PatientState::new(fires_snapshot()).expect("valid");

    pipeline.run(&mut state).expect("pipeline completes");

    assert!(state
        .alerts()
        .iter()
        .all(|alert| alert.title != "FIRES-like pattern"));
    let vital = state.vital_prognosis().expect("attached");
    assert!(vital.intention.pattern("FIRES-like").is_some());
}
