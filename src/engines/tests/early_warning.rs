use super::common::*;
use crate::engines::early_warning::NEUROLOGICAL;
use crate::patient::PupilState;
use crate::scoring::EngineKind;

#[test]
fn cushing_triad_forces_the_highest_floor() {
    let mut snapshot = baseline_snapshot();
    snapshot.hemodynamics.heart_rate = Some(50.0);
    snapshot.hemodynamics.systolic_bp = Some(150.0);
    snapshot.neuro.pupils = PupilState::UnilateralFixed;

    let result = run_until(&snapshot, EngineKind::EarlyWarning);

    assert!(fired(&result, "Cushing triad"));
    assert!(result.synthesis.score >= 95);
    assert_eq!(result.synthesis.level, "ALARME");
}

#[test]
fn severe_hypoxemia_is_guarded() {
    let mut snapshot = baseline_snapshot();
    snapshot.hemodynamics.spo2 = Some(82.0);

    let result = run_until(&snapshot, EngineKind::EarlyWarning);

    assert!(result.synthesis.score >= 80);
    assert!(result.intention.pattern("Respiratory failure").is_some());
}

#[test]
fn rapid_gcs_decline_shifts_the_neurological_trajectory() {
    let mut snapshot = baseline_snapshot();
    snapshot.neuro.gcs = Some(9);
    snapshot.neuro.gcs_history = vec![14, 12];

    let result = run_until(&snapshot, EngineKind::EarlyWarning);

    let correction = result
        .rules
        .iter()
        .find(|rule| rule.name == "Rapid GCS decline")
        .expect("correction fired");
    assert_eq!(correction.field_shifts().collect::<Vec<_>>(), vec![(NEUROLOGICAL, 15.0)]);
    let field = result.intention.field(NEUROLOGICAL).expect("field");
    assert!(field.intensity > 25.0);
}

#[test]
fn fever_without_inflammation_is_informational() {
    let mut snapshot = baseline_snapshot();
    snapshot.hemodynamics.temperature = Some(39.0);

    let result = run_until(&snapshot, EngineKind::EarlyWarning);

    assert!(result
        .synthesis
        .recommendations
        .iter()
        .any(|rec| rec.title == "Fever with normal markers"));
    assert!(result.synthesis.alerts.is_empty());
}

#[test]
fn earlier_engines_feed_the_context() {
    let result = run_until(&fires_snapshot(), EngineKind::EarlyWarning);

    let labels: Vec<_> = result
        .context
        .details
        .iter()
        .map(|detail| detail.label.as_str())
        .collect();
    assert_eq!(labels, vec!["Fragile vital prognosis", "Early admission phase"]);
    assert!((result.context.context_modifier - 1.32).abs() < 1e-9);
}
