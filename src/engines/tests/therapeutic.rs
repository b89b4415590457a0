use super::common::*;
use crate::engines::therapeutic::REFRACTORINESS;
use crate::patient::{SeizureType, TreatmentResponse};
use crate::scoring::{EngineKind, RuleAdjustment};

#[test]
fn super_refractory_status_forces_escalation() {
    let mut snapshot = baseline_snapshot();
    snapshot.neuro.seizure_type = SeizureType::SuperRefractoryStatus;

    let result = run_until(&snapshot, EngineKind::TherapeuticDecision);

    assert!(result.synthesis.score >= 80);
    let guard = result
        .rules
        .iter()
        .find(|rule| rule.name == "Super-refractory status escalation")
        .expect("guard fired");
    match &guard.adjustments[..] {
        [RuleAdjustment::TherapeuticOptions(options)] => assert_eq!(options.len(), 3),
        other => panic!("expected therapeutic options, got {other:?}"),
    }
}

#[test]
fn critical_vital_prognosis_raises_the_context() {
    let result = run_until(&fires_snapshot(), EngineKind::TherapeuticDecision);

    let detail = result
        .context
        .details
        .iter()
        .find(|detail| detail.label == "Critical vital prognosis")
        .expect("dependency applied");
    assert!((detail.factor - 1.3).abs() < 1e-9);
}

#[test]
fn untreated_active_disease_opens_the_immunotherapy_window() {
    let mut snapshot = baseline_snapshot();
    snapshot.neuro.seizures_24h = Some(12);
    snapshot.neuro.gcs = Some(12);

    let result = run_until(&snapshot, EngineKind::TherapeuticDecision);

    assert!(fired(&result, "Immunotherapy window"));
    assert!(result.intention.pattern("Early immunotherapy window").is_some());
    assert!(result
        .synthesis
        .recommendations
        .iter()
        .any(|rec| rec.title == "Immunotherapy window"));
}

#[test]
fn partial_response_shifts_refractoriness() {
    let mut snapshot = baseline_snapshot();
    snapshot.neuro.seizures_24h = Some(12);
    snapshot.neuro.gcs = Some(12);
    snapshot.treatment_history = vec![course("Methylprednisolone", TreatmentResponse::Partial)];

    let result = run_until(&snapshot, EngineKind::TherapeuticDecision);

    let correction = result
        .rules
        .iter()
        .find(|rule| rule.name == "Partial response only")
        .expect("correction fired");
    assert_eq!(correction.field_shifts().collect::<Vec<_>>(), vec![(REFRACTORINESS, 10.0)]);
    assert!(!fired(&result, "Immunotherapy window"));
}

#[test]
fn failed_first_line_is_recognised() {
    let mut snapshot = baseline_snapshot();
    snapshot.neuro.seizures_24h = Some(6);
    snapshot.hospital_day = 8;
    snapshot.treatment_history = vec![course("IVIG 2 g/kg", TreatmentResponse::None)];

    let result = run_until(&snapshot, EngineKind::TherapeuticDecision);

    let pattern = result.intention.pattern("First-line failure").expect("pattern scored");
    assert!((pattern.confidence - 1.0).abs() < 1e-9);
    assert_eq!(result.intention.patterns[0].name, "First-line failure");
}
