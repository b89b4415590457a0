//! Therapeutic-decision engine: how urgently the treatment plan must escalate.

use super::knowledge::{summarize, TherapyLine};
use super::{count, gcs, tally};
use crate::config::{SignalRanges, TherapeuticTables};
use crate::error::EvaluationFault;
use crate::patient::{AntibodyResult, PatientSnapshot, SeizureType};
use crate::scoring::{
    Context, ContextBuilder, ContextKind, Criterion, Engine, EngineKind, FieldSpec, Firing,
    Intention, PatternSpec, PriorResults, Rule, RuleAdjustment, RuleInput, RuleKind, Signal,
    SynthesisProfile, TherapeuticOption,
};

pub const ACTIVITY: &str = "Disease activity";
pub const REFRACTORINESS: &str = "Treatment refractoriness";
pub const IMMUNE: &str = "Immune activation";

pub struct TherapeuticDecisionEngine<'t> {
    ranges: &'t SignalRanges,
    tables: &'t TherapeuticTables,
}

impl<'t> TherapeuticDecisionEngine<'t> {
    pub fn new(ranges: &'t SignalRanges, tables: &'t TherapeuticTables) -> Self {
        Self { ranges, tables }
    }
}

impl Engine for TherapeuticDecisionEngine<'_> {
    fn kind(&self) -> EngineKind {
        EngineKind::TherapeuticDecision
    }

    fn profile(&self) -> SynthesisProfile {
        SynthesisProfile {
            engine: EngineKind::TherapeuticDecision,
            levels: ["SURVEILLANCE", "AJUSTEMENT", "ESCALADE", "ESCALADE URGENTE"],
            critical_advice: (
                "Escalate treatment now",
                "Current regimen is failing: convene the multidisciplinary team for next-line therapy today",
            ),
        }
    }

    fn fields(&self, snapshot: &PatientSnapshot) -> Vec<FieldSpec> {
        let r = self.ranges;
        let t = self.tables;
        let treatments = summarize(&snapshot.treatment_history);
        let il6 = snapshot.cytokines.as_ref().and_then(|panel| panel.il6);

        vec![
            FieldSpec::new(ACTIVITY, "#8b5cf6", t.activity)
                .signal(
                    0.40,
                    Signal::read(
                        "Seizures (24h)",
                        count(snapshot.neuro.seizures_24h),
                        "n",
                        &r.seizures_24h,
                    ),
                )
                .signal(0.30, Signal::read("GCS", gcs(snapshot), "/15", &r.gcs))
                .signal(
                    0.30,
                    Signal::read(
                        "Longest seizure",
                        snapshot.neuro.seizure_duration_min,
                        "min",
                        &r.seizure_duration_min,
                    ),
                )
                .describe([
                    "Quiescent disease",
                    "Active disease",
                    "Uncontrolled disease",
                    "Fulminant disease",
                ]),
            FieldSpec::new(REFRACTORINESS, "#dc2626", t.refractoriness)
                .signal(
                    0.50,
                    Signal::read("Failed lines", tally(treatments.failed), "n", &t.failed_lines),
                )
                .signal(
                    0.20,
                    Signal::read("Partial responses", tally(treatments.partial), "n", &t.partial_lines),
                )
                .signal(
                    0.30,
                    Signal::read(
                        "Hospital day",
                        Some(f64::from(snapshot.hospital_day)),
                        "d",
                        &t.hospital_day,
                    ),
                )
                .describe([
                    "Responding to treatment",
                    "Incomplete response",
                    "Refractory to current lines",
                    "Multi-line refractory",
                ]),
            FieldSpec::new(IMMUNE, "#f59e0b", t.immune)
                .signal(0.30, Signal::read("CRP", snapshot.biology.crp, "mg/L", &r.crp))
                .signal(0.20, Signal::read("Ferritin", snapshot.biology.ferritin, "ng/mL", &r.ferritin))
                .signal(0.30, Signal::read("CSF cells", snapshot.csf.cells, "/mm³", &r.csf_cells))
                .signal(0.20, Signal::read("IL-6", il6, "pg/mL", &r.il6)),
        ]
    }

    fn patterns(&self, snapshot: &PatientSnapshot) -> Vec<PatternSpec> {
        let treatments = summarize(&snapshot.treatment_history);
        let seizures = snapshot.neuro.seizures_24h.unwrap_or(0);
        let gcs = snapshot.neuro.gcs.unwrap_or(15);
        let inflamed = snapshot.biology.crp.is_some_and(|v| v > 50.0)
            || snapshot.csf.cells.is_some_and(|v| v > 5.0);

        vec![
            PatternSpec::new(
                "First-line failure",
                "Persistent activity despite corticosteroids, IVIG or plasma exchange",
                0.5,
            )
            .criterion(Criterion::when(
                "First-line immunotherapy without response",
                3.0,
                treatments.first_line_failed,
            ))
            .criterion(Criterion::when("≥5 seizures in 24h", 1.0, seizures >= 5))
            .criterion(Criterion::when("Hospital day ≥ 7", 1.0, snapshot.hospital_day >= 7))
            .implies("Escalate to second-line immunotherapy"),
            PatternSpec::new(
                "Second-line candidate",
                "Refractory course with ongoing inflammation and no second-line agent yet",
                0.5,
            )
            .criterion(Criterion::when("≥2 failed lines", 2.0, treatments.failed >= 2))
            .criterion(Criterion::when(
                "No second-line agent yet",
                1.0,
                !treatments.second_line_tried,
            ))
            .criterion(Criterion::when("Active inflammation", 1.0, inflamed))
            .criterion(Criterion::when(
                "Refractory status",
                1.0,
                snapshot.neuro.seizure_type.is_refractory(),
            ))
            .implies("Discuss rituximab or cyclophosphamide")
            .implies("Consider targeted cytokine therapy"),
            PatternSpec::new(
                "Early immunotherapy window",
                "Suspected immune-mediated encephalopathy early enough to benefit from prompt treatment",
                0.5,
            )
            .criterion(Criterion::when("Seizures", 2.0, seizures > 0))
            .criterion(Criterion::when("Hospital day ≤ 7", 1.0, snapshot.hospital_day <= 7))
            .criterion(Criterion::when(
                "No immunotherapy yet",
                1.0,
                !treatments.first_line_tried,
            ))
            .criterion(Criterion::when("Altered consciousness", 1.0, gcs <= 12))
            .criterion(Criterion::when(
                "Immune CSF findings",
                1.0,
                snapshot.csf.antibodies == AntibodyResult::Positive
                    || snapshot.csf.cells.is_some_and(|v| v > 5.0),
            ))
            .implies("Start first-line immunotherapy within 48 hours"),
        ]
    }

    fn context(
        &self,
        snapshot: &PatientSnapshot,
        _intention: &Intention,
        prior: PriorResults<'_>,
    ) -> Context {
        let vital = prior.score(EngineKind::VitalPrognosis).unwrap_or(0);
        let treatments = summarize(&snapshot.treatment_history);

        let mut builder = ContextBuilder::new();
        builder
            .apply(
                vital >= 75,
                1.3,
                ContextKind::Dependency,
                "heartbeat",
                "Critical vital prognosis",
                format!("Vital prognosis score {vital}"),
            )
            .apply(
                (50..75).contains(&vital),
                1.15,
                ContextKind::Dependency,
                "heartbeat",
                "Severe vital prognosis",
                format!("Vital prognosis score {vital}"),
            )
            .apply(
                !treatments.first_line_tried && snapshot.hospital_day > 7,
                1.15,
                ContextKind::Treatment,
                "hourglass",
                "Delayed immunotherapy",
                format!("No immunotherapy by day {}", snapshot.hospital_day),
            )
            .apply(
                snapshot.comorbidities.immunodeficiency,
                1.1,
                ContextKind::Comorbidity,
                "shield",
                "Immunodeficiency",
                "Immunosuppression must be balanced against infection risk",
            );
        builder.finish()
    }

    fn rules(&self) -> &'static [Rule] {
        RULES
    }
}

const RULES: &[Rule] = &[
    Rule {
        name: "Super-refractory status escalation",
        kind: RuleKind::Guard,
        reference: "Shorvon S, Ferlisi M. Brain 2011;134:2802-18",
        trigger: super_refractory_escalation,
    },
    Rule {
        name: "Partial response only",
        kind: RuleKind::Correction,
        reference: "Titulaer MJ et al. Lancet Neurol 2013;12:157-65",
        trigger: partial_response_only,
    },
    Rule {
        name: "Immunotherapy window",
        kind: RuleKind::Informational,
        reference: "Cellucci T et al. Neurol Neuroimmunol Neuroinflamm 2020;7:e663",
        trigger: immunotherapy_window,
    },
    Rule {
        name: "Ketogenic diet eligibility",
        kind: RuleKind::Informational,
        reference: "Peng P et al. Epilepsia 2019;60:2093-102",
        trigger: ketogenic_eligibility,
    },
];

const ESCALATION_OPTIONS: &[(&str, TherapyLine, &str)] = &[
    (
        "Anakinra",
        TherapyLine::TargetedCytokine,
        "IL-1 blockade in refractory febrile status",
    ),
    (
        "Ketogenic diet",
        TherapyLine::KetogenicDiet,
        "Anti-seizure and anti-inflammatory effect in super-refractory status",
    ),
    (
        "Rituximab",
        TherapyLine::SecondLineImmunotherapy,
        "B-cell depletion after first-line failure",
    ),
];

fn super_refractory_escalation(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    let snapshot = input.snapshot;
    let treatments = summarize(&snapshot.treatment_history);
    let seizures = snapshot.neuro.seizures_24h.unwrap_or(0);
    let super_refractory = snapshot.neuro.seizure_type == SeizureType::SuperRefractoryStatus
        || (treatments.failed >= 2 && seizures >= 10);

    Ok(super_refractory.then(|| {
        let options = ESCALATION_OPTIONS
            .iter()
            .map(|&(therapy, line, rationale)| TherapeuticOption {
                therapy,
                line,
                rationale,
            })
            .collect();
        Firing::new("Super-refractory status: escalate beyond anaesthetic infusions")
            .with_floor(80)
            .with(RuleAdjustment::TherapeuticOptions(options))
    }))
}

fn partial_response_only(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    let activity = input.field_intensity(ACTIVITY)?;
    let treatments = summarize(&input.snapshot.treatment_history);
    Ok((treatments.partial >= 1 && activity >= 25.0).then(|| {
        Firing::new(format!(
            "{} partial response(s) with persistent disease activity",
            treatments.partial
        ))
        .with(RuleAdjustment::FieldShift {
            field: REFRACTORINESS,
            delta: 10.0,
        })
    }))
}

fn immunotherapy_window(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    let activity = input.field_intensity(ACTIVITY)?;
    let treatments = summarize(&input.snapshot.treatment_history);
    let day = input.snapshot.hospital_day;
    Ok((activity >= 25.0 && !treatments.first_line_tried && day <= 7).then(|| {
        Firing::new(format!(
            "Day {day} without immunotherapy: start corticosteroids or IVIG once infection is covered"
        ))
    }))
}

fn ketogenic_eligibility(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    let treatments = summarize(&input.snapshot.treatment_history);
    Ok(
        (input.snapshot.neuro.seizure_type.is_refractory() && !treatments.ketogenic_tried).then(
            || Firing::new("Refractory status without ketogenic diet: request a dietetic assessment"),
        ),
    )
}
