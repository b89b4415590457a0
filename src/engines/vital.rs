//! Vital-prognosis engine: how threatened is the patient right now.

use super::knowledge::summarize;
use super::{count, gcs};
use crate::config::{SignalRanges, VitalTables};
use crate::error::EvaluationFault;
use crate::patient::{AntibodyResult, PatientSnapshot, PupilState};
use crate::scoring::{
    Context, ContextBuilder, ContextKind, Criterion, Engine, EngineKind, FieldSpec, Firing,
    Intention, PatternSpec, PriorResults, Rule, RuleAdjustment, RuleInput, RuleKind, Signal,
    SynthesisProfile,
};

pub const NEUROLOGICAL: &str = "Neurological state";
pub const INFLAMMATORY: &str = "Neuro-inflammatory load";
pub const HEMODYNAMIC: &str = "Hemodynamic stability";
pub const RESERVE: &str = "Biological reserve";

pub struct VitalPrognosisEngine<'t> {
    ranges: &'t SignalRanges,
    tables: &'t VitalTables,
}

impl<'t> VitalPrognosisEngine<'t> {
    pub fn new(ranges: &'t SignalRanges, tables: &'t VitalTables) -> Self {
        Self { ranges, tables }
    }
}

impl Engine for VitalPrognosisEngine<'_> {
    fn kind(&self) -> EngineKind {
        EngineKind::VitalPrognosis
    }

    fn profile(&self) -> SynthesisProfile {
        SynthesisProfile {
            engine: EngineKind::VitalPrognosis,
            levels: ["STABLE", "MODÉRÉ", "SÉVÈRE", "CRITIQUE"],
            critical_advice: (
                "Intensive care escalation",
                "Vital prognosis is engaged: continuous neuro-monitoring, airway protection and intensive care review",
            ),
        }
    }

    fn fields(&self, snapshot: &PatientSnapshot) -> Vec<FieldSpec> {
        let r = self.ranges;
        let band = snapshot.age_band();
        let neuro = &snapshot.neuro;
        let hemo = &snapshot.hemodynamics;
        let bio = &snapshot.biology;
        let csf = &snapshot.csf;

        vec![
            FieldSpec::new(NEUROLOGICAL, "#6366f1", self.tables.neurological)
                .signal(0.50, Signal::read("GCS", gcs(snapshot), "/15", &r.gcs))
                .signal(
                    0.20,
                    Signal::read("Pupils", Some(neuro.pupils.severity()), "grade", &r.pupils),
                )
                .signal(
                    0.20,
                    Signal::read("Seizures (24h)", count(neuro.seizures_24h), "n", &r.seizures_24h),
                )
                .signal(
                    0.10,
                    Signal::read(
                        "Longest seizure",
                        neuro.seizure_duration_min,
                        "min",
                        &r.seizure_duration_min,
                    ),
                )
                .describe([
                    "Preserved consciousness",
                    "Mild neurological impairment",
                    "Severe neurological impairment",
                    "Coma or uncontrolled seizures",
                ]),
            FieldSpec::new(INFLAMMATORY, "#f97316", self.tables.inflammatory)
                .signal(0.30, Signal::read("CRP", bio.crp, "mg/L", &r.crp))
                .signal(0.15, Signal::read("PCT", bio.pct, "ng/mL", &r.pct))
                .signal(0.20, Signal::read("Ferritin", bio.ferritin, "ng/mL", &r.ferritin))
                .signal(0.20, Signal::read("CSF cells", csf.cells, "/mm³", &r.csf_cells))
                .signal(0.15, Signal::read("CSF protein", csf.protein, "g/L", &r.csf_protein)),
            FieldSpec::new(HEMODYNAMIC, "#ef4444", self.tables.hemodynamic)
                .signal(
                    0.25,
                    Signal::read("Heart rate", hemo.heart_rate, "bpm", r.heart_rate.for_band(band)),
                )
                .signal(
                    0.25,
                    Signal::read(
                        "Systolic BP",
                        hemo.systolic_bp,
                        "mmHg",
                        r.systolic_bp.for_band(band),
                    ),
                )
                .signal(0.25, Signal::read("SpO2", hemo.spo2, "%", &r.spo2))
                .signal(0.15, Signal::read("Lactate", bio.lactate, "mmol/L", &r.lactate))
                .signal(0.10, Signal::read("Temperature", hemo.temperature, "°C", &r.temperature)),
            FieldSpec::new(RESERVE, "#10b981", self.tables.reserve)
                .signal(0.40, Signal::read("Platelets", bio.platelets, "G/L", &r.platelets))
                .signal(0.30, Signal::read("WBC", bio.wbc, "G/L", &r.wbc))
                .signal(0.30, Signal::read("Sodium", bio.sodium, "mmol/L", &r.sodium)),
        ]
    }

    fn patterns(&self, snapshot: &PatientSnapshot) -> Vec<PatternSpec> {
        let neuro = &snapshot.neuro;
        let bio = &snapshot.biology;
        let hemo = &snapshot.hemodynamics;
        let band = snapshot.age_band();
        let seizures = neuro.seizures_24h.unwrap_or(0);
        let gcs = neuro.gcs.unwrap_or(15);
        let fever = hemo.temperature.is_some_and(|t| t >= 38.5);
        let il6 = snapshot.cytokines.as_ref().and_then(|panel| panel.il6);
        let systolic_low = self.ranges.systolic_bp.for_band(band).low;
        let hr_high = self.ranges.heart_rate.for_band(band).high;

        vec![
            PatternSpec::new(
                "FIRES-like",
                "Explosive refractory seizures after a febrile illness without identified antibodies",
                0.5,
            )
            .criterion(Criterion::when("≥10 seizures in 24h", 3.0, seizures >= 10))
            .criterion(Criterion::when("GCS ≤ 8", 2.0, gcs <= 8))
            .criterion(Criterion::when(
                "Negative CSF antibodies",
                2.0,
                snapshot.csf.antibodies == AntibodyResult::Negative,
            ))
            .criterion(Criterion::when("CRP > 50 mg/L", 1.0, bio.crp.is_some_and(|v| v > 50.0)))
            .criterion(Criterion::when("Fever ≥ 38.5 °C", 1.0, fever))
            .criterion(Criterion::when(
                "Refractory status",
                1.0,
                neuro.seizure_type.is_refractory(),
            ))
            .implies("Start ketogenic diet early")
            .implies("Consider anakinra after first-line immunotherapy failure"),
            PatternSpec::new(
                "Autoimmune encephalitis",
                "Antibody-mediated encephalitis with inflammatory CSF",
                0.5,
            )
            .criterion(Criterion::when(
                "Positive CSF antibodies",
                3.0,
                snapshot.csf.antibodies == AntibodyResult::Positive,
            ))
            .criterion(Criterion::when(
                "CSF pleocytosis",
                2.0,
                snapshot.csf.cells.is_some_and(|v| v > 5.0),
            ))
            .criterion(Criterion::when("Altered consciousness", 1.0, gcs <= 13))
            .criterion(Criterion::when("Seizures", 1.0, seizures > 0))
            .criterion(Criterion::when(
                "Raised CSF protein",
                1.0,
                snapshot.csf.protein.is_some_and(|v| v > 0.45),
            ))
            .implies("First-line immunotherapy without waiting for full panel")
            .implies("Screen for an underlying tumour"),
            PatternSpec::new(
                "Cytokine storm",
                "Hyperinflammatory state with hyperferritinemia and consumption",
                0.5,
            )
            .criterion(Criterion::when("Ferritin > 1000", 2.0, bio.ferritin.is_some_and(|v| v > 1000.0)))
            .criterion(Criterion::when("IL-6 > 50", 2.0, il6.is_some_and(|v| v > 50.0)))
            .criterion(Criterion::when("CRP > 100", 1.0, bio.crp.is_some_and(|v| v > 100.0)))
            .criterion(Criterion::when(
                "Platelets < 100",
                1.0,
                bio.platelets.is_some_and(|v| v < 100.0),
            ))
            .criterion(Criterion::when("Fever", 1.0, fever))
            .implies("Discuss targeted cytokine blockade"),
            PatternSpec::new("Shock", "Circulatory failure with tissue hypoperfusion", 0.5)
                .criterion(Criterion::when("Lactate > 4", 2.0, bio.lactate.is_some_and(|v| v > 4.0)))
                .criterion(Criterion::when(
                    "Hypotension for age",
                    2.0,
                    hemo.systolic_bp.is_some_and(|v| v < systolic_low),
                ))
                .criterion(Criterion::when(
                    "Tachycardia for age",
                    1.0,
                    hemo.heart_rate.is_some_and(|v| v > hr_high),
                ))
                .criterion(Criterion::when("SpO2 < 92%", 1.0, hemo.spo2.is_some_and(|v| v < 92.0)))
                .implies("Fluid resuscitation and vasoactive support"),
        ]
    }

    fn context(
        &self,
        snapshot: &PatientSnapshot,
        intention: &Intention,
        _prior: PriorResults<'_>,
    ) -> Context {
        let treatments = summarize(&snapshot.treatment_history);
        let involved = intention
            .fields
            .iter()
            .filter(|field| field.intensity >= 25.0)
            .count();
        let comorbidities = &snapshot.comorbidities;

        let mut builder = ContextBuilder::new();
        builder
            .apply(
                snapshot.age_months < 12,
                1.15,
                ContextKind::Demographic,
                "baby",
                "Infant",
                format!("{} months old", snapshot.age_months),
            )
            .apply(
                comorbidities.immunodeficiency,
                1.2,
                ContextKind::Comorbidity,
                "shield",
                "Immunodeficiency",
                "Reduced capacity to contain infection",
            )
            .apply(
                comorbidities.epilepsy,
                1.05,
                ContextKind::Comorbidity,
                "brain",
                "Known epilepsy",
                "Lower seizure threshold",
            )
            .apply(
                comorbidities.cardiopathy,
                1.1,
                ContextKind::Comorbidity,
                "heart",
                "Cardiopathy",
                "Limited hemodynamic reserve",
            )
            .apply(
                snapshot.neuro.seizure_type.is_status(),
                1.25,
                ContextKind::Course,
                "bolt",
                "Status epilepticus",
                "Ongoing status epilepticus",
            )
            .apply(
                snapshot.hospital_day >= 14,
                1.1,
                ContextKind::Course,
                "calendar",
                "Prolonged course",
                format!("Hospital day {}", snapshot.hospital_day),
            )
            .apply(
                treatments.failed >= 2,
                1.2,
                ContextKind::Treatment,
                "pill",
                "Refractory disease",
                format!("{} treatment lines without response", treatments.failed),
            )
            .apply(
                involved >= 3,
                1.1,
                ContextKind::Course,
                "layers",
                "Multi-domain involvement",
                format!("{involved} fields above the moderate band"),
            );
        builder.finish()
    }

    fn rules(&self) -> &'static [Rule] {
        RULES
    }
}

const RULES: &[Rule] = &[
    Rule {
        name: "Bilateral fixed pupils",
        kind: RuleKind::Guard,
        reference: "Kochanek PM et al. Pediatr Crit Care Med 2019;20:S1-S82",
        trigger: bilateral_fixed_pupils,
    },
    Rule {
        name: "Refractory status with coma",
        kind: RuleKind::Guard,
        reference: "Wickström R et al. Epilepsia 2022;63:2827-39",
        trigger: refractory_status_with_coma,
    },
    Rule {
        name: "Deep coma",
        kind: RuleKind::Guard,
        reference: "Teasdale G, Jennett B. Lancet 1974;2:81-4",
        trigger: deep_coma,
    },
    Rule {
        name: "Cytokine amplification",
        kind: RuleKind::Correction,
        reference: "Kothur K et al. Neurology 2016;87:2218-25",
        trigger: cytokine_amplification,
    },
    Rule {
        name: "Shock physiology",
        kind: RuleKind::Correction,
        reference: "Weiss SL et al. Pediatr Crit Care Med 2020;21:e52-e106",
        trigger: shock_physiology,
    },
    Rule {
        name: "Antibody panel pending",
        kind: RuleKind::Informational,
        reference: "Graus F et al. Lancet Neurol 2016;15:391-404",
        trigger: antibody_panel_pending,
    },
    Rule {
        name: "GCS decline",
        kind: RuleKind::Informational,
        reference: "Teasdale G, Jennett B. Lancet 1974;2:81-4",
        trigger: gcs_decline,
    },
];

fn bilateral_fixed_pupils(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    Ok(
        (input.snapshot.neuro.pupils == PupilState::BilateralFixed).then(|| {
            Firing::new("Bilateral fixed pupils: suspect herniation, urgent imaging and neurosurgical review")
                .with_floor(90)
        }),
    )
}

fn refractory_status_with_coma(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    let neuro = &input.snapshot.neuro;
    let seizures = neuro.seizures_24h.unwrap_or(0);
    let coma = neuro.gcs.is_some_and(|gcs| gcs <= 8);
    Ok((seizures >= 10 && coma).then(|| {
        Firing::new(format!(
            "{seizures} seizures in 24h with GCS ≤ 8: refractory status with impaired consciousness"
        ))
        .with_floor(85)
    }))
}

fn deep_coma(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    Ok(input.snapshot.neuro.gcs.filter(|gcs| *gcs <= 6).map(|gcs| {
        Firing::new(format!("GCS {gcs}: airway protection required")).with_floor(75)
    }))
}

fn cytokine_amplification(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    let il6 = input.snapshot.cytokines.as_ref().and_then(|panel| panel.il6);
    Ok(il6.filter(|value| *value > 100.0).map(|value| {
        Firing::new(format!("IL-6 at {value:.0} pg/mL amplifies the neuro-inflammatory load"))
            .with(RuleAdjustment::FieldShift {
                field: INFLAMMATORY,
                delta: 15.0,
            })
    }))
}

fn shock_physiology(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    let hemodynamic = input.field_intensity(HEMODYNAMIC)?;
    let lactate = input.snapshot.biology.lactate.unwrap_or(0.0);
    Ok((lactate > 4.0 && hemodynamic >= 25.0).then(|| {
        Firing::new(format!("Lactate {lactate:.1} mmol/L with unstable hemodynamics"))
            .with(RuleAdjustment::FieldShift {
                field: HEMODYNAMIC,
                delta: 20.0,
            })
    }))
}

fn antibody_panel_pending(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    Ok((input.snapshot.csf.antibodies == AntibodyResult::Pending).then(|| {
        Firing::new("Keep empirical immunotherapy until the autoimmune panel returns")
    }))
}

fn gcs_decline(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    Ok(input.snapshot.neuro.gcs_drop().filter(|drop| *drop >= 2).map(|drop| {
        Firing::new(format!("GCS fell {drop} points from its best recorded value; reassess hourly"))
    }))
}
