//! Early-warning engine: physiological drift that precedes an acute decompensation.

use super::gcs;
use crate::config::{EarlyWarningTables, SignalRanges};
use crate::error::EvaluationFault;
use crate::patient::{AgeBand, PatientSnapshot, PupilState};
use crate::scoring::{
    Context, ContextBuilder, ContextKind, Criterion, Engine, EngineKind, FieldSpec, Firing,
    Intention, PatternSpec, PriorResults, Rule, RuleAdjustment, RuleInput, RuleKind, Signal,
    SynthesisProfile,
};

pub const RESPIRATORY: &str = "Respiratory";
pub const CARDIOVASCULAR: &str = "Cardiovascular";
pub const NEUROLOGICAL: &str = "Neurological trajectory";
pub const INFLAMMATORY: &str = "Inflammatory drift";

pub struct EarlyWarningEngine<'t> {
    ranges: &'t SignalRanges,
    tables: &'t EarlyWarningTables,
}

impl<'t> EarlyWarningEngine<'t> {
    pub fn new(ranges: &'t SignalRanges, tables: &'t EarlyWarningTables) -> Self {
        Self { ranges, tables }
    }
}

impl Engine for EarlyWarningEngine<'_> {
    fn kind(&self) -> EngineKind {
        EngineKind::EarlyWarning
    }

    fn profile(&self) -> SynthesisProfile {
        SynthesisProfile {
            engine: EngineKind::EarlyWarning,
            levels: ["CALME", "VEILLE", "ALERTE", "ALARME"],
            critical_advice: (
                "Call the rapid response team",
                "Imminent decompensation: bedside senior review and continuous monitoring",
            ),
        }
    }

    fn fields(&self, snapshot: &PatientSnapshot) -> Vec<FieldSpec> {
        let r = self.ranges;
        let band = snapshot.age_band();
        let hemo = &snapshot.hemodynamics;
        let bio = &snapshot.biology;
        let drop = snapshot.neuro.gcs_drop().map(f64::from);

        vec![
            FieldSpec::new(RESPIRATORY, "#06b6d4", self.tables.respiratory)
                .signal(
                    0.50,
                    Signal::read(
                        "Respiratory rate",
                        hemo.respiratory_rate,
                        "/min",
                        r.respiratory_rate.for_band(band),
                    ),
                )
                .signal(0.50, Signal::read("SpO2", hemo.spo2, "%", &r.spo2)),
            FieldSpec::new(CARDIOVASCULAR, "#ef4444", self.tables.cardiovascular)
                .signal(
                    0.40,
                    Signal::read("Heart rate", hemo.heart_rate, "bpm", r.heart_rate.for_band(band)),
                )
                .signal(
                    0.40,
                    Signal::read(
                        "Systolic BP",
                        hemo.systolic_bp,
                        "mmHg",
                        r.systolic_bp.for_band(band),
                    ),
                )
                .signal(0.20, Signal::read("Lactate", bio.lactate, "mmol/L", &r.lactate)),
            FieldSpec::new(NEUROLOGICAL, "#6366f1", self.tables.neurological)
                .signal(0.50, Signal::read("GCS drop", drop, "pts", &self.tables.gcs_drop))
                .signal(0.30, Signal::read("GCS", gcs(snapshot), "/15", &r.gcs))
                .signal(
                    0.20,
                    Signal::read(
                        "Pupils",
                        Some(snapshot.neuro.pupils.severity()),
                        "grade",
                        &r.pupils,
                    ),
                )
                .describe([
                    "Stable neurological course",
                    "Fluctuating consciousness",
                    "Neurological deterioration",
                    "Rapid neurological collapse",
                ]),
            FieldSpec::new(INFLAMMATORY, "#f97316", self.tables.inflammatory)
                .signal(0.30, Signal::read("Temperature", hemo.temperature, "°C", &r.temperature))
                .signal(0.30, Signal::read("CRP", bio.crp, "mg/L", &r.crp))
                .signal(0.20, Signal::read("PCT", bio.pct, "ng/mL", &r.pct))
                .signal(0.20, Signal::read("WBC", bio.wbc, "G/L", &r.wbc)),
        ]
    }

    fn patterns(&self, snapshot: &PatientSnapshot) -> Vec<PatternSpec> {
        let band = snapshot.age_band();
        let hemo = &snapshot.hemodynamics;
        let bio = &snapshot.biology;
        let heart = self.ranges.heart_rate.for_band(band);
        let systolic = self.ranges.systolic_bp.for_band(band);
        let breathing = self.ranges.respiratory_rate.for_band(band);
        let drop = snapshot.neuro.gcs_drop().unwrap_or(0);

        vec![
            PatternSpec::new(
                "Impending herniation",
                "Signs of intracranial hypertension with brainstem compromise",
                0.5,
            )
            .criterion(Criterion::when(
                "Fixed pupil",
                3.0,
                matches!(
                    snapshot.neuro.pupils,
                    PupilState::UnilateralFixed | PupilState::BilateralFixed
                ),
            ))
            .criterion(Criterion::when("GCS drop ≥ 3", 2.0, drop >= 3))
            .criterion(Criterion::when(
                "Bradycardia",
                1.0,
                hemo.heart_rate.is_some_and(|v| v < heart.low),
            ))
            .criterion(Criterion::when(
                "Hypertension",
                1.0,
                hemo.systolic_bp.is_some_and(|v| v > systolic.high),
            ))
            .implies("Osmotherapy and urgent neurosurgical imaging"),
            PatternSpec::new(
                "Sepsis-like deterioration",
                "Systemic inflammatory response with hypoperfusion",
                0.5,
            )
            .criterion(Criterion::when(
                "Fever or hypothermia",
                1.0,
                hemo.temperature.is_some_and(|t| !(36.0..38.5).contains(&t)),
            ))
            .criterion(Criterion::when(
                "Tachycardia",
                1.0,
                hemo.heart_rate.is_some_and(|v| v > heart.high),
            ))
            .criterion(Criterion::when("Lactate > 2", 2.0, bio.lactate.is_some_and(|v| v > 2.0)))
            .criterion(Criterion::when("PCT > 2", 2.0, bio.pct.is_some_and(|v| v > 2.0)))
            .criterion(Criterion::when(
                "Hypotension",
                1.0,
                hemo.systolic_bp.is_some_and(|v| v < systolic.low),
            ))
            .implies("Blood cultures and broad-spectrum antibiotics within the hour"),
            PatternSpec::new(
                "Respiratory failure",
                "Hypoxemia with increased work of breathing or loss of airway protection",
                0.5,
            )
            .criterion(Criterion::when("SpO2 < 90%", 3.0, hemo.spo2.is_some_and(|v| v < 90.0)))
            .criterion(Criterion::when(
                "Tachypnea",
                2.0,
                hemo.respiratory_rate.is_some_and(|v| v > breathing.high),
            ))
            .criterion(Criterion::when(
                "GCS ≤ 8",
                1.0,
                snapshot.neuro.gcs.is_some_and(|v| v <= 8),
            ))
            .implies("Prepare for non-invasive or invasive ventilation"),
        ]
    }

    fn context(
        &self,
        snapshot: &PatientSnapshot,
        _intention: &Intention,
        prior: PriorResults<'_>,
    ) -> Context {
        let vital = prior.score(EngineKind::VitalPrognosis).unwrap_or(0);
        let pharmaco = prior.score(EngineKind::Pharmacovigilance).unwrap_or(0);

        let mut builder = ContextBuilder::new();
        builder
            .apply(
                vital >= 50,
                1.2,
                ContextKind::Dependency,
                "heartbeat",
                "Fragile vital prognosis",
                format!("Vital prognosis score {vital}"),
            )
            .apply(
                pharmaco >= 75,
                1.1,
                ContextKind::Dependency,
                "pill",
                "Iatrogenic risk",
                format!("Pharmacovigilance score {pharmaco}"),
            )
            .apply(
                snapshot.hospital_day <= 2,
                1.1,
                ContextKind::Course,
                "clock",
                "Early admission phase",
                format!("Hospital day {}", snapshot.hospital_day),
            );
        builder.finish()
    }

    fn rules(&self) -> &'static [Rule] {
        RULES
    }
}

const RULES: &[Rule] = &[
    Rule {
        name: "Cushing triad",
        kind: RuleKind::Guard,
        reference: "Dinallo S, Waseem M. StatPearls 2023 (Cushing reflex)",
        trigger: cushing_triad,
    },
    Rule {
        name: "Severe hypoxemia",
        kind: RuleKind::Guard,
        reference: "Duncan H et al. Arch Dis Child 2006;91:17-22 (PEWS)",
        trigger: severe_hypoxemia,
    },
    Rule {
        name: "Rapid GCS decline",
        kind: RuleKind::Correction,
        reference: "Teasdale G, Jennett B. Lancet 1974;2:81-4",
        trigger: rapid_gcs_decline,
    },
    Rule {
        name: "Fever with normal markers",
        kind: RuleKind::Informational,
        reference: "NICE NG143 Fever in under 5s, 2021",
        trigger: fever_with_normal_markers,
    },
];

/// Bradycardia and systolic hypertension cut-offs for the Cushing reflex.
const fn cushing_limits(band: AgeBand) -> (f64, f64) {
    match band {
        AgeBand::Infant => (90.0, 110.0),
        AgeBand::Toddler => (80.0, 120.0),
        AgeBand::Child => (60.0, 130.0),
        AgeBand::Adolescent => (50.0, 140.0),
    }
}

fn cushing_triad(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    let snapshot = input.snapshot;
    let (bradycardia, hypertension) = cushing_limits(snapshot.age_band());
    let hemo = &snapshot.hemodynamics;
    let slow = hemo.heart_rate.is_some_and(|v| v < bradycardia);
    let high = hemo.systolic_bp.is_some_and(|v| v > hypertension);
    let neurological = snapshot.neuro.gcs_drop().is_some_and(|drop| drop >= 2)
        || snapshot.neuro.pupils.severity() >= 2.0;

    Ok((slow && high && neurological).then(|| {
        Firing::new("Bradycardia, hypertension and neurological decline: treat as intracranial hypertension")
            .with_floor(95)
    }))
}

fn severe_hypoxemia(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    Ok(input
        .snapshot
        .hemodynamics
        .spo2
        .filter(|spo2| *spo2 < 85.0)
        .map(|spo2| Firing::new(format!("SpO2 {spo2:.0}%: secure oxygenation now")).with_floor(80)))
}

fn rapid_gcs_decline(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    Ok(input.snapshot.neuro.gcs_drop().filter(|drop| *drop >= 3).map(|drop| {
        Firing::new(format!("GCS lost {drop} points"))
            .with(RuleAdjustment::FieldShift {
                field: NEUROLOGICAL,
                delta: 15.0,
            })
    }))
}

fn fever_with_normal_markers(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    let snapshot = input.snapshot;
    let fever = snapshot.hemodynamics.temperature.is_some_and(|t| t >= 38.5);
    let quiet = snapshot.biology.crp.is_some_and(|crp| crp < 20.0);
    Ok((fever && quiet).then(|| {
        Firing::new("Fever with low CRP: repeat cultures and markers in 12 to 24 hours")
    }))
}
