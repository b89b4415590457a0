//! Pharmacovigilance engine: interaction, clearance and dose-exposure risk of the
//! active prescriptions.

use super::knowledge::{
    detect_interactions, dose_adjustments, identify, overdose_ratio, InteractionSeverity,
};
use super::tally;
use crate::config::{PharmacovigilanceTables, SignalRanges};
use crate::error::EvaluationFault;
use crate::patient::PatientSnapshot;
use crate::scoring::{
    Context, ContextBuilder, ContextKind, Criterion, Engine, EngineKind, FieldSpec, Firing,
    Intention, PatternSpec, PriorResults, Rule, RuleAdjustment, RuleInput, RuleKind, Signal,
    SynthesisProfile,
};

pub const INTERACTIONS: &str = "Interaction burden";
pub const CLEARANCE: &str = "Organ clearance";
pub const EXPOSURE: &str = "Dose exposure";

pub struct PharmacovigilanceEngine<'t> {
    ranges: &'t SignalRanges,
    tables: &'t PharmacovigilanceTables,
}

impl<'t> PharmacovigilanceEngine<'t> {
    pub fn new(ranges: &'t SignalRanges, tables: &'t PharmacovigilanceTables) -> Self {
        Self { ranges, tables }
    }
}

fn takes(snapshot: &PatientSnapshot, key: &str) -> bool {
    snapshot
        .drugs
        .iter()
        .any(|order| identify(&order.name).is_some_and(|profile| profile.key == key))
}

impl Engine for PharmacovigilanceEngine<'_> {
    fn kind(&self) -> EngineKind {
        EngineKind::Pharmacovigilance
    }

    fn profile(&self) -> SynthesisProfile {
        SynthesisProfile {
            engine: EngineKind::Pharmacovigilance,
            levels: ["RISQUE FAIBLE", "VIGILANCE", "RISQUE ÉLEVÉ", "DANGER"],
            critical_advice: (
                "Pharmacy review now",
                "Prescriptions carry a high iatrogenic risk: review interactions and doses with the clinical pharmacist",
            ),
        }
    }

    fn fields(&self, snapshot: &PatientSnapshot) -> Vec<FieldSpec> {
        let r = self.ranges;
        let t = self.tables;
        let interactions = detect_interactions(&snapshot.drugs);
        let worst = interactions
            .iter()
            .map(|interaction| interaction.severity.weight())
            .fold(0.0, f64::max);
        let bio = &snapshot.biology;

        vec![
            FieldSpec::new(INTERACTIONS, "#e11d48", t.interactions)
                .signal(
                    0.50,
                    Signal::read(
                        "Interacting pairs",
                        tally(interactions.len()),
                        "n",
                        &t.interaction_pairs,
                    ),
                )
                .signal(
                    0.50,
                    Signal::read("Worst severity", Some(worst), "grade", &t.interaction_severity),
                )
                .describe([
                    "No relevant interaction",
                    "Minor interactions",
                    "Clinically significant interactions",
                    "Dangerous combination",
                ]),
            FieldSpec::new(CLEARANCE, "#0ea5e9", t.clearance)
                .signal(0.35, Signal::read("ALT", bio.alt, "U/L", &r.alt))
                .signal(0.35, Signal::read("Creatinine", bio.creatinine, "µmol/L", &r.creatinine))
                .signal(0.30, Signal::read("Ammonia", bio.ammonia, "µmol/L", &r.ammonia)),
            FieldSpec::new(EXPOSURE, "#a855f7", t.exposure)
                .signal(
                    0.40,
                    Signal::read(
                        "Dose / ceiling",
                        overdose_ratio(&snapshot.drugs),
                        "ratio",
                        &t.overdose_ratio,
                    ),
                )
                .signal(
                    0.30,
                    Signal::read(
                        "Doses over ceiling",
                        tally(dose_adjustments(&snapshot.drugs).len()),
                        "n",
                        &t.doses_over_ceiling,
                    ),
                )
                .signal(
                    0.30,
                    Signal::read("Active drugs", tally(snapshot.drugs.len()), "n", &t.active_drugs),
                ),
        ]
    }

    fn patterns(&self, snapshot: &PatientSnapshot) -> Vec<PatternSpec> {
        let bio = &snapshot.biology;
        let hepatotoxic = snapshot
            .drugs
            .iter()
            .any(|order| identify(&order.name).is_some_and(|profile| profile.hepatotoxic));
        let monitored = snapshot
            .drugs
            .iter()
            .any(|order| identify(&order.name).is_some_and(|profile| profile.monitored));
        let valproate = takes(snapshot, "valproate");

        vec![
            PatternSpec::new(
                "Hepatotoxic exposure",
                "Hepatotoxic drugs given to a patient with hepatic injury",
                0.5,
            )
            .criterion(Criterion::when("Hepatotoxic drug", 2.0, hepatotoxic))
            .criterion(Criterion::when("ALT > 80 U/L", 2.0, bio.alt.is_some_and(|v| v > 80.0)))
            .criterion(Criterion::when(
                "Known hepatic disease",
                1.0,
                snapshot.comorbidities.hepatic_disease,
            ))
            .implies("Monitor liver tests daily and consider a non-hepatotoxic alternative"),
            PatternSpec::new(
                "Hyperammonemia risk",
                "Valproate-associated hyperammonemic encephalopathy",
                0.5,
            )
            .criterion(Criterion::when("Valproate", 2.0, valproate))
            .criterion(Criterion::when(
                "Ammonia > 80 µmol/L",
                2.0,
                bio.ammonia.is_some_and(|v| v > 80.0),
            ))
            .criterion(Criterion::when(
                "Topiramate co-prescription or age < 24 months",
                1.0,
                takes(snapshot, "topiramate") || snapshot.age_months < 24,
            ))
            .implies("Check ammonia and consider L-carnitine supplementation"),
            PatternSpec::new("Polypharmacy", "Many concurrent drugs with cumulative risk", 0.5)
                .criterion(Criterion::when("≥5 active drugs", 2.0, snapshot.drugs.len() >= 5))
                .criterion(Criterion::when(
                    "Known interaction",
                    1.0,
                    !detect_interactions(&snapshot.drugs).is_empty(),
                ))
                .criterion(Criterion::when("Drug requiring monitoring", 1.0, monitored))
                .implies("Rationalize the prescription list"),
        ]
    }

    fn context(
        &self,
        snapshot: &PatientSnapshot,
        _intention: &Intention,
        prior: PriorResults<'_>,
    ) -> Context {
        let therapeutic = prior.score(EngineKind::TherapeuticDecision).unwrap_or(0);
        let comorbidities = &snapshot.comorbidities;
        let interactions = detect_interactions(&snapshot.drugs);

        let mut builder = ContextBuilder::new();
        builder
            .apply(
                therapeutic >= 50,
                1.1,
                ContextKind::Dependency,
                "arrow-up",
                "Escalating treatment",
                format!("Therapeutic decision score {therapeutic}"),
            )
            .apply(
                comorbidities.hepatic_disease,
                1.25,
                ContextKind::Comorbidity,
                "liver",
                "Hepatic disease",
                "Reduced hepatic clearance",
            )
            .apply(
                comorbidities.renal_disease,
                1.2,
                ContextKind::Comorbidity,
                "kidney",
                "Renal disease",
                "Reduced renal clearance",
            )
            .apply(
                !interactions.is_empty(),
                1.1,
                ContextKind::Interaction,
                "link",
                "Detected interactions",
                format!("{} interacting pair(s) on the prescription", interactions.len()),
            )
            .apply(
                snapshot.age_months < 24 && takes(snapshot, "valproate"),
                1.15,
                ContextKind::Demographic,
                "baby",
                "Valproate before 2 years",
                "Higher risk of valproate hepatotoxicity",
            );
        builder.finish()
    }

    fn rules(&self) -> &'static [Rule] {
        RULES
    }
}

const RULES: &[Rule] = &[
    Rule {
        name: "Critical drug interaction",
        kind: RuleKind::Guard,
        reference: "Stockley's Drug Interactions, 12th ed. 2019",
        trigger: critical_interaction,
    },
    Rule {
        name: "Valproate in infant with hepatic injury",
        kind: RuleKind::Guard,
        reference: "Star K et al. Pediatrics 2014;133:e1136-45",
        trigger: valproate_infant_hepatic,
    },
    Rule {
        name: "Moderate drug interaction",
        kind: RuleKind::Correction,
        reference: "Stockley's Drug Interactions, 12th ed. 2019",
        trigger: moderate_interaction,
    },
    Rule {
        name: "Dose above ceiling",
        kind: RuleKind::Correction,
        reference: "BNF for Children 2023",
        trigger: dose_above_ceiling,
    },
    Rule {
        name: "Therapeutic drug monitoring",
        kind: RuleKind::Informational,
        reference: "Patsalos PN et al. Epilepsia 2008;49:1239-76",
        trigger: drug_monitoring,
    },
];

fn critical_interaction(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    let critical: Vec<_> = detect_interactions(&input.snapshot.drugs)
        .into_iter()
        .filter(|interaction| interaction.severity == InteractionSeverity::Critical)
        .collect();
    if critical.is_empty() {
        return Ok(None);
    }
    let pairs = critical
        .iter()
        .map(|interaction| format!("{} + {}", interaction.drugs[0], interaction.drugs[1]))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(Some(
        Firing::new(format!("Contraindicated combination: {pairs}"))
            .with_floor(90)
            .with(RuleAdjustment::Interactions(critical)),
    ))
}

fn valproate_infant_hepatic(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    let snapshot = input.snapshot;
    let alt = snapshot.biology.alt.unwrap_or(0.0);
    let applies = snapshot.age_months < 24 && alt > 120.0 && takes(snapshot, "valproate");
    Ok(applies.then(|| {
        Firing::new(format!(
            "Valproate at {} months with ALT {alt:.0} U/L: stop valproate and screen for POLG",
            snapshot.age_months
        ))
        .with_floor(85)
    }))
}

fn moderate_interaction(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    let moderate: Vec<_> = detect_interactions(&input.snapshot.drugs)
        .into_iter()
        .filter(|interaction| interaction.severity == InteractionSeverity::Moderate)
        .collect();
    if moderate.is_empty() {
        return Ok(None);
    }
    Ok(Some(
        Firing::new(format!("{} moderate interaction(s) need dose or level monitoring", moderate.len()))
            .with(RuleAdjustment::FieldShift {
                field: INTERACTIONS,
                delta: 10.0,
            })
            .with(RuleAdjustment::Interactions(moderate)),
    ))
}

fn dose_above_ceiling(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    let adjustments = dose_adjustments(&input.snapshot.drugs);
    if adjustments.is_empty() {
        return Ok(None);
    }
    let drugs = adjustments
        .iter()
        .map(|adjustment| adjustment.drug.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Ok(Some(
        Firing::new(format!("Dose above the daily ceiling: {drugs}"))
            .with(RuleAdjustment::FieldShift {
                field: EXPOSURE,
                delta: 10.0,
            })
            .with(RuleAdjustment::DoseAdjustments(adjustments)),
    ))
}

fn drug_monitoring(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    let monitored: Vec<&str> = input
        .snapshot
        .drugs
        .iter()
        .filter(|order| identify(&order.name).is_some_and(|profile| profile.monitored))
        .map(|order| order.name.as_str())
        .collect();
    if monitored.is_empty() {
        return Ok(None);
    }
    Ok(Some(Firing::new(format!(
        "Check trough levels: {}",
        monitored.join(", ")
    ))))
}
