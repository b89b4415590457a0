//! Therapeutic-prospection engine: which targeted or next-line therapies the case
//! points towards.

use super::knowledge::{summarize, TherapyLine};
use super::{count, tally};
use crate::config::{ProspectionTables, SignalRanges};
use crate::error::EvaluationFault;
use crate::patient::{AntibodyResult, PatientSnapshot};
use crate::scoring::{
    Context, ContextBuilder, ContextKind, Criterion, Engine, EngineKind, FieldSpec, Firing,
    Intention, PatternSpec, PriorResults, Rule, RuleAdjustment, RuleInput, RuleKind, Signal,
    SynthesisProfile, TherapeuticOption,
};

pub const REFRACTORINESS: &str = "Refractoriness";
pub const INFLAMMATORY_TARGET: &str = "Inflammatory target";
pub const DISEASE_MARKERS: &str = "Disease-specific markers";

pub struct TherapeuticProspectionEngine<'t> {
    ranges: &'t SignalRanges,
    tables: &'t ProspectionTables,
}

impl<'t> TherapeuticProspectionEngine<'t> {
    pub fn new(ranges: &'t SignalRanges, tables: &'t ProspectionTables) -> Self {
        Self { ranges, tables }
    }
}

impl Engine for TherapeuticProspectionEngine<'_> {
    fn kind(&self) -> EngineKind {
        EngineKind::TherapeuticProspection
    }

    fn profile(&self) -> SynthesisProfile {
        SynthesisProfile {
            engine: EngineKind::TherapeuticProspection,
            levels: ["CONSOLIDÉ", "EXPLORATOIRE", "PROSPECTIF", "RUPTURE"],
            critical_advice: (
                "Expert centre referral",
                "Standard lines are exhausted: discuss off-label targeted therapy with a reference centre",
            ),
        }
    }

    fn fields(&self, snapshot: &PatientSnapshot) -> Vec<FieldSpec> {
        let r = self.ranges;
        let t = self.tables;
        let treatments = summarize(&snapshot.treatment_history);
        let cytokines = snapshot.cytokines.clone().unwrap_or_default();
        let pims = snapshot.pims.clone().unwrap_or_default();
        let mogad = snapshot.mogad.as_ref();

        vec![
            FieldSpec::new(REFRACTORINESS, "#dc2626", t.refractoriness)
                .signal(
                    0.60,
                    Signal::read("Failed lines", tally(treatments.failed), "n", &t.failed_lines),
                )
                .signal(
                    0.40,
                    Signal::read(
                        "Seizures (24h)",
                        count(snapshot.neuro.seizures_24h),
                        "n",
                        &r.seizures_24h,
                    ),
                ),
            FieldSpec::new(INFLAMMATORY_TARGET, "#f97316", t.inflammatory_target)
                .signal(0.35, Signal::read("IL-6", cytokines.il6, "pg/mL", &r.il6))
                .signal(0.25, Signal::read("IL-1β", cytokines.il1b, "pg/mL", &r.il1b))
                .signal(0.15, Signal::read("TNF-α", cytokines.tnf_alpha, "pg/mL", &r.tnf_alpha))
                .signal(0.25, Signal::read("Ferritin", snapshot.biology.ferritin, "ng/mL", &r.ferritin))
                .describe([
                    "No actionable cytokine target",
                    "Possible cytokine target",
                    "Probable cytokine target",
                    "Dominant cytokine target",
                ]),
            FieldSpec::new(DISEASE_MARKERS, "#0d9488", t.disease_markers)
                .signal(0.20, Signal::read("Troponin", pims.troponin, "ng/L", &r.troponin))
                .signal(0.20, Signal::read("NT-proBNP", pims.nt_pro_bnp, "ng/L", &r.nt_pro_bnp))
                .signal(
                    0.20,
                    Signal::read("LVEF", pims.ejection_fraction, "%", &r.ejection_fraction),
                )
                .signal(
                    0.25,
                    Signal::read("MOG titer", mogad.and_then(|m| m.mog_titer), "1/x", &r.mog_titer),
                )
                .signal(
                    0.15,
                    Signal::read(
                        "Demyelinating lesions",
                        mogad.map(|m| f64::from(m.demyelinating_lesions)),
                        "n",
                        &t.demyelinating_lesions,
                    ),
                ),
        ]
    }

    fn patterns(&self, snapshot: &PatientSnapshot) -> Vec<PatternSpec> {
        let treatments = summarize(&snapshot.treatment_history);
        let cytokines = snapshot.cytokines.clone().unwrap_or_default();
        let pims = snapshot.pims.clone().unwrap_or_default();
        let mogad = snapshot.mogad.clone().unwrap_or_default();

        vec![
            PatternSpec::new(
                "IL-1 blockade candidate",
                "Refractory febrile status with an IL-1 driven profile",
                0.5,
            )
            .criterion(Criterion::when(
                "Refractory status",
                2.0,
                snapshot.neuro.seizure_type.is_refractory(),
            ))
            .criterion(Criterion::when(
                "First-line failure",
                2.0,
                treatments.first_line_failed,
            ))
            .criterion(Criterion::when(
                "Negative antibodies",
                1.0,
                snapshot.csf.antibodies == AntibodyResult::Negative,
            ))
            .criterion(Criterion::when(
                "IL-1β > 5",
                1.0,
                cytokines.il1b.is_some_and(|v| v > 5.0),
            ))
            .implies("Anakinra 5 to 10 mg/kg/day"),
            PatternSpec::new(
                "IL-6 blockade candidate",
                "IL-6 dominated inflammation after first-line therapy",
                0.5,
            )
            .criterion(Criterion::when("IL-6 > 50", 3.0, cytokines.il6.is_some_and(|v| v > 50.0)))
            .criterion(Criterion::when(
                "First-line failure",
                1.0,
                treatments.first_line_failed,
            ))
            .criterion(Criterion::when(
                "CRP > 50",
                1.0,
                snapshot.biology.crp.is_some_and(|v| v > 50.0),
            ))
            .implies("Tocilizumab 8 to 12 mg/kg"),
            PatternSpec::new(
                "MOGAD relapse prevention",
                "MOG antibody-associated disease at risk of relapse",
                0.5,
            )
            .criterion(Criterion::when(
                "MOG titer positive",
                3.0,
                mogad.mog_titer.is_some_and(|v| v > 10.0),
            ))
            .criterion(Criterion::when("Optic neuritis", 1.0, mogad.optic_neuritis))
            .criterion(Criterion::when(
                "Demyelinating lesions",
                1.0,
                mogad.demyelinating_lesions >= 1,
            ))
            .implies("Discuss maintenance IVIG or steroid taper over several months"),
            PatternSpec::new(
                "PIMS cardiac involvement",
                "Paediatric inflammatory multisystem syndrome with myocardial injury",
                0.5,
            )
            .criterion(Criterion::when(
                "Troponin raised",
                2.0,
                pims.troponin.is_some_and(|v| v > 14.0),
            ))
            .criterion(Criterion::when(
                "NT-proBNP raised",
                2.0,
                pims.nt_pro_bnp.is_some_and(|v| v > 300.0),
            ))
            .criterion(Criterion::when(
                "LVEF < 55%",
                2.0,
                pims.ejection_fraction.is_some_and(|v| v < 55.0),
            ))
            .implies("Cardiology review and IVIG with corticosteroids"),
        ]
    }

    fn context(
        &self,
        _snapshot: &PatientSnapshot,
        _intention: &Intention,
        prior: PriorResults<'_>,
    ) -> Context {
        let therapeutic = prior.score(EngineKind::TherapeuticDecision).unwrap_or(0);
        let warning = prior.score(EngineKind::EarlyWarning).unwrap_or(0);
        let vital = prior.score(EngineKind::VitalPrognosis).unwrap_or(0);

        let mut builder = ContextBuilder::new();
        builder
            .apply(
                therapeutic >= 75,
                1.25,
                ContextKind::Dependency,
                "arrow-up",
                "Urgent escalation pending",
                format!("Therapeutic decision score {therapeutic}"),
            )
            .apply(
                warning >= 50,
                1.1,
                ContextKind::Dependency,
                "bell",
                "Active early warning",
                format!("Early warning score {warning}"),
            )
            .apply(
                vital >= 75,
                1.1,
                ContextKind::Dependency,
                "heartbeat",
                "Critical vital prognosis",
                format!("Vital prognosis score {vital}"),
            );
        builder.finish()
    }

    fn rules(&self) -> &'static [Rule] {
        RULES
    }
}

const RULES: &[Rule] = &[
    Rule {
        name: "Multi-line refractory disease",
        kind: RuleKind::Guard,
        reference: "Wickström R et al. Epilepsia 2022;63:2827-39",
        trigger: multi_line_refractory,
    },
    Rule {
        name: "Cytokine-directed target",
        kind: RuleKind::Correction,
        reference: "Jun JS et al. Ann Neurol 2018;84:940-5",
        trigger: cytokine_directed_target,
    },
    Rule {
        name: "Ketogenic diet trial",
        kind: RuleKind::Informational,
        reference: "Peng P et al. Epilepsia 2019;60:2093-102",
        trigger: ketogenic_trial,
    },
    Rule {
        name: "MOGAD maintenance",
        kind: RuleKind::Informational,
        reference: "Banwell B et al. Lancet Neurol 2023;22:268-82",
        trigger: mogad_maintenance,
    },
];

fn multi_line_refractory(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    let treatments = summarize(&input.snapshot.treatment_history);
    if treatments.failed < 3 {
        return Ok(None);
    }
    let mut options = Vec::new();
    if !treatments.targeted_tried {
        options.push(TherapeuticOption {
            therapy: "Anakinra",
            line: TherapyLine::TargetedCytokine,
            rationale: "IL-1 blockade when three lines have failed",
        });
    }
    if !treatments.second_line_tried {
        options.push(TherapeuticOption {
            therapy: "Cyclophosphamide",
            line: TherapyLine::SecondLineImmunotherapy,
            rationale: "Broad immunosuppression for refractory autoimmune disease",
        });
    }
    if !treatments.ketogenic_tried {
        options.push(TherapeuticOption {
            therapy: "Ketogenic diet",
            line: TherapyLine::KetogenicDiet,
            rationale: "Non-pharmacological option in refractory status",
        });
    }

    let firing = Firing::new(format!(
        "{} treatment lines without response: discuss with a reference centre",
        treatments.failed
    ))
    .with_floor(80);
    Ok(Some(if options.is_empty() {
        firing
    } else {
        firing.with(RuleAdjustment::TherapeuticOptions(options))
    }))
}

fn cytokine_directed_target(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    let il6 = input.snapshot.cytokines.as_ref().and_then(|panel| panel.il6);
    Ok(il6.filter(|value| *value > 50.0).map(|value| {
        Firing::new(format!("IL-6 at {value:.0} pg/mL is a candidate therapeutic target"))
            .with(RuleAdjustment::FieldShift {
                field: INFLAMMATORY_TARGET,
                delta: 10.0,
            })
            .with(RuleAdjustment::TherapeuticOptions(vec![TherapeuticOption {
                therapy: "Tocilizumab",
                line: TherapyLine::TargetedCytokine,
                rationale: "IL-6 receptor blockade",
            }]))
    }))
}

fn ketogenic_trial(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    let treatments = summarize(&input.snapshot.treatment_history);
    let refractory = input.snapshot.neuro.seizure_type.is_refractory() || treatments.failed >= 2;
    Ok((refractory && !treatments.ketogenic_tried).then(|| {
        Firing::new("Ketogenic diet not yet tried in a refractory course")
    }))
}

fn mogad_maintenance(input: &RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault> {
    let titer = input.snapshot.mogad.as_ref().and_then(|mogad| mogad.mog_titer);
    Ok(titer.filter(|value| *value > 10.0).map(|value| {
        Firing::new(format!(
            "MOG titer 1/{value:.0}: plan relapse prevention and repeat titer at 6 months"
        ))
    }))
}
