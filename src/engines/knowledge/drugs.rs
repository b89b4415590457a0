use crate::patient::DrugOrder;
use crate::scoring::{DetectedInteraction, DoseAdjustment};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionSeverity {
    Minor,
    Moderate,
    Critical,
}

impl InteractionSeverity {
    pub const fn weight(self) -> f64 {
        match self {
            Self::Minor => 1.0,
            Self::Moderate => 2.0,
            Self::Critical => 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrugProfile {
    pub key: &'static str,
    pub aliases: &'static [&'static str],
    /// Daily ceiling in mg/kg/day, when one applies.
    pub max_mg_kg_day: Option<f64>,
    /// Requires therapeutic drug monitoring.
    pub monitored: bool,
    pub hepatotoxic: bool,
}

const fn drug(
    key: &'static str,
    aliases: &'static [&'static str],
    max_mg_kg_day: Option<f64>,
    monitored: bool,
    hepatotoxic: bool,
) -> DrugProfile {
    DrugProfile {
        key,
        aliases,
        max_mg_kg_day,
        monitored,
        hepatotoxic,
    }
}

const DRUGS: &[DrugProfile] = &[
    drug("valproate", &["valpro", "depakine", "depakote"], Some(60.0), true, true),
    drug("levetiracetam", &["levetiracetam", "keppra"], Some(60.0), false, false),
    drug("phenobarbital", &["phenobarb", "gardenal"], Some(20.0), true, false),
    drug("phenytoin", &["phenytoin", "dilantin"], Some(20.0), true, false),
    drug("carbamazepine", &["carbamazepine", "tegretol"], Some(35.0), true, false),
    drug("topiramate", &["topiramate", "topamax", "epitomax"], Some(9.0), false, false),
    drug("acetazolamide", &["acetazolamide", "diamox"], Some(30.0), false, false),
    drug("midazolam", &["midazolam", "hypnovel"], None, false, false),
    drug("ketamine", &["ketamine"], None, false, false),
    drug("methylprednisolone", &["methylpred", "solumedrol", "solu-medrol"], Some(30.0), false, false),
    drug("ivig", &["ivig", "immunoglobulin"], Some(2000.0), false, false),
    drug("rituximab", &["rituximab"], None, false, false),
    drug("tocilizumab", &["tocilizumab"], Some(12.0), false, false),
    drug("anakinra", &["anakinra", "kineret"], Some(10.0), false, false),
    drug("meropenem", &["meropenem"], Some(120.0), false, false),
    drug("fluconazole", &["fluconazole"], Some(12.0), false, false),
    drug("clarithromycin", &["clarithromycin"], Some(15.0), false, false),
    drug("acyclovir", &["acyclovir", "aciclovir"], Some(60.0), false, false),
    drug("vancomycin", &["vancomycin"], Some(60.0), true, false),
    drug("paracetamol", &["paracetamol", "acetaminophen"], Some(75.0), false, true),
];

struct InteractionEntry {
    pair: (&'static str, &'static str),
    severity: InteractionSeverity,
    mechanism: &'static str,
    action: &'static str,
    reference: &'static str,
}

const INTERACTIONS: &[InteractionEntry] = &[
    InteractionEntry {
        pair: ("valproate", "meropenem"),
        severity: InteractionSeverity::Critical,
        mechanism: "Carbapenems collapse valproate serum levels within 24 hours",
        action: "Avoid the combination; switch antibiotic or anti-seizure medication",
        reference: "Mancl EE, Gidal BE. Ann Pharmacother 2009;43:2082-7",
    },
    InteractionEntry {
        pair: ("carbamazepine", "clarithromycin"),
        severity: InteractionSeverity::Critical,
        mechanism: "CYP3A4 inhibition raises carbamazepine to toxic levels",
        action: "Use a non-macrolide antibiotic or monitor carbamazepine daily",
        reference: "Patsalos PN. Epilepsia 2013;54:1-25",
    },
    InteractionEntry {
        pair: ("tocilizumab", "anakinra"),
        severity: InteractionSeverity::Critical,
        mechanism: "Combined cytokine blockade with compounded infection risk",
        action: "Do not combine biologics; sequence with a washout period",
        reference: "Lai YC et al. Ann Clin Transl Neurol 2020;7:2467-74",
    },
    InteractionEntry {
        pair: ("valproate", "phenobarbital"),
        severity: InteractionSeverity::Moderate,
        mechanism: "Valproate inhibits phenobarbital clearance; additive hyperammonemia",
        action: "Monitor phenobarbital levels and ammonia",
        reference: "Patsalos PN. Epilepsia 2013;54:1-25",
    },
    InteractionEntry {
        pair: ("valproate", "topiramate"),
        severity: InteractionSeverity::Moderate,
        mechanism: "Hyperammonemic encephalopathy with combined use",
        action: "Check ammonia on any unexplained change in consciousness",
        reference: "Noh Y et al. Epilepsy Res 2013;104:143-8",
    },
    InteractionEntry {
        pair: ("valproate", "carbamazepine"),
        severity: InteractionSeverity::Moderate,
        mechanism: "Accumulation of carbamazepine epoxide",
        action: "Monitor for carbamazepine toxicity",
        reference: "Patsalos PN. Epilepsia 2013;54:1-25",
    },
    InteractionEntry {
        pair: ("valproate", "phenytoin"),
        severity: InteractionSeverity::Moderate,
        mechanism: "Protein-binding displacement raises free phenytoin",
        action: "Measure free phenytoin rather than total level",
        reference: "Patsalos PN. Epilepsia 2013;54:1-25",
    },
    InteractionEntry {
        pair: ("midazolam", "fluconazole"),
        severity: InteractionSeverity::Moderate,
        mechanism: "CYP3A4 inhibition prolongs midazolam sedation",
        action: "Reduce infusion rate and reassess sedation depth",
        reference: "Olkkola KT et al. Anesth Analg 1996;82:511-6",
    },
    InteractionEntry {
        pair: ("midazolam", "clarithromycin"),
        severity: InteractionSeverity::Moderate,
        mechanism: "CYP3A4 inhibition prolongs midazolam sedation",
        action: "Reduce infusion rate and reassess sedation depth",
        reference: "Gorski JC et al. Clin Pharmacol Ther 1998;64:133-43",
    },
    InteractionEntry {
        pair: ("phenobarbital", "midazolam"),
        severity: InteractionSeverity::Moderate,
        mechanism: "Additive respiratory depression",
        action: "Continuous respiratory monitoring; airway readiness",
        reference: "Glauser T et al. Epilepsy Curr 2016;16:48-61",
    },
    InteractionEntry {
        pair: ("topiramate", "acetazolamide"),
        severity: InteractionSeverity::Moderate,
        mechanism: "Additive metabolic acidosis and nephrolithiasis",
        action: "Monitor bicarbonate; avoid under ketogenic diet",
        reference: "Kossoff EH et al. Epilepsia Open 2018;3:175-92",
    },
    InteractionEntry {
        pair: ("phenytoin", "fluconazole"),
        severity: InteractionSeverity::Moderate,
        mechanism: "CYP2C9 inhibition raises phenytoin levels",
        action: "Monitor phenytoin level within 48 hours",
        reference: "Patsalos PN. Epilepsia 2013;54:1-25",
    },
    InteractionEntry {
        pair: ("vancomycin", "acyclovir"),
        severity: InteractionSeverity::Moderate,
        mechanism: "Additive nephrotoxicity",
        action: "Daily creatinine; adjust to renal function",
        reference: "Downes KJ et al. Clin Infect Dis 2017;64:1-8",
    },
    InteractionEntry {
        pair: ("valproate", "paracetamol"),
        severity: InteractionSeverity::Minor,
        mechanism: "Additive hepatotoxic load",
        action: "Keep paracetamol at the lowest effective dose",
        reference: "Star K et al. Drug Saf 2014;37:1037-45",
    },
];

/// Match a prescribed name against the known drug profiles.
pub fn identify(name: &str) -> Option<&'static DrugProfile> {
    let lowered = name.trim().to_lowercase();
    DRUGS.iter().find(|profile| {
        lowered.contains(profile.key) || profile.aliases.iter().any(|alias| lowered.contains(alias))
    })
}

fn lookup(a: &str, b: &str) -> Option<&'static InteractionEntry> {
    INTERACTIONS
        .iter()
        .find(|entry| entry.pair == (a, b) || entry.pair == (b, a))
}

/// Every known interacting pair among the active drugs, worst first.
pub fn detect_interactions(drugs: &[DrugOrder]) -> Vec<DetectedInteraction> {
    let identified: Vec<(&DrugOrder, &'static DrugProfile)> = drugs
        .iter()
        .filter_map(|order| identify(&order.name).map(|profile| (order, profile)))
        .collect();

    let mut seen: BTreeSet<(&'static str, &'static str)> = BTreeSet::new();
    let mut found = Vec::new();
    for (idx, (order_a, profile_a)) in identified.iter().enumerate() {
        for (order_b, profile_b) in identified.iter().skip(idx + 1) {
            if profile_a.key == profile_b.key {
                continue;
            }
            let Some(entry) = lookup(profile_a.key, profile_b.key) else {
                continue;
            };
            if !seen.insert(entry.pair) {
                continue;
            }
            found.push(DetectedInteraction {
                drugs: [order_a.name.clone(), order_b.name.clone()],
                severity: entry.severity,
                mechanism: entry.mechanism,
                action: entry.action,
                reference: entry.reference,
            });
        }
    }

    found.sort_by(|a, b| b.severity.cmp(&a.severity));
    found
}

/// Prescriptions whose daily dose exceeds the known ceiling.
pub fn dose_adjustments(drugs: &[DrugOrder]) -> Vec<DoseAdjustment> {
    drugs
        .iter()
        .filter_map(|order| {
            let dose = order.dose_mg_kg_day?;
            let ceiling = identify(&order.name)?.max_mg_kg_day?;
            (dose > ceiling).then(|| DoseAdjustment {
                drug: order.name.clone(),
                prescribed_mg_kg_day: dose,
                ceiling_mg_kg_day: ceiling,
                suggestion: format!(
                    "Reduce {} to at most {ceiling} mg/kg/day (prescribed {dose})",
                    order.name
                ),
            })
        })
        .collect()
}

/// Largest prescribed-to-ceiling ratio among dosed drugs with a known ceiling.
pub fn overdose_ratio(drugs: &[DrugOrder]) -> Option<f64> {
    drugs
        .iter()
        .filter_map(|order| {
            let dose = order.dose_mg_kg_day?;
            let ceiling = identify(&order.name)?.max_mg_kg_day?;
            Some(dose / ceiling)
        })
        .max_by(f64::total_cmp)
}
