use crate::patient::{TreatmentCourse, TreatmentResponse};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TherapyLine {
    FirstLineImmunotherapy,
    SecondLineImmunotherapy,
    TargetedCytokine,
    KetogenicDiet,
    AntiSeizure,
    Other,
}

impl TherapyLine {
    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstLineImmunotherapy => "First-line immunotherapy",
            Self::SecondLineImmunotherapy => "Second-line immunotherapy",
            Self::TargetedCytokine => "Targeted cytokine therapy",
            Self::KetogenicDiet => "Ketogenic diet",
            Self::AntiSeizure => "Anti-seizure medication",
            Self::Other => "Other",
        }
    }
}

const LINES: &[(TherapyLine, &[&str])] = &[
    (
        TherapyLine::FirstLineImmunotherapy,
        &[
            "cortico",
            "methylpred",
            "solumedrol",
            "solu-medrol",
            "dexamethasone",
            "prednis",
            "ivig",
            "immunoglobulin",
            "plasma exchange",
            "plasmapheresis",
        ],
    ),
    (
        TherapyLine::SecondLineImmunotherapy,
        &["rituximab", "cyclophosphamide", "bortezomib"],
    ),
    (
        TherapyLine::TargetedCytokine,
        &["anakinra", "tocilizumab", "kineret", "jak", "ruxolitinib"],
    ),
    (TherapyLine::KetogenicDiet, &["ketogenic", "keto diet"]),
    (
        TherapyLine::AntiSeizure,
        &[
            "valpro",
            "levetiracetam",
            "phenobarb",
            "phenytoin",
            "midazolam",
            "ketamine",
            "thiopental",
            "propofol",
            "lacosamide",
            "clobazam",
            "topiramate",
        ],
    ),
];

pub fn classify(treatment: &str) -> TherapyLine {
    let lowered = treatment.trim().to_lowercase();
    LINES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map(|(line, _)| *line)
        .unwrap_or(TherapyLine::Other)
}

/// Response counts over the treatment history, split by therapy line where it matters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreatmentSummary {
    pub failed: usize,
    pub partial: usize,
    pub responded: usize,
    pub first_line_tried: bool,
    pub first_line_failed: bool,
    pub second_line_tried: bool,
    pub targeted_tried: bool,
    pub ketogenic_tried: bool,
}

pub fn summarize(history: &[TreatmentCourse]) -> TreatmentSummary {
    let mut summary = TreatmentSummary::default();
    for course in history {
        let line = classify(&course.treatment);
        match course.response {
            TreatmentResponse::None => summary.failed += 1,
            TreatmentResponse::Partial => summary.partial += 1,
            TreatmentResponse::Good | TreatmentResponse::Complete => summary.responded += 1,
        }
        match line {
            TherapyLine::FirstLineImmunotherapy => {
                summary.first_line_tried = true;
                if course.response == TreatmentResponse::None {
                    summary.first_line_failed = true;
                }
            }
            TherapyLine::SecondLineImmunotherapy => summary.second_line_tried = true,
            TherapyLine::TargetedCytokine => summary.targeted_tried = true,
            TherapyLine::KetogenicDiet => summary.ketogenic_tried = true,
            TherapyLine::AntiSeizure | TherapyLine::Other => {}
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(treatment: &str, response: TreatmentResponse) -> TreatmentCourse {
        TreatmentCourse {
            treatment: treatment.to_string(),
            period: "D1-D3".to_string(),
            response,
        }
    }

    #[test]
    fn classifies_common_regimens() {
        assert_eq!(classify("Methylprednisolone pulses"), TherapyLine::FirstLineImmunotherapy);
        assert_eq!(classify("IVIG 2 g/kg"), TherapyLine::FirstLineImmunotherapy);
        assert_eq!(classify("Rituximab"), TherapyLine::SecondLineImmunotherapy);
        assert_eq!(classify("Anakinra"), TherapyLine::TargetedCytokine);
        assert_eq!(classify("Ketogenic diet 4:1"), TherapyLine::KetogenicDiet);
        assert_eq!(classify("Midazolam infusion"), TherapyLine::AntiSeizure);
        assert_eq!(classify("Physiotherapy"), TherapyLine::Other);
    }

    #[test]
    fn summary_counts_responses_and_lines() {
        let history = vec![
            course("Methylprednisolone", TreatmentResponse::None),
            course("IVIG", TreatmentResponse::Partial),
            course("Anakinra", TreatmentResponse::Good),
        ];
        let summary = summarize(&history);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.partial, 1);
        assert_eq!(summary.responded, 1);
        assert!(summary.first_line_failed);
        assert!(summary.targeted_tried);
        assert!(!summary.second_line_tried);
    }
}
