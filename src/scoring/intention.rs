use super::signal::{Signal, SignalStatus};
use super::EngineKind;
use crate::error::{EvaluationFault, PipelineError};
use serde::Serialize;

/// Declaration of one semantic field: its weighted member signals and status wording.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub color: &'static str,
    /// Share of this field in the engine's synthesis score.
    pub weight: f64,
    pub members: Vec<(f64, Signal)>,
    pub interpretations: Option<[&'static str; 4]>,
}

impl FieldSpec {
    pub fn new(name: &'static str, color: &'static str, weight: f64) -> Self {
        Self {
            name,
            color,
            weight,
            members: Vec::new(),
            interpretations: None,
        }
    }

    pub fn signal(mut self, weight: f64, signal: Signal) -> Self {
        self.members.push((weight, signal));
        self
    }

    /// Wording for the normal, moderate, warning and critical bands.
    pub fn describe(mut self, interpretations: [&'static str; 4]) -> Self {
        self.interpretations = Some(interpretations);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticField {
    pub name: &'static str,
    pub weight: f64,
    pub intensity: f64,
    pub color: &'static str,
    pub interpretation: String,
    pub signals: Vec<Signal>,
}

impl SemanticField {
    pub fn status(&self) -> SignalStatus {
        SignalStatus::from_intensity(self.intensity)
    }
}

/// One weighted piece of evidence for a pattern. `hit` is in 0..=1 so criteria can be fuzzy.
#[derive(Debug, Clone)]
pub struct Criterion {
    pub label: &'static str,
    pub weight: f64,
    pub hit: f64,
}

impl Criterion {
    pub fn when(label: &'static str, weight: f64, condition: bool) -> Self {
        Self {
            label,
            weight,
            hit: if condition { 1.0 } else { 0.0 },
        }
    }

    pub fn graded(label: &'static str, weight: f64, fraction: f64) -> Self {
        let hit = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { label, weight, hit }
    }
}

#[derive(Debug, Clone)]
pub struct PatternSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub implications: Vec<&'static str>,
    pub min_evidence: f64,
    pub criteria: Vec<Criterion>,
}

impl PatternSpec {
    pub fn new(name: &'static str, description: &'static str, min_evidence: f64) -> Self {
        Self {
            name,
            description,
            implications: Vec::new(),
            min_evidence,
            criteria: Vec::new(),
        }
    }

    pub fn implies(mut self, implication: &'static str) -> Self {
        self.implications.push(implication);
        self
    }

    pub fn criterion(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    pub name: &'static str,
    pub confidence: f64,
    pub description: &'static str,
    pub implications: Vec<&'static str>,
    pub evidence: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Intention {
    pub fields: Vec<SemanticField>,
    pub patterns: Vec<Pattern>,
}

impl Intention {
    pub fn field(&self, name: &str) -> Option<&SemanticField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn pattern(&self, name: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|pattern| pattern.name == name)
    }
}

/// Layer 1: fold signals into fields (declaration order) and score patterns
/// (descending confidence, ties keep declaration order).
pub fn aggregate(
    engine: EngineKind,
    fields: Vec<FieldSpec>,
    patterns: Vec<PatternSpec>,
) -> Result<Intention, PipelineError> {
    let fields = fields
        .into_iter()
        .map(|spec| aggregate_field(engine, spec))
        .collect::<Result<Vec<_>, _>>()?;

    let mut scored = Vec::with_capacity(patterns.len());
    for spec in patterns {
        if let Some(pattern) = score_pattern(engine, spec)? {
            scored.push(pattern);
        }
    }
    scored.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    Ok(Intention {
        fields,
        patterns: scored,
    })
}

fn aggregate_field(engine: EngineKind, spec: FieldSpec) -> Result<SemanticField, PipelineError> {
    check_weight(spec.weight).map_err(|source| PipelineError::Field {
        engine,
        field: spec.name.to_string(),
        source,
    })?;

    let mut weighted = 0.0;
    let mut total = 0.0;
    for (weight, signal) in &spec.members {
        check_weight(*weight).map_err(|source| PipelineError::Field {
            engine,
            field: spec.name.to_string(),
            source,
        })?;
        weighted += weight * signal.normalized;
        total += weight;
    }

    let intensity = if total > 0.0 {
        (weighted / total).clamp(0.0, 100.0)
    } else {
        0.0
    };
    let status = SignalStatus::from_intensity(intensity);
    let interpretation = match spec.interpretations {
        Some(wording) => wording[status.index()].to_string(),
        None => format!("{} {}", status.label(), spec.name.to_lowercase()),
    };

    Ok(SemanticField {
        name: spec.name,
        weight: spec.weight,
        intensity,
        color: spec.color,
        interpretation,
        signals: spec.members.into_iter().map(|(_, signal)| signal).collect(),
    })
}

fn score_pattern(engine: EngineKind, spec: PatternSpec) -> Result<Option<Pattern>, PipelineError> {
    let mut hits = 0.0;
    let mut total = 0.0;
    let mut evidence = Vec::new();
    for criterion in &spec.criteria {
        check_weight(criterion.weight).map_err(|source| PipelineError::Pattern {
            engine,
            pattern: spec.name.to_string(),
            source,
        })?;
        hits += criterion.weight * criterion.hit;
        total += criterion.weight;
        if criterion.hit > 0.0 {
            evidence.push(criterion.label);
        }
    }

    if total <= 0.0 {
        return Err(PipelineError::Pattern {
            engine,
            pattern: spec.name.to_string(),
            source: EvaluationFault::EmptyPattern,
        });
    }

    let confidence = (hits / total).min(1.0);
    if confidence < spec.min_evidence || confidence <= 0.0 {
        return Ok(None);
    }

    Ok(Some(Pattern {
        name: spec.name,
        confidence,
        description: spec.description,
        implications: spec.implications,
        evidence,
    }))
}

fn check_weight(weight: f64) -> Result<(), EvaluationFault> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(EvaluationFault::InvalidWeight(weight))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::signal::ReferenceRange;

    const CRP: ReferenceRange = ReferenceRange::higher_is_worse(5.0, 205.0);

    fn crp(value: Option<f64>) -> Signal {
        Signal::read("CRP", value, "mg/L", &CRP)
    }

    #[test]
    fn field_intensity_is_the_weighted_mean_of_its_signals() {
        let spec = FieldSpec::new("Inflammation", "#f97316", 1.0)
            .signal(0.75, crp(Some(105.0)))
            .signal(0.25, crp(None));

        let intention = aggregate(EngineKind::VitalPrognosis, vec![spec], Vec::new())
            .expect("aggregates");

        let field = &intention.fields[0];
        assert!((field.intensity - 37.5).abs() < 1e-9);
        assert_eq!(field.status(), SignalStatus::Moderate);
        assert_eq!(field.signals.len(), 2);
    }

    #[test]
    fn fields_without_data_keep_their_slot_at_zero() {
        let specs = vec![
            FieldSpec::new("First", "#000", 0.5).signal(1.0, crp(None)),
            FieldSpec::new("Empty", "#000", 0.5),
        ];
        let intention = aggregate(EngineKind::TherapeuticProspection, specs, Vec::new())
            .expect("aggregates");
        assert_eq!(intention.fields.len(), 2);
        assert_eq!(intention.fields[1].name, "Empty");
        assert_eq!(intention.fields[1].intensity, 0.0);
    }

    #[test]
    fn patterns_sort_by_confidence_with_stable_ties() {
        let patterns = vec![
            PatternSpec::new("Half", "", 0.1)
                .criterion(Criterion::when("a", 1.0, true))
                .criterion(Criterion::when("b", 1.0, false)),
            PatternSpec::new("Full", "", 0.1).criterion(Criterion::when("a", 2.0, true)),
            PatternSpec::new("Also half", "", 0.1)
                .criterion(Criterion::graded("a", 1.0, 0.5)),
            PatternSpec::new("Below evidence", "", 0.9)
                .criterion(Criterion::when("a", 1.0, true))
                .criterion(Criterion::when("b", 1.0, false)),
        ];

        let intention =
            aggregate(EngineKind::EarlyWarning, Vec::new(), patterns).expect("aggregates");
        let names: Vec<_> = intention.patterns.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Full", "Half", "Also half"]);
        assert_eq!(intention.patterns[0].confidence, 1.0);
        assert_eq!(intention.patterns[1].evidence, vec!["a"]);
    }

    #[test]
    fn invalid_weights_abort_with_the_pattern_name() {
        let patterns =
            vec![PatternSpec::new("Broken", "", 0.1).criterion(Criterion::when("a", -1.0, true))];
        let err = aggregate(EngineKind::Pharmacovigilance, Vec::new(), patterns)
            .expect_err("negative weight rejected");
        match err {
            PipelineError::Pattern {
                engine, pattern, ..
            } => {
                assert_eq!(engine, EngineKind::Pharmacovigilance);
                assert_eq!(pattern, "Broken");
            }
            other => panic!("expected pattern error, got {other:?}"),
        }
    }
}
