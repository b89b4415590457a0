use super::context::Context;
use super::intention::Intention;
use super::EngineKind;
use crate::engines::knowledge::{InteractionSeverity, TherapyLine};
use crate::error::{EvaluationFault, PipelineError};
use crate::patient::PatientSnapshot;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Hard safety override; the only kind allowed to force a score floor.
    Guard,
    /// Shifts intermediate field intensities before synthesis.
    Correction,
    /// Surfaces a message and reference without touching the score.
    Informational,
}

impl RuleKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Guard => "guard",
            Self::Correction => "correction",
            Self::Informational => "informational",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedInteraction {
    pub drugs: [String; 2],
    pub severity: InteractionSeverity,
    pub mechanism: &'static str,
    pub action: &'static str,
    pub reference: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoseAdjustment {
    pub drug: String,
    pub prescribed_mg_kg_day: f64,
    pub ceiling_mg_kg_day: f64,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TherapeuticOption {
    pub therapy: &'static str,
    pub line: TherapyLine,
    pub rationale: &'static str,
}

/// Structured findings a rule can attach for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum RuleAdjustment {
    FieldShift { field: &'static str, delta: f64 },
    Interactions(Vec<DetectedInteraction>),
    DoseAdjustments(Vec<DoseAdjustment>),
    TherapeuticOptions(Vec<TherapeuticOption>),
}

/// What a rule's trigger may read: the snapshot and the layer 1 and 2 outputs.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub snapshot: &'a PatientSnapshot,
    pub intention: &'a Intention,
    pub context: &'a Context,
}

impl RuleInput<'_> {
    pub fn field_intensity(&self, name: &str) -> Result<f64, EvaluationFault> {
        self.intention
            .field(name)
            .map(|field| field.intensity)
            .ok_or_else(|| EvaluationFault::UnknownField(name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Firing {
    pub message: String,
    pub floor: Option<u8>,
    pub adjustments: Vec<RuleAdjustment>,
}

impl Firing {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            floor: None,
            adjustments: Vec::new(),
        }
    }

    pub fn with_floor(mut self, floor: u8) -> Self {
        self.floor = Some(floor);
        self
    }

    pub fn with(mut self, adjustment: RuleAdjustment) -> Self {
        self.adjustments.push(adjustment);
        self
    }
}

pub type Trigger = fn(&RuleInput<'_>) -> Result<Option<Firing>, EvaluationFault>;

/// Declared rule. Triggers must not depend on whether other rules fired.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub kind: RuleKind,
    pub reference: &'static str,
    pub trigger: Trigger,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiredRule {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: RuleKind,
    pub message: String,
    pub reference: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub adjustments: Vec<RuleAdjustment>,
}

impl FiredRule {
    pub fn field_shifts(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.adjustments.iter().filter_map(|adjustment| match adjustment {
            RuleAdjustment::FieldShift { field, delta } => Some((*field, *delta)),
            _ => None,
        })
    }
}

/// Layer 3: every matching rule fires, reported in declaration order.
pub fn evaluate_rules(
    engine: EngineKind,
    rules: &[Rule],
    input: &RuleInput<'_>,
) -> Result<Vec<FiredRule>, PipelineError> {
    let mut fired = Vec::new();

    for rule in rules {
        let firing = (rule.trigger)(input)
            .and_then(|firing| firing.map(|firing| check_firing(rule, input, firing)).transpose())
            .map_err(|source| PipelineError::Rule {
                engine,
                rule: rule.name.to_string(),
                source,
            })?;

        if let Some(firing) = firing {
            fired.push(FiredRule {
                name: rule.name,
                kind: rule.kind,
                message: firing.message,
                reference: rule.reference,
                floor: firing.floor.map(|floor| floor.min(100)),
                adjustments: firing.adjustments,
            });
        }
    }

    Ok(fired)
}

fn check_firing(rule: &Rule, input: &RuleInput<'_>, firing: Firing) -> Result<Firing, EvaluationFault> {
    if firing.floor.is_some() && rule.kind != RuleKind::Guard {
        return Err(EvaluationFault::ForbiddenFloor(rule.kind));
    }

    for adjustment in &firing.adjustments {
        if let RuleAdjustment::FieldShift { field, delta } = adjustment {
            if rule.kind != RuleKind::Correction {
                return Err(EvaluationFault::ForbiddenShift(rule.kind));
            }
            if !delta.is_finite() {
                return Err(EvaluationFault::InvalidWeight(*delta));
            }
            input.field_intensity(field)?;
        }
    }

    Ok(firing)
}
