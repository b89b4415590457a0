use super::context::Context;
use super::intention::Intention;
use super::rules::{FiredRule, RuleKind};
use super::signal::SignalStatus;
use super::EngineKind;
use crate::config::SynthesisTables;
use crate::patient::{Alert, AlertSeverity, Priority, Recommendation};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Synthesis {
    pub score: u8,
    pub level: &'static str,
    pub alerts: Vec<Alert>,
    pub recommendations: Vec<Recommendation>,
}

/// Engine-specific wording used by synthesis.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisProfile {
    pub engine: EngineKind,
    /// Labels for the 0/25/50/75 score bands.
    pub levels: [&'static str; 4],
    /// Title and body of the urgent recommendation issued in the top band.
    pub critical_advice: (&'static str, &'static str),
}

/// Unrounded score: weighted field mean (after corrections) times the context
/// modifier, clamped to 0..=100, then raised to the highest guard floor.
pub fn composite(intention: &Intention, context: &Context, rules: &[FiredRule]) -> f64 {
    let mut weighted = 0.0;
    let mut total = 0.0;
    for field in &intention.fields {
        let shift: f64 = rules
            .iter()
            .filter(|rule| rule.kind == RuleKind::Correction)
            .flat_map(FiredRule::field_shifts)
            .filter(|(name, _)| *name == field.name)
            .map(|(_, delta)| delta)
            .sum();
        weighted += field.weight * (field.intensity + shift).clamp(0.0, 100.0);
        total += field.weight;
    }

    let mean = if total > 0.0 { weighted / total } else { 0.0 };
    let base = (mean * context.context_modifier).clamp(0.0, 100.0);

    match guard_floor(rules) {
        Some(floor) => base.max(f64::from(floor)),
        None => base,
    }
}

pub fn guard_floor(rules: &[FiredRule]) -> Option<u8> {
    rules
        .iter()
        .filter(|rule| rule.kind == RuleKind::Guard)
        .filter_map(|rule| rule.floor)
        .max()
        .map(|floor| floor.min(100))
}

/// Final layer: score, level and engine-tagged alerts and recommendations.
pub fn synthesize(
    profile: &SynthesisProfile,
    intention: &Intention,
    rules: &[FiredRule],
    composite: f64,
    tables: &SynthesisTables,
) -> Synthesis {
    let score = composite.round().clamp(0.0, 100.0) as u8;
    let band = SignalStatus::from_intensity(f64::from(score));
    let level = profile.levels[band.index()];
    let source = profile.engine;

    let mut alerts = Vec::new();
    let mut recommendations = Vec::new();

    for pattern in &intention.patterns {
        if pattern.confidence < tables.pattern_publish_threshold {
            continue;
        }
        let severity = if pattern.confidence >= tables.critical_pattern_confidence {
            AlertSeverity::Critical
        } else {
            AlertSeverity::Warning
        };
        alerts.push(Alert {
            title: format!("{} pattern", pattern.name),
            body: format!(
                "{} (confidence {:.0}%; evidence: {})",
                pattern.description,
                pattern.confidence * 100.0,
                pattern.evidence.join(", ")
            ),
            source,
            severity,
        });
        if !pattern.implications.is_empty() {
            recommendations.push(Recommendation {
                title: format!("Act on {} pattern", pattern.name),
                body: pattern.implications.join("; "),
                source,
                priority: Priority::High,
                reference: None,
            });
        }
    }

    for rule in rules {
        match rule.kind {
            RuleKind::Guard => alerts.push(Alert {
                title: rule.name.to_string(),
                body: rule.message.clone(),
                source,
                severity: AlertSeverity::Critical,
            }),
            RuleKind::Correction => alerts.push(Alert {
                title: rule.name.to_string(),
                body: rule.message.clone(),
                source,
                severity: AlertSeverity::Warning,
            }),
            RuleKind::Informational => recommendations.push(Recommendation {
                title: rule.name.to_string(),
                body: rule.message.clone(),
                source,
                priority: Priority::Normal,
                reference: Some(rule.reference.to_string()),
            }),
        }
    }

    for field in &intention.fields {
        let severity = if field.intensity >= tables.field_critical_threshold {
            AlertSeverity::Critical
        } else if field.intensity >= tables.field_warning_threshold {
            AlertSeverity::Warning
        } else {
            continue;
        };
        alerts.push(Alert {
            title: format!("{} threshold crossed", field.name),
            body: format!(
                "{} at {:.0}/100: {}",
                field.name, field.intensity, field.interpretation
            ),
            source,
            severity,
        });
    }

    if band == SignalStatus::Critical {
        let (title, body) = profile.critical_advice;
        recommendations.push(Recommendation {
            title: title.to_string(),
            body: body.to_string(),
            source,
            priority: Priority::Urgent,
            reference: None,
        });
    }

    Synthesis {
        score,
        level,
        alerts,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::intention::{Pattern, SemanticField};
    use crate::scoring::rules::RuleAdjustment;
    use proptest::prelude::*;

    const PROFILE: SynthesisProfile = SynthesisProfile {
        engine: EngineKind::VitalPrognosis,
        levels: ["STABLE", "MODÉRÉ", "SÉVÈRE", "CRITIQUE"],
        critical_advice: ("Escalate", "Transfer to intensive care"),
    };

    fn field(name: &'static str, weight: f64, intensity: f64) -> SemanticField {
        SemanticField {
            name,
            weight,
            intensity,
            color: "#000",
            interpretation: String::from("interp"),
            signals: Vec::new(),
        }
    }

    fn intention(fields: Vec<SemanticField>) -> Intention {
        Intention {
            fields,
            patterns: Vec::new(),
        }
    }

    fn fired(name: &'static str, kind: RuleKind) -> FiredRule {
        FiredRule {
            name,
            kind,
            message: format!("{name} message"),
            reference: "ref",
            floor: None,
            adjustments: Vec::new(),
        }
    }

    fn context(modifier: f64) -> Context {
        Context {
            context_modifier: modifier,
            details: Vec::new(),
        }
    }

    #[test]
    fn composite_is_the_weighted_field_mean_times_the_modifier() {
        let intention = intention(vec![field("A", 0.75, 40.0), field("B", 0.25, 20.0)]);
        let value = composite(&intention, &context(1.2), &[]);
        assert!((value - 42.0).abs() < 1e-9);
    }

    #[test]
    fn guard_floor_wins_over_a_moderate_composite() {
        let intention = intention(vec![field("A", 1.0, 10.0)]);
        let mut guard = fired("Deep coma", RuleKind::Guard);
        guard.floor = Some(90);
        let value = composite(&intention, &Context::neutral(), &[guard.clone()]);
        assert_eq!(value, 90.0);

        let synthesis = synthesize(&PROFILE, &intention, &[guard], value, &SynthesisTables::default());
        assert_eq!(synthesis.score, 90);
        assert_eq!(synthesis.level, "CRITIQUE");
        assert!(synthesis
            .alerts
            .iter()
            .any(|alert| alert.title == "Deep coma" && alert.severity == AlertSeverity::Critical));
        assert!(synthesis
            .recommendations
            .iter()
            .any(|rec| rec.priority == Priority::Urgent));
    }

    #[test]
    fn corrections_shift_the_effective_intensity_only() {
        let intention = intention(vec![field("A", 1.0, 30.0)]);
        let mut correction = fired("Shift", RuleKind::Correction);
        correction.adjustments.push(RuleAdjustment::FieldShift {
            field: "A",
            delta: 15.0,
        });
        let value = composite(&intention, &Context::neutral(), &[correction]);
        assert_eq!(value, 45.0);
        assert_eq!(intention.fields[0].intensity, 30.0);
    }

    #[test]
    fn informational_rules_become_recommendations() {
        let intention = intention(vec![field("A", 1.0, 0.0)]);
        let rules = [fired("Levels", RuleKind::Informational)];
        let value = composite(&intention, &Context::neutral(), &rules);
        let synthesis = synthesize(&PROFILE, &intention, &rules, value, &SynthesisTables::default());
        assert_eq!(synthesis.score, 0);
        assert_eq!(synthesis.level, "STABLE");
        assert!(synthesis.alerts.is_empty());
        assert_eq!(synthesis.recommendations.len(), 1);
        assert_eq!(synthesis.recommendations[0].reference.as_deref(), Some("ref"));
    }

    #[test]
    fn published_patterns_and_hot_fields_raise_alerts() {
        let mut intention = intention(vec![field("Hot", 1.0, 80.0), field("Warm", 1.0, 55.0)]);
        intention.patterns = vec![
            Pattern {
                name: "FIRES-like",
                confidence: 0.9,
                description: "desc",
                implications: vec!["Consider anakinra"],
                evidence: vec!["a"],
            },
            Pattern {
                name: "Weak",
                confidence: 0.3,
                description: "desc",
                implications: Vec::new(),
                evidence: vec!["a"],
            },
        ];
        let synthesis = synthesize(&PROFILE, &intention, &[], 67.5, &SynthesisTables::default());

        let titles: Vec<_> = synthesis.alerts.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "FIRES-like pattern",
                "Hot threshold crossed",
                "Warm threshold crossed"
            ]
        );
        assert_eq!(synthesis.alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(synthesis.alerts[2].severity, AlertSeverity::Warning);
        assert_eq!(synthesis.score, 68);
        assert_eq!(synthesis.level, "SÉVÈRE");
    }

    proptest! {
        #[test]
        fn composite_is_always_clamped(
            a in 0.0f64..=100.0,
            b in 0.0f64..=100.0,
            modifier in 0.5f64..5.0,
        ) {
            let intention = intention(vec![field("A", 0.6, a), field("B", 0.4, b)]);
            let value = composite(&intention, &context(modifier), &[]);
            prop_assert!((0.0..=100.0).contains(&value));
        }
    }
}
