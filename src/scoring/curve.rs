use crate::config::CurveTables;
use crate::patient::HistoryPoint;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Stable,
    Improving,
    Worsening,
    Escalating,
    HighRisk,
}

impl Trend {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Improving => "improving",
            Self::Worsening => "worsening",
            Self::Escalating => "escalating",
            Self::HighRisk => "high_risk",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Curve {
    /// Current composite before rounding.
    pub global_intensity: f64,
    pub trend: Trend,
    pub curve_data: Vec<f64>,
    pub labels: Vec<String>,
}

/// Layer 4: history passes through unchanged with the current point appended.
pub fn compute_curve(
    current: f64,
    current_day: u32,
    history: &[HistoryPoint],
    tables: &CurveTables,
) -> Curve {
    let mut curve_data: Vec<f64> = history.iter().map(|point| point.score).collect();
    let mut labels: Vec<String> = history.iter().map(|point| day_label(point.day)).collect();
    curve_data.push(current);
    labels.push(day_label(current_day));

    let trend = classify(&curve_data, tables);

    Curve {
        global_intensity: current,
        trend,
        curve_data,
        labels,
    }
}

fn day_label(day: u32) -> String {
    format!("D{day}")
}

/// Classify a trajectory. A critical point anywhere outranks every slope-based label.
pub fn classify(points: &[f64], tables: &CurveTables) -> Trend {
    let n = points.len();
    if n < 2 {
        return Trend::Stable;
    }

    if points.iter().any(|point| *point >= tables.critical_threshold) {
        return Trend::HighRisk;
    }

    let last_delta = points[n - 1] - points[n - 2];
    if n >= 3 {
        let prior_slope = (points[n - 2] - points[0]) / (n - 2) as f64;
        if last_delta >= tables.jump_threshold && prior_slope < tables.slope_threshold {
            return Trend::Escalating;
        }
    }

    // A single follow-up carries no slope yet; any real move sets the direction.
    let threshold = if n == 2 {
        tables.drift_tolerance
    } else {
        tables.slope_threshold
    };
    let slope = (points[n - 1] - points[0]) / (n - 1) as f64;
    if slope >= threshold {
        Trend::Worsening
    } else if slope <= -threshold {
        Trend::Improving
    } else {
        Trend::Stable
    }
}
