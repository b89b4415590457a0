use crate::patient::AgeBand;
use serde::{Deserialize, Serialize};

/// Which side of the reference band carries clinical concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsWorse,
    LowerIsWorse,
    OutsideBand,
}

/// Calibration for one signal: the normal band `[low, high]` and the values at
/// which deviation reaches maximal concern (`floor` below, `ceiling` above).
/// One-sided ranges only consult the bounds on their `direction` side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub low: f64,
    pub high: f64,
    pub floor: f64,
    pub ceiling: f64,
    pub direction: Direction,
}

impl ReferenceRange {
    pub const fn higher_is_worse(normal_high: f64, ceiling: f64) -> Self {
        Self {
            low: normal_high,
            high: normal_high,
            floor: normal_high,
            ceiling,
            direction: Direction::HigherIsWorse,
        }
    }

    pub const fn lower_is_worse(normal_low: f64, floor: f64) -> Self {
        Self {
            low: normal_low,
            high: normal_low,
            floor,
            ceiling: normal_low,
            direction: Direction::LowerIsWorse,
        }
    }

    pub const fn band(low: f64, high: f64, floor: f64, ceiling: f64) -> Self {
        Self {
            low,
            high,
            floor,
            ceiling,
            direction: Direction::OutsideBand,
        }
    }
}

/// Age-banded ranges for vital signs whose normal values shift with age.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeBandedRange {
    pub infant: ReferenceRange,
    pub toddler: ReferenceRange,
    pub child: ReferenceRange,
    pub adolescent: ReferenceRange,
}

impl AgeBandedRange {
    pub fn for_band(&self, band: AgeBand) -> &ReferenceRange {
        match band {
            AgeBand::Infant => &self.infant,
            AgeBand::Toddler => &self.toddler,
            AgeBand::Child => &self.child,
            AgeBand::Adolescent => &self.adolescent,
        }
    }
}

/// Four-level status shared by signals, fields and score bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    Normal,
    Moderate,
    Warning,
    Critical,
}

impl SignalStatus {
    /// Cut points at 25, 50 and 75.
    pub fn from_intensity(value: f64) -> Self {
        if value < 25.0 {
            Self::Normal
        } else if value < 50.0 {
            Self::Moderate
        } else if value < 75.0 {
            Self::Warning
        } else {
            Self::Critical
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Normal => 0,
            Self::Moderate => 1,
            Self::Warning => 2,
            Self::Critical => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Moderate => "Moderate",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Normalized {
    pub normalized: f64,
    pub status: SignalStatus,
}

/// Map a raw value onto 0..=100 concern. Missing or non-finite values read as 0/normal.
pub fn normalize(raw: Option<f64>, range: &ReferenceRange) -> Normalized {
    let normalized = match raw {
        Some(value) if value.is_finite() => match range.direction {
            Direction::HigherIsWorse => above(value, range),
            Direction::LowerIsWorse => below(value, range),
            Direction::OutsideBand => above(value, range).max(below(value, range)),
        },
        _ => 0.0,
    };

    Normalized {
        normalized,
        status: SignalStatus::from_intensity(normalized),
    }
}

fn above(value: f64, range: &ReferenceRange) -> f64 {
    if value <= range.high {
        return 0.0;
    }
    let span = range.ceiling - range.high;
    if span <= 0.0 {
        return 100.0;
    }
    ((value - range.high) / span * 100.0).min(100.0)
}

fn below(value: f64, range: &ReferenceRange) -> f64 {
    if value >= range.low {
        return 0.0;
    }
    let span = range.low - range.floor;
    if span <= 0.0 {
        return 100.0;
    }
    ((range.low - value) / span * 100.0).min(100.0)
}

/// One normalized clinical signal as exposed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub name: &'static str,
    pub raw_value: Option<f64>,
    pub unit: &'static str,
    pub normalized: f64,
    pub status: SignalStatus,
}

impl Signal {
    pub fn read(
        name: &'static str,
        raw_value: Option<f64>,
        unit: &'static str,
        range: &ReferenceRange,
    ) -> Self {
        let Normalized { normalized, status } = normalize(raw_value, range);
        Self {
            name,
            raw_value,
            unit,
            normalized,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CRP: ReferenceRange = ReferenceRange::higher_is_worse(5.0, 200.0);
    const GCS: ReferenceRange = ReferenceRange::lower_is_worse(15.0, 3.0);
    const TEMPERATURE: ReferenceRange = ReferenceRange::band(36.0, 38.0, 33.0, 41.0);

    #[test]
    fn missing_values_are_not_evidence_of_severity() {
        let reading = normalize(None, &CRP);
        assert_eq!(reading.normalized, 0.0);
        assert_eq!(reading.status, SignalStatus::Normal);

        let nan = normalize(Some(f64::NAN), &GCS);
        assert_eq!(nan.normalized, 0.0);
    }

    #[test]
    fn values_beyond_calibration_clamp_to_100() {
        assert_eq!(normalize(Some(900.0), &CRP).normalized, 100.0);
        assert_eq!(normalize(Some(3.0), &GCS).normalized, 100.0);
        assert_eq!(normalize(Some(44.0), &TEMPERATURE).normalized, 100.0);
    }

    #[test]
    fn status_follows_the_shared_cut_points() {
        assert_eq!(SignalStatus::from_intensity(0.0), SignalStatus::Normal);
        assert_eq!(SignalStatus::from_intensity(24.9), SignalStatus::Normal);
        assert_eq!(SignalStatus::from_intensity(25.0), SignalStatus::Moderate);
        assert_eq!(SignalStatus::from_intensity(50.0), SignalStatus::Warning);
        assert_eq!(SignalStatus::from_intensity(75.0), SignalStatus::Critical);
    }

    #[test]
    fn band_signals_score_both_deviations() {
        assert_eq!(normalize(Some(37.0), &TEMPERATURE).normalized, 0.0);
        let fever = normalize(Some(39.5), &TEMPERATURE).normalized;
        let hypothermia = normalize(Some(34.5), &TEMPERATURE).normalized;
        assert!((fever - 50.0).abs() < 1e-9);
        assert!((hypothermia - 50.0).abs() < 1e-9);
    }

    #[test]
    fn lower_gcs_reads_as_more_severe() {
        let gcs5 = normalize(Some(5.0), &GCS);
        assert!((gcs5.normalized - 83.333).abs() < 0.01);
        assert_eq!(gcs5.status, SignalStatus::Critical);
        assert_eq!(normalize(Some(15.0), &GCS).status, SignalStatus::Normal);
    }

    proptest! {
        #[test]
        fn higher_is_worse_is_monotonic(a in 0.0f64..500.0, b in 0.0f64..500.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(normalize(Some(lo), &CRP).normalized <= normalize(Some(hi), &CRP).normalized);
        }

        #[test]
        fn lower_is_worse_is_monotonic(a in 3.0f64..=15.0, b in 3.0f64..=15.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(normalize(Some(hi), &GCS).normalized <= normalize(Some(lo), &GCS).normalized);
        }

        #[test]
        fn normalized_stays_within_bounds(value in -1000.0f64..1000.0) {
            let reading = normalize(Some(value), &TEMPERATURE);
            prop_assert!((0.0..=100.0).contains(&reading.normalized));
        }
    }
}
