use crate::scoring::{AgeBandedRange, ReferenceRange};
use serde::{Deserialize, Serialize};

/// Process-wide read-only constants injected into every engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineTables {
    pub ranges: SignalRanges,
    pub vital: VitalTables,
    pub therapeutic: TherapeuticTables,
    pub pharmacovigilance: PharmacovigilanceTables,
    pub early_warning: EarlyWarningTables,
    pub prospection: ProspectionTables,
    pub synthesis: SynthesisTables,
    pub curve: CurveTables,
}

impl EngineTables {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Reference ranges for clinical signals read by several engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalRanges {
    pub gcs: ReferenceRange,
    pub pupils: ReferenceRange,
    pub seizures_24h: ReferenceRange,
    pub seizure_duration_min: ReferenceRange,
    pub heart_rate: AgeBandedRange,
    pub respiratory_rate: AgeBandedRange,
    pub systolic_bp: AgeBandedRange,
    pub spo2: ReferenceRange,
    pub temperature: ReferenceRange,
    pub crp: ReferenceRange,
    pub pct: ReferenceRange,
    pub ferritin: ReferenceRange,
    pub wbc: ReferenceRange,
    pub platelets: ReferenceRange,
    pub lactate: ReferenceRange,
    pub alt: ReferenceRange,
    pub creatinine: ReferenceRange,
    pub ammonia: ReferenceRange,
    pub sodium: ReferenceRange,
    pub csf_cells: ReferenceRange,
    pub csf_protein: ReferenceRange,
    pub il6: ReferenceRange,
    pub il1b: ReferenceRange,
    pub tnf_alpha: ReferenceRange,
    pub troponin: ReferenceRange,
    pub nt_pro_bnp: ReferenceRange,
    pub ejection_fraction: ReferenceRange,
    pub mog_titer: ReferenceRange,
}

impl Default for SignalRanges {
    fn default() -> Self {
        Self {
            gcs: ReferenceRange::lower_is_worse(15.0, 3.0),
            pupils: ReferenceRange::higher_is_worse(0.0, 3.0),
            seizures_24h: ReferenceRange::higher_is_worse(0.0, 20.0),
            seizure_duration_min: ReferenceRange::higher_is_worse(5.0, 60.0),
            heart_rate: AgeBandedRange {
                infant: ReferenceRange::band(100.0, 160.0, 60.0, 220.0),
                toddler: ReferenceRange::band(90.0, 150.0, 50.0, 200.0),
                child: ReferenceRange::band(70.0, 120.0, 40.0, 180.0),
                adolescent: ReferenceRange::band(60.0, 100.0, 35.0, 160.0),
            },
            respiratory_rate: AgeBandedRange {
                infant: ReferenceRange::band(30.0, 60.0, 15.0, 90.0),
                toddler: ReferenceRange::band(24.0, 40.0, 12.0, 70.0),
                child: ReferenceRange::band(18.0, 30.0, 10.0, 60.0),
                adolescent: ReferenceRange::band(12.0, 20.0, 8.0, 45.0),
            },
            systolic_bp: AgeBandedRange {
                infant: ReferenceRange::band(70.0, 100.0, 50.0, 140.0),
                toddler: ReferenceRange::band(80.0, 110.0, 55.0, 150.0),
                child: ReferenceRange::band(90.0, 120.0, 60.0, 160.0),
                adolescent: ReferenceRange::band(100.0, 130.0, 70.0, 180.0),
            },
            spo2: ReferenceRange::lower_is_worse(95.0, 80.0),
            temperature: ReferenceRange::band(36.0, 38.0, 33.0, 41.0),
            crp: ReferenceRange::higher_is_worse(5.0, 200.0),
            pct: ReferenceRange::higher_is_worse(0.5, 10.0),
            ferritin: ReferenceRange::higher_is_worse(300.0, 5000.0),
            wbc: ReferenceRange::band(4.5, 13.5, 1.0, 40.0),
            platelets: ReferenceRange::lower_is_worse(150.0, 20.0),
            lactate: ReferenceRange::higher_is_worse(2.0, 8.0),
            alt: ReferenceRange::higher_is_worse(40.0, 400.0),
            creatinine: ReferenceRange::higher_is_worse(80.0, 300.0),
            ammonia: ReferenceRange::higher_is_worse(50.0, 200.0),
            sodium: ReferenceRange::band(135.0, 145.0, 120.0, 160.0),
            csf_cells: ReferenceRange::higher_is_worse(5.0, 200.0),
            csf_protein: ReferenceRange::higher_is_worse(0.45, 2.0),
            il6: ReferenceRange::higher_is_worse(7.0, 500.0),
            il1b: ReferenceRange::higher_is_worse(5.0, 100.0),
            tnf_alpha: ReferenceRange::higher_is_worse(8.0, 100.0),
            troponin: ReferenceRange::higher_is_worse(14.0, 500.0),
            nt_pro_bnp: ReferenceRange::higher_is_worse(300.0, 10000.0),
            ejection_fraction: ReferenceRange::lower_is_worse(55.0, 25.0),
            mog_titer: ReferenceRange::higher_is_worse(10.0, 1280.0),
        }
    }
}

/// Synthesis weights of the vital-prognosis fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalTables {
    pub neurological: f64,
    pub inflammatory: f64,
    pub hemodynamic: f64,
    pub reserve: f64,
}

impl Default for VitalTables {
    fn default() -> Self {
        Self {
            neurological: 0.40,
            inflammatory: 0.25,
            hemodynamic: 0.20,
            reserve: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TherapeuticTables {
    pub activity: f64,
    pub refractoriness: f64,
    pub immune: f64,
    /// Count of treatment lines without response.
    pub failed_lines: ReferenceRange,
    pub partial_lines: ReferenceRange,
    pub hospital_day: ReferenceRange,
}

impl Default for TherapeuticTables {
    fn default() -> Self {
        Self {
            activity: 0.40,
            refractoriness: 0.35,
            immune: 0.25,
            failed_lines: ReferenceRange::higher_is_worse(0.0, 3.0),
            partial_lines: ReferenceRange::higher_is_worse(0.0, 4.0),
            hospital_day: ReferenceRange::higher_is_worse(7.0, 28.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PharmacovigilanceTables {
    pub interactions: f64,
    pub clearance: f64,
    pub exposure: f64,
    pub interaction_pairs: ReferenceRange,
    /// Worst interaction severity: 0 none, 1 minor, 2 moderate, 3 critical.
    pub interaction_severity: ReferenceRange,
    pub active_drugs: ReferenceRange,
    /// Prescribed dose divided by the daily ceiling.
    pub overdose_ratio: ReferenceRange,
    pub doses_over_ceiling: ReferenceRange,
}

impl Default for PharmacovigilanceTables {
    fn default() -> Self {
        Self {
            interactions: 0.40,
            clearance: 0.30,
            exposure: 0.30,
            interaction_pairs: ReferenceRange::higher_is_worse(0.0, 3.0),
            interaction_severity: ReferenceRange::higher_is_worse(0.0, 3.0),
            active_drugs: ReferenceRange::higher_is_worse(4.0, 10.0),
            overdose_ratio: ReferenceRange::higher_is_worse(1.0, 2.0),
            doses_over_ceiling: ReferenceRange::higher_is_worse(0.0, 3.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarlyWarningTables {
    pub respiratory: f64,
    pub cardiovascular: f64,
    pub neurological: f64,
    pub inflammatory: f64,
    /// GCS points lost from the best earlier reading.
    pub gcs_drop: ReferenceRange,
}

impl Default for EarlyWarningTables {
    fn default() -> Self {
        Self {
            respiratory: 0.30,
            cardiovascular: 0.30,
            neurological: 0.25,
            inflammatory: 0.15,
            gcs_drop: ReferenceRange::higher_is_worse(0.0, 6.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProspectionTables {
    pub refractoriness: f64,
    pub inflammatory_target: f64,
    pub disease_markers: f64,
    pub failed_lines: ReferenceRange,
    pub demyelinating_lesions: ReferenceRange,
}

impl Default for ProspectionTables {
    fn default() -> Self {
        Self {
            refractoriness: 0.40,
            inflammatory_target: 0.35,
            disease_markers: 0.25,
            failed_lines: ReferenceRange::higher_is_worse(0.0, 3.0),
            demyelinating_lesions: ReferenceRange::higher_is_worse(0.0, 6.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisTables {
    pub pattern_publish_threshold: f64,
    pub critical_pattern_confidence: f64,
    pub field_warning_threshold: f64,
    pub field_critical_threshold: f64,
}

impl Default for SynthesisTables {
    fn default() -> Self {
        Self {
            pattern_publish_threshold: 0.6,
            critical_pattern_confidence: 0.8,
            field_warning_threshold: 50.0,
            field_critical_threshold: 75.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveTables {
    /// Mean points per step that counts as a sustained slope.
    pub slope_threshold: f64,
    /// Single-step rise that counts as a jump.
    pub jump_threshold: f64,
    /// Smallest step that moves a two-point series off `stable`.
    pub drift_tolerance: f64,
    pub critical_threshold: f64,
}

impl Default for CurveTables {
    fn default() -> Self {
        Self {
            slope_threshold: 2.0,
            jump_threshold: 15.0,
            drift_tolerance: 0.5,
            critical_threshold: 75.0,
        }
    }
}
