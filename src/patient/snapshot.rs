use serde::{Deserialize, Serialize};

/// Oldest age, in months, accepted by the pediatric engines.
pub const MAX_AGE_MONTHS: u32 = 216;

/// Point-in-time clinical inputs used to build a `PatientState`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSnapshot {
    pub age_months: u32,
    pub weight_kg: f64,
    pub sex: Sex,
    #[serde(default = "first_day")]
    pub hospital_day: u32,
    #[serde(default)]
    pub neuro: NeuroExam,
    #[serde(default)]
    pub hemodynamics: Hemodynamics,
    #[serde(default)]
    pub biology: Biology,
    #[serde(default)]
    pub csf: CsfProfile,
    #[serde(default)]
    pub drugs: Vec<DrugOrder>,
    #[serde(default)]
    pub treatment_history: Vec<TreatmentCourse>,
    #[serde(default)]
    pub comorbidities: Comorbidities,
    #[serde(default)]
    pub pims: Option<PimsMarkers>,
    #[serde(default)]
    pub mogad: Option<MogadMarkers>,
    #[serde(default)]
    pub cytokines: Option<CytokinePanel>,
}

fn first_day() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Female,
    Male,
}

/// Age bands driving the pediatric vital-sign reference ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBand {
    Infant,
    Toddler,
    Child,
    Adolescent,
}

impl AgeBand {
    pub const fn from_months(age_months: u32) -> Self {
        match age_months {
            0..=11 => Self::Infant,
            12..=35 => Self::Toddler,
            36..=143 => Self::Child,
            _ => Self::Adolescent,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuroExam {
    pub gcs: Option<u8>,
    /// Earlier GCS readings, oldest first.
    pub gcs_history: Vec<u8>,
    pub pupils: PupilState,
    pub seizures_24h: Option<u32>,
    /// Longest seizure over the last 24 hours, in minutes.
    pub seizure_duration_min: Option<f64>,
    pub seizure_type: SeizureType,
}

impl NeuroExam {
    /// Largest fall from the best earlier GCS to the current one.
    pub fn gcs_drop(&self) -> Option<u8> {
        let current = self.gcs?;
        let best = self.gcs_history.iter().copied().max()?;
        Some(best.saturating_sub(current))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PupilState {
    #[default]
    Reactive,
    Sluggish,
    UnilateralFixed,
    BilateralFixed,
}

impl PupilState {
    pub const fn severity(self) -> f64 {
        match self {
            Self::Reactive => 0.0,
            Self::Sluggish => 1.0,
            Self::UnilateralFixed => 2.0,
            Self::BilateralFixed => 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeizureType {
    #[default]
    None,
    Focal,
    Generalized,
    Status,
    RefractoryStatus,
    SuperRefractoryStatus,
}

impl SeizureType {
    pub const fn is_status(self) -> bool {
        matches!(
            self,
            Self::Status | Self::RefractoryStatus | Self::SuperRefractoryStatus
        )
    }

    pub const fn is_refractory(self) -> bool {
        matches!(self, Self::RefractoryStatus | Self::SuperRefractoryStatus)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hemodynamics {
    pub heart_rate: Option<f64>,
    pub systolic_bp: Option<f64>,
    pub diastolic_bp: Option<f64>,
    pub spo2: Option<f64>,
    pub temperature: Option<f64>,
    pub respiratory_rate: Option<f64>,
}

/// Laboratory values. CRP mg/L, PCT ng/mL, ferritin ng/mL, WBC G/L,
/// platelets G/L, lactate mmol/L, ALT U/L, creatinine µmol/L, ammonia µmol/L,
/// sodium mmol/L.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Biology {
    pub crp: Option<f64>,
    pub pct: Option<f64>,
    pub ferritin: Option<f64>,
    pub wbc: Option<f64>,
    pub platelets: Option<f64>,
    pub lactate: Option<f64>,
    pub alt: Option<f64>,
    pub creatinine: Option<f64>,
    pub ammonia: Option<f64>,
    pub sodium: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsfProfile {
    /// White cells per mm³.
    pub cells: Option<f64>,
    /// Protein in g/L.
    pub protein: Option<f64>,
    pub antibodies: AntibodyResult,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AntibodyResult {
    #[default]
    NotTested,
    Pending,
    Negative,
    Positive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugOrder {
    pub name: String,
    /// Daily dose in mg/kg/day.
    #[serde(default)]
    pub dose_mg_kg_day: Option<f64>,
    #[serde(default)]
    pub route: Option<Route>,
}

impl DrugOrder {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dose_mg_kg_day: None,
            route: None,
        }
    }

    pub fn with_dose(mut self, dose_mg_kg_day: f64) -> Self {
        self.dose_mg_kg_day = Some(dose_mg_kg_day);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Intravenous,
    Oral,
    Enteral,
    Subcutaneous,
    Intrathecal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentCourse {
    pub treatment: String,
    pub period: String,
    pub response: TreatmentResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentResponse {
    None,
    Partial,
    Good,
    Complete,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comorbidities {
    pub epilepsy: bool,
    pub immunodeficiency: bool,
    pub cardiopathy: bool,
    pub hepatic_disease: bool,
    pub renal_disease: bool,
}

/// Cardiac markers for multisystem inflammatory syndrome (PIMS).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PimsMarkers {
    /// High-sensitivity troponin, ng/L.
    pub troponin: Option<f64>,
    /// NT-proBNP, pg/mL.
    pub nt_pro_bnp: Option<f64>,
    /// Left ventricular ejection fraction, percent.
    pub ejection_fraction: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MogadMarkers {
    /// Reciprocal serum MOG-IgG titer (e.g. 160 for 1:160).
    pub mog_titer: Option<f64>,
    pub optic_neuritis: bool,
    pub demyelinating_lesions: u32,
}

/// Serum cytokines in pg/mL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CytokinePanel {
    pub il6: Option<f64>,
    pub il1b: Option<f64>,
    pub tnf_alpha: Option<f64>,
}

/// Construction-time validation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotError {
    #[error("age {0} months exceeds the pediatric limit of 216 months")]
    AgeOutOfRange(u32),
    #[error("weight must be a positive number of kilograms (found {0})")]
    InvalidWeight(f64),
    #[error("GCS must be within 3..=15 (found {0})")]
    GcsOutOfRange(u8),
    #[error("{field} must lie within {min}..={max} (found {found})")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        found: f64,
    },
    #[error("{field} cannot be negative (found {found})")]
    Negative { field: &'static str, found: f64 },
    #[error("drug name cannot be empty")]
    UnnamedDrug,
}

impl PatientSnapshot {
    /// Reject snapshots that violate the clinical input contract.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.age_months > MAX_AGE_MONTHS {
            return Err(SnapshotError::AgeOutOfRange(self.age_months));
        }

        if !self.weight_kg.is_finite() || self.weight_kg <= 0.0 {
            return Err(SnapshotError::InvalidWeight(self.weight_kg));
        }

        for gcs in self.neuro.gcs.iter().chain(self.neuro.gcs_history.iter()) {
            if !(3..=15).contains(gcs) {
                return Err(SnapshotError::GcsOutOfRange(*gcs));
            }
        }

        check_non_negative("neuro.seizure_duration_min", self.neuro.seizure_duration_min)?;

        let hemo = &self.hemodynamics;
        check_range("hemodynamics.spo2", hemo.spo2, 0.0, 100.0)?;
        check_range("hemodynamics.temperature", hemo.temperature, 25.0, 45.0)?;
        check_non_negative("hemodynamics.heart_rate", hemo.heart_rate)?;
        check_non_negative("hemodynamics.systolic_bp", hemo.systolic_bp)?;
        check_non_negative("hemodynamics.diastolic_bp", hemo.diastolic_bp)?;
        check_non_negative("hemodynamics.respiratory_rate", hemo.respiratory_rate)?;

        let bio = &self.biology;
        for (field, value) in [
            ("biology.crp", bio.crp),
            ("biology.pct", bio.pct),
            ("biology.ferritin", bio.ferritin),
            ("biology.wbc", bio.wbc),
            ("biology.platelets", bio.platelets),
            ("biology.lactate", bio.lactate),
            ("biology.alt", bio.alt),
            ("biology.creatinine", bio.creatinine),
            ("biology.ammonia", bio.ammonia),
            ("biology.sodium", bio.sodium),
            ("csf.cells", self.csf.cells),
            ("csf.protein", self.csf.protein),
        ] {
            check_non_negative(field, value)?;
        }

        if let Some(pims) = &self.pims {
            check_non_negative("pims.troponin", pims.troponin)?;
            check_non_negative("pims.nt_pro_bnp", pims.nt_pro_bnp)?;
            check_range("pims.ejection_fraction", pims.ejection_fraction, 0.0, 100.0)?;
        }

        if let Some(mogad) = &self.mogad {
            check_non_negative("mogad.mog_titer", mogad.mog_titer)?;
        }

        if let Some(panel) = &self.cytokines {
            check_non_negative("cytokines.il6", panel.il6)?;
            check_non_negative("cytokines.il1b", panel.il1b)?;
            check_non_negative("cytokines.tnf_alpha", panel.tnf_alpha)?;
        }

        for drug in &self.drugs {
            if drug.name.trim().is_empty() {
                return Err(SnapshotError::UnnamedDrug);
            }
            check_non_negative("drugs.dose_mg_kg_day", drug.dose_mg_kg_day)?;
        }

        Ok(())
    }

    pub fn age_band(&self) -> AgeBand {
        AgeBand::from_months(self.age_months)
    }
}

fn check_non_negative(field: &'static str, value: Option<f64>) -> Result<(), SnapshotError> {
    match value {
        Some(found) if !found.is_finite() || found < 0.0 => {
            Err(SnapshotError::Negative { field, found })
        }
        _ => Ok(()),
    }
}

fn check_range(
    field: &'static str,
    value: Option<f64>,
    min: f64,
    max: f64,
) -> Result<(), SnapshotError> {
    match value {
        Some(found) if !(min..=max).contains(&found) => Err(SnapshotError::OutOfRange {
            field,
            min,
            max,
            found,
        }),
        _ => Ok(()),
    }
}
