use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::domain::types::{
    BloodType, PatientName, PatientType, RecordCode, RecordKey, TypeConstraintError,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Patient {
    pub key: RecordKey,
    pub name: PatientName,
    pub code: RecordCode,
    pub blood_type: BloodType,
    pub patient_type: PatientType,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewPatient {
    pub name: PatientName,
    pub code: RecordCode,
    pub blood_type: BloodType,
    pub patient_type: PatientType,
}

/// Changes applied to an existing patient. The server keeps the stored code.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdatePatient {
    pub key: RecordKey,
    pub name: PatientName,
    pub blood_type: BloodType,
    pub patient_type: PatientType,
}

/// The parts of a patient a transfusion points at.
#[derive(Clone, Debug, PartialEq)]
pub struct PatientRef {
    pub key: RecordKey,
    pub code: RecordCode,
    pub name: PatientName,
}

impl From<&Patient> for PatientRef {
    fn from(patient: &Patient) -> Self {
        Self {
            key: patient.key.clone(),
            code: patient.code.clone(),
            name: patient.name.clone(),
        }
    }
}

impl TryFrom<&PatientSummary> for PatientRef {
    type Error = TypeConstraintError;

    /// Typeahead entries only qualify when the server sent their key.
    fn try_from(summary: &PatientSummary) -> Result<Self, Self::Error> {
        Ok(Self {
            key: RecordKey::new(summary.key.clone().unwrap_or_default())?,
            code: RecordCode::new(&summary.code)?,
            name: PatientName::new(summary.name.as_str())?,
        })
    }
}

/// Row of the patient list, projected to `name,code`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct PatientSummary {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
}

impl PatientSummary {
    /// Text shown for a typeahead entry.
    pub fn display_text(&self) -> String {
        format!("{} | {}", self.code, self.name)
    }

    /// Name decomposed (NFKD) with its combining accents removed, so
    /// `"José"` becomes `"Jose"`.
    pub fn normalized_name(&self) -> String {
        self.name
            .nfkd()
            .filter(|c| !('\u{0300}'..='\u{036F}').contains(c))
            .collect()
    }
}

impl From<&Patient> for PatientSummary {
    fn from(patient: &Patient) -> Self {
        Self {
            key: Some(patient.key.as_str().to_string()),
            name: patient.name.as_str().to_string(),
            code: patient.code.as_str().to_string(),
        }
    }
}
