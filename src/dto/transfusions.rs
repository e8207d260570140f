use serde::Serialize;

use crate::domain::patient::PatientSummary;
use crate::forms::transfusion::NewTransfusionForm;

#[derive(Debug, Clone)]
pub struct NewTransfusionPageData {
    pub blood_types: Vec<String>,
    pub blood_contents: Vec<String>,
    pub locals: Vec<String>,
    pub form: NewTransfusionForm,
    pub failed: bool,
}

/// Typeahead entry for picking a patient, shown as `code | name` with the
/// name stripped of accents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientSuggestion {
    pub display: String,
    pub patient: PatientSummary,
}

impl From<PatientSummary> for PatientSuggestion {
    fn from(patient: PatientSummary) -> Self {
        Self {
            display: format!("{} | {}", patient.code, patient.normalized_name()),
            patient,
        }
    }
}
