use crate::forms::patient::{EditPatientForm, NewPatientForm};

/// Lookup lists plus the blank registration form.
#[derive(Debug, Clone, Default)]
pub struct NewPatientPageData {
    pub blood_types: Vec<String>,
    pub patient_types: Vec<String>,
    pub form: NewPatientForm,
    /// Some lookup list failed to load.
    pub failed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EditPatientPageData {
    pub blood_types: Vec<String>,
    pub patient_types: Vec<String>,
    pub form: EditPatientForm,
    pub failed: bool,
}
