use serde::Deserialize;
use validator::Validate;

use crate::domain::patient::{NewPatient, Patient, UpdatePatient};
use crate::domain::types::{PatientName, RecordCode, RecordKey};
use crate::forms::FormError;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
/// Form data for registering a patient.
pub struct NewPatientForm {
    #[validate(length(min = 1))]
    pub name: String,
    /// Medical record number; separators are stripped.
    #[validate(length(min = 1, max = 32))]
    pub code: String,
    pub blood_type: String,
    #[serde(rename = "type")]
    pub patient_type: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
/// Form data for editing a patient. The record code cannot change.
pub struct EditPatientForm {
    #[validate(length(min = 1))]
    pub key: String,
    #[validate(length(min = 1))]
    pub name: String,
    /// Shown read-only.
    #[serde(default)]
    pub code: String,
    pub blood_type: String,
    #[serde(rename = "type")]
    pub patient_type: String,
}

impl NewPatientForm {
    /// Empty form preselecting the first option of each list, if any.
    pub fn with_defaults(blood_types: &[String], patient_types: &[String]) -> Self {
        Self {
            blood_type: blood_types.first().cloned().unwrap_or_default(),
            patient_type: patient_types.first().cloned().unwrap_or_default(),
            ..Self::default()
        }
    }
}

impl TryFrom<&NewPatientForm> for NewPatient {
    type Error = FormError;

    fn try_from(form: &NewPatientForm) -> Result<Self, Self::Error> {
        Ok(Self {
            name: PatientName::new(form.name.as_str()).map_err(|_| FormError::InvalidName)?,
            code: RecordCode::new(&form.code).map_err(|_| FormError::InvalidCode)?,
            blood_type: form.blood_type.parse()?,
            patient_type: form.patient_type.parse()?,
        })
    }
}

impl TryFrom<&EditPatientForm> for UpdatePatient {
    type Error = FormError;

    fn try_from(form: &EditPatientForm) -> Result<Self, Self::Error> {
        Ok(Self {
            key: RecordKey::new(form.key.as_str()).map_err(|_| FormError::InvalidKey)?,
            name: PatientName::new(form.name.as_str()).map_err(|_| FormError::InvalidName)?,
            blood_type: form.blood_type.parse()?,
            patient_type: form.patient_type.parse()?,
        })
    }
}

impl From<&Patient> for EditPatientForm {
    fn from(patient: &Patient) -> Self {
        Self {
            key: patient.key.as_str().to_string(),
            name: patient.name.as_str().to_string(),
            code: patient.code.as_str().to_string(),
            blood_type: patient.blood_type.as_str().to_string(),
            patient_type: patient.patient_type.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{BloodType, PatientType};

    fn form() -> NewPatientForm {
        NewPatientForm {
            name: " Maria da Silva ".to_string(),
            code: "12.34".to_string(),
            blood_type: "AB+".to_string(),
            patient_type: "G".to_string(),
        }
    }

    #[test]
    fn valid_form_converts_to_new_patient() {
        let form = form();
        assert!(form.validate().is_ok());

        let patient = NewPatient::try_from(&form).expect("valid form");
        assert_eq!(patient.name.as_str(), "Maria da Silva");
        assert_eq!(patient.code.as_str(), "1234");
        assert_eq!(patient.blood_type, BloodType::AbPos);
        assert_eq!(patient.patient_type, PatientType::Pregnant);
    }

    #[test]
    fn empty_name_fails_validation() {
        let form = NewPatientForm {
            name: String::new(),
            ..form()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn unknown_blood_type_is_an_invalid_choice() {
        let form = NewPatientForm {
            blood_type: "C+".to_string(),
            ..form()
        };
        assert!(matches!(
            NewPatient::try_from(&form),
            Err(FormError::InvalidChoice(value)) if value == "C+"
        ));
    }

    #[test]
    fn defaults_pick_first_options() {
        let form = NewPatientForm::with_defaults(
            &["A+".to_string(), "B+".to_string()],
            &["RN".to_string()],
        );
        assert_eq!(form.blood_type, "A+");
        assert_eq!(form.patient_type, "RN");
        assert!(form.name.is_empty());

        let empty = NewPatientForm::with_defaults(&[], &[]);
        assert_eq!(empty.blood_type, "");
    }
}
