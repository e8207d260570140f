use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::patient::{PatientRef, PatientSummary};
use crate::domain::transfusion::{BloodBag, DEFAULT_TRANSFUSION_TAG, NewTransfusion};
use crate::domain::types::{RecordCode, TransfusionLocal};
use crate::forms::FormError;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BloodBagForm {
    #[serde(rename = "type")]
    pub blood_type: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
/// Form data for recording a transfusion.
pub struct NewTransfusionForm {
    #[validate(length(min = 1, max = 32))]
    pub code: String,
    pub date: NaiveDate,
    #[validate(length(min = 1))]
    pub local: String,
    /// Picked from the typeahead or preselected from the patient page.
    #[serde(default)]
    pub patient: Option<PatientSummary>,
    #[validate(length(min = 1))]
    pub bags: Vec<BloodBagForm>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl NewTransfusionForm {
    /// Blank form: first local, `today`, the default tag and the given patient.
    pub fn with_defaults(
        locals: &[String],
        today: NaiveDate,
        patient: Option<PatientSummary>,
    ) -> Self {
        Self {
            code: String::new(),
            date: today,
            local: locals.first().cloned().unwrap_or_default(),
            patient,
            bags: Vec::new(),
            tags: vec![DEFAULT_TRANSFUSION_TAG.to_string()],
            text: None,
        }
    }
}

impl TryFrom<&NewTransfusionForm> for NewTransfusion {
    type Error = FormError;

    fn try_from(form: &NewTransfusionForm) -> Result<Self, Self::Error> {
        let summary = form.patient.as_ref().ok_or(FormError::MissingPatient)?;
        let patient = PatientRef::try_from(summary).map_err(|_| FormError::MissingPatient)?;
        let bags = form
            .bags
            .iter()
            .map(|bag| -> Result<BloodBag, FormError> {
                Ok(BloodBag {
                    blood_type: bag.blood_type.parse()?,
                    content: bag.content.parse()?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewTransfusion::new(
            &patient,
            RecordCode::new(&form.code).map_err(|_| FormError::InvalidCode)?,
            form.date,
            TransfusionLocal::new(form.local.as_str()).map_err(|_| FormError::InvalidLocal)?,
            bags,
            form.tags.clone(),
            form.text.clone(),
        ))
    }
}
