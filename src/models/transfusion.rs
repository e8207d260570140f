//! Wire shapes of transfusion records as accepted by `/api/v1/transfusion`.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::transfusion::{BloodBag, NewTransfusion as DomainNewTransfusion};

#[derive(Serialize)]
/// Body of `POST /api/v1/transfusion`.
///
/// Both `patient_key` and `record` are sent; the server resolves the patient
/// from the key and falls back to the record code.
pub struct NewTransfusionPayload<'a> {
    pub patient_key: &'a str,
    pub record: &'a str,
    pub code: &'a str,
    pub date: NaiveDate,
    pub local: &'a str,
    pub bags: &'a [BloodBag],
    pub tags: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
}

impl<'a> From<&'a DomainNewTransfusion> for NewTransfusionPayload<'a> {
    fn from(tr: &'a DomainNewTransfusion) -> Self {
        Self {
            patient_key: tr.patient_key.as_str(),
            record: tr.patient_code.as_str(),
            code: tr.code.as_str(),
            date: tr.date,
            local: tr.local.as_str(),
            bags: &tr.bags,
            tags: &tr.tags,
            text: tr.text.as_deref(),
        }
    }
}
