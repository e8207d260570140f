//! Wire shapes of patient records as served by `/api/v1/patient`.

use serde::{Deserialize, Serialize};

use crate::domain::patient::{
    NewPatient as DomainNewPatient, Patient as DomainPatient,
    UpdatePatient as DomainUpdatePatient,
};
use crate::domain::types::{
    BloodType, PatientName, PatientType, RecordCode, RecordKey, TypeConstraintError,
};

/// The API has served codes both as strings and as bare numbers.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WireCode {
    Text(String),
    Number(u64),
}

impl WireCode {
    pub fn into_text(self) -> String {
        match self {
            WireCode::Text(text) => text,
            WireCode::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
/// Patient as returned by `GET /api/v1/patient/<key>`.
pub struct Patient {
    pub key: String,
    pub name: String,
    pub code: WireCode,
    pub blood_type: String,
    #[serde(rename = "type")]
    pub patient_type: String,
}

/// Single-record responses come back either as the record or as a one-element list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PatientData {
    One(Patient),
    Many(Vec<Patient>),
}

impl PatientData {
    pub fn into_first(self) -> Option<Patient> {
        match self {
            PatientData::One(patient) => Some(patient),
            PatientData::Many(patients) => patients.into_iter().next(),
        }
    }
}

#[derive(Serialize)]
/// Body of `POST`/`PUT /api/v1/patient`.
pub struct PatientPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'a str>,
    pub name: &'a str,
    pub blood_type: BloodType,
    #[serde(rename = "type")]
    pub patient_type: PatientType,
}

impl TryFrom<Patient> for DomainPatient {
    type Error = TypeConstraintError;

    fn try_from(patient: Patient) -> Result<Self, Self::Error> {
        Ok(Self {
            key: RecordKey::new(patient.key)?,
            name: PatientName::new(patient.name)?,
            code: RecordCode::new(patient.code.into_text())?,
            blood_type: patient.blood_type.parse()?,
            patient_type: patient.patient_type.parse()?,
        })
    }
}

impl<'a> From<&'a DomainNewPatient> for PatientPayload<'a> {
    fn from(patient: &'a DomainNewPatient) -> Self {
        Self {
            key: None,
            code: Some(patient.code.as_str()),
            name: patient.name.as_str(),
            blood_type: patient.blood_type,
            patient_type: patient.patient_type,
        }
    }
}

impl<'a> From<&'a DomainUpdatePatient> for PatientPayload<'a> {
    fn from(patient: &'a DomainUpdatePatient) -> Self {
        Self {
            key: Some(patient.key.as_str()),
            code: None,
            name: patient.name.as_str(),
            blood_type: patient.blood_type,
            patient_type: patient.patient_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_patient_into_domain() {
        let wire: Patient = serde_json::from_value(json!({
            "key": "agxkZXY",
            "name": "Maria da Silva",
            "code": 1234,
            "blood_type": "O-",
            "type": "G",
            "logs": []
        }))
        .unwrap();

        let patient = DomainPatient::try_from(wire).expect("valid patient");
        assert_eq!(patient.code.as_str(), "1234");
        assert_eq!(patient.blood_type, BloodType::ONeg);
        assert_eq!(patient.patient_type, PatientType::Pregnant);
    }

    #[test]
    fn wire_patient_with_unknown_type_is_rejected() {
        let wire: Patient = serde_json::from_value(json!({
            "key": "k", "name": "X", "code": "1", "blood_type": "O-", "type": "Z"
        }))
        .unwrap();

        assert_eq!(
            DomainPatient::try_from(wire),
            Err(TypeConstraintError::InvalidValue("Z".to_string()))
        );
    }

    #[test]
    fn patient_data_accepts_list_form() {
        let data: PatientData = serde_json::from_value(json!([
            {"key": "k1", "name": "A", "code": "1", "blood_type": "A+", "type": "O"}
        ]))
        .unwrap();
        assert_eq!(data.into_first().map(|p| p.key), Some("k1".to_string()));

        let empty: PatientData = serde_json::from_value(json!([])).unwrap();
        assert!(empty.into_first().is_none());
    }

    #[test]
    fn update_payload_carries_key_but_not_code() {
        let update = DomainUpdatePatient {
            key: RecordKey::new("k1").unwrap(),
            name: PatientName::new("Ana").unwrap(),
            blood_type: BloodType::APos,
            patient_type: PatientType::Other,
        };
        let body = serde_json::to_value(PatientPayload::from(&update)).unwrap();
        assert_eq!(
            body,
            json!({"key": "k1", "name": "Ana", "blood_type": "A+", "type": "O"})
        );
    }
}
