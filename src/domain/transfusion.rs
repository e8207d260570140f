use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::patient::PatientRef;
use crate::domain::types::{BloodContent, BloodType, RecordCode, RecordKey, TransfusionLocal};

/// Tag attached to every transfusion created from this client.
pub const DEFAULT_TRANSFUSION_TAG: &str = "naovisitado";

/// Tag marking a transfusion that caused a reaction.
pub const REACTION_TAG: &str = "rt";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BloodBag {
    #[serde(rename = "type")]
    pub blood_type: BloodType,
    pub content: BloodContent,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewTransfusion {
    pub patient_key: RecordKey,
    pub patient_code: RecordCode,
    pub patient_name: String,
    pub code: RecordCode,
    pub date: NaiveDate,
    pub local: TransfusionLocal,
    pub bags: Vec<BloodBag>,
    pub tags: Vec<String>,
    pub text: Option<String>,
}

impl NewTransfusion {
    /// Builds a transfusion for `patient`, dropping blank notes and duplicate tags.
    #[must_use]
    pub fn new(
        patient: &PatientRef,
        code: RecordCode,
        date: NaiveDate,
        local: TransfusionLocal,
        bags: Vec<BloodBag>,
        tags: Vec<String>,
        text: Option<String>,
    ) -> Self {
        let mut unique_tags: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags.into_iter().map(|t| t.trim().to_string()) {
            if !tag.is_empty() && !unique_tags.contains(&tag) {
                unique_tags.push(tag);
            }
        }

        Self {
            patient_key: patient.key.clone(),
            patient_code: patient.code.clone(),
            patient_name: patient.name.as_str().to_string(),
            code,
            date,
            local,
            bags,
            tags: unique_tags,
            text: text
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct TransfusionPatientRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
}

/// Row of the transfusion list, projected to `patient.name,code,patient.code`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct TransfusionSummary {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub patient: TransfusionPatientRef,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::PatientName;

    fn patient() -> PatientRef {
        PatientRef {
            key: RecordKey::new("p-key").unwrap(),
            name: PatientName::new("Maria").unwrap(),
            code: RecordCode::new("1234").unwrap(),
        }
    }

    #[test]
    fn new_transfusion_normalizes_tags_and_text() {
        let tr = NewTransfusion::new(
            &patient(),
            RecordCode::new("900").unwrap(),
            NaiveDate::from_ymd_opt(2016, 1, 5).unwrap(),
            TransfusionLocal::new("uti-neonatal").unwrap(),
            vec![],
            vec![
                " naovisitado ".to_string(),
                "rt".to_string(),
                "naovisitado".to_string(),
                " ".to_string(),
            ],
            Some("   ".to_string()),
        );

        assert_eq!(tr.tags, vec!["naovisitado", "rt"]);
        assert_eq!(tr.text, None);
        assert_eq!(tr.patient_key.as_str(), "p-key");
        assert_eq!(tr.patient_name, "Maria");
    }

    #[test]
    fn summary_tolerates_missing_projection_fields() {
        let row: TransfusionSummary =
            serde_json::from_str(r#"{"code": "77", "patient": {"name": "Ana"}}"#).unwrap();
        assert_eq!(row.code, "77");
        assert_eq!(row.patient.name, "Ana");
        assert_eq!(row.patient.code, "");
        assert_eq!(row.key, None);
    }
}
