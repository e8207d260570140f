//! Access to the record-keeping REST API.
//!
//! Controllers only talk to the server through [`ApiReader`] and
//! [`ApiWriter`]; [`http::HttpApi`] is the production implementation and
//! `mock::MockApi` and the doubles in `fake` stand in for it in tests.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::pagination::Locator;

pub mod errors;
#[cfg(any(test, feature = "test-mocks"))]
pub mod fake;
pub mod http;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

pub use errors::{ApiError, ApiResult};

pub const PATIENT_ENDPOINT: &str = "/api/v1/patient";
pub const PATIENT_TYPES_ENDPOINT: &str = "/api/v1/patient/types";
pub const PATIENT_STATS_ENDPOINT: &str = "/api/v1/patient/stats";
pub const TRANSFUSION_ENDPOINT: &str = "/api/v1/transfusion";
pub const TRANSFUSION_STATS_ENDPOINT: &str = "/api/v1/transfusion/stats?tags=all,rt";
pub const BLOOD_TYPES_ENDPOINT: &str = "/api/v1/transfusion/blood/types";
pub const BLOOD_CONTENTS_ENDPOINT: &str = "/api/v1/transfusion/blood/contents";
pub const LOCALS_ENDPOINT: &str = "/api/v1/transfusion/locals";
pub const CURRENT_USER_ENDPOINT: &str = "/api/v1/user/me";
pub const GOOGLE_LOGIN_ENDPOINT: &str = "/api/v1/user/login/google";
pub const GOOGLE_LOGOUT_ENDPOINT: &str = "/api/v1/user/logout/google";

#[async_trait]
pub trait ApiReader: Send + Sync {
    /// Issues a `GET` for the locator and returns the JSON body of a 2xx response.
    async fn get(&self, locator: &Locator) -> ApiResult<Value>;
}

#[async_trait]
pub trait ApiWriter: Send + Sync {
    async fn post(&self, path: &str, body: &Value) -> ApiResult<Value>;
    async fn put(&self, path: &str, body: &Value) -> ApiResult<Value>;
    /// Success is decided by the status alone; the body is ignored.
    async fn delete(&self, path: &str) -> ApiResult<()>;
}

/// Takes the `data` member out of the `{code, data}` wrapper every endpoint uses.
pub fn take_data(mut body: Value) -> ApiResult<Value> {
    body.get_mut("data")
        .map(Value::take)
        .ok_or_else(|| ApiError::Decode("missing `data` member".to_string()))
}

/// Decodes `data.<member>`, e.g. `data.types` of the lookup endpoints.
pub fn decode_member<T: DeserializeOwned>(body: Value, member: &str) -> ApiResult<T> {
    let mut data = take_data(body)?;
    let value = data
        .get_mut(member)
        .map(Value::take)
        .ok_or_else(|| ApiError::Decode(format!("missing `data.{member}` member")))?;
    serde_json::from_value(value).map_err(ApiError::from)
}

/// Path of a single record below a collection endpoint.
pub fn record_path(endpoint: &str, key: &str) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_member_reads_nested_payload() {
        let body = json!({"code": "OK", "data": {"types": ["RN", "G"]}});
        let types: Vec<String> = decode_member(body, "types").unwrap();
        assert_eq!(types, vec!["RN", "G"]);
    }

    #[test]
    fn decode_member_reports_missing_members() {
        let err = decode_member::<Vec<String>>(json!({"code": "OK"}), "types").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));

        let err = decode_member::<Vec<String>>(json!({"data": {}}), "types").unwrap_err();
        assert!(matches!(err, ApiError::Decode(msg) if msg.contains("data.types")));
    }

    #[test]
    fn record_path_joins_without_double_slash() {
        assert_eq!(record_path("/api/v1/patient/", "abc"), "/api/v1/patient/abc");
        assert_eq!(record_path(PATIENT_ENDPOINT, "abc"), "/api/v1/patient/abc");
    }
}
