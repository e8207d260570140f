//! Configuration model loaded from external sources.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Settings shared by the API client and the controllers.
pub struct ClientConfig {
    /// Scheme and host of the REST API, e.g. `https://mejcrt.example.org`.
    pub api_base_url: String,
    /// Origin the identity provider sends the user back to after login/logout.
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default = "default_patient_page_size")]
    pub patient_page_size: usize,
    #[serde(default = "default_transfusion_page_size")]
    pub transfusion_page_size: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_patient_page_size() -> usize {
    20
}

fn default_transfusion_page_size() -> usize {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// Origin passed as `continue=` to the login endpoints.
    pub fn continue_origin(&self) -> &str {
        self.origin.as_deref().unwrap_or(&self.api_base_url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            origin: None,
            patient_page_size: default_patient_page_size(),
            transfusion_page_size: default_transfusion_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"api_base_url": "https://rt.example.org"}"#).unwrap();

        assert_eq!(config.patient_page_size, 20);
        assert_eq!(config.transfusion_page_size, 10);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.continue_origin(), "https://rt.example.org");
    }
}
