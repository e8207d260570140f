//! reqwest-backed implementation of the API traits.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;

use crate::api::{ApiError, ApiReader, ApiResult, ApiWriter};
use crate::models::config::ClientConfig;
use crate::pagination::Locator;

#[derive(Clone, Debug)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    /// Builds a client rooted at `config.api_base_url`.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolves a path or server-issued locator against the base URL.
    /// Absolute locators are used untouched.
    fn url(&self, target: &str) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else if target.starts_with('/') {
            format!("{}{}", self.base_url, target)
        } else {
            format!("{}/{}", self.base_url, target)
        }
    }
}

async fn json_body(response: Response) -> ApiResult<Value> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::from_status(status.as_u16()));
    }
    response.json::<Value>().await.map_err(ApiError::from)
}

#[async_trait]
impl ApiReader for HttpApi {
    async fn get(&self, locator: &Locator) -> ApiResult<Value> {
        let url = self.url(locator.as_str());
        log::debug!("GET {url}");
        let response = self.client.get(&url).send().await?;
        json_body(response).await
    }
}

#[async_trait]
impl ApiWriter for HttpApi {
    async fn post(&self, path: &str, body: &Value) -> ApiResult<Value> {
        let url = self.url(path);
        log::debug!("POST {url}");
        let response = self.client.post(&url).json(body).send().await?;
        json_body(response).await
    }

    async fn put(&self, path: &str, body: &Value) -> ApiResult<Value> {
        let url = self.url(path);
        log::debug!("PUT {url}");
        let response = self.client.put(&url).json(body).send().await?;
        json_body(response).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let url = self.url(path);
        log::debug!("DELETE {url}");
        let response = self.client.delete(&url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::from_status(status.as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> HttpApi {
        let config = ClientConfig {
            api_base_url: "https://records.example.org/".to_string(),
            ..ClientConfig::default()
        };
        HttpApi::new(&config).expect("client builds")
    }

    #[test]
    fn url_prefixes_relative_targets_with_base() {
        let api = api();
        assert_eq!(
            api.url("/api/v1/patient?offset=0"),
            "https://records.example.org/api/v1/patient?offset=0"
        );
        assert_eq!(
            api.url("api/v1/patient"),
            "https://records.example.org/api/v1/patient"
        );
    }

    #[test]
    fn url_keeps_absolute_server_locators() {
        let api = api();
        let next = "https://records.example.org/api/v1/patient?offset=20&max=20";
        assert_eq!(api.url(next), next);
    }
}
