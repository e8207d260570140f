//! Mock API implementation for isolating controllers in tests.

use async_trait::async_trait;
use mockall::mock;
use serde_json::Value;

use crate::api::{ApiReader, ApiResult, ApiWriter};
use crate::pagination::Locator;

mock! {
    pub Api {}

    #[async_trait]
    impl ApiReader for Api {
        async fn get(&self, locator: &Locator) -> ApiResult<Value>;
    }

    #[async_trait]
    impl ApiWriter for Api {
        async fn post(&self, path: &str, body: &Value) -> ApiResult<Value>;
        async fn put(&self, path: &str, body: &Value) -> ApiResult<Value>;
        async fn delete(&self, path: &str) -> ApiResult<()>;
    }
}
