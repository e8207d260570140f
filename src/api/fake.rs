//! Hand-written API doubles for tests that need real pagination or control
//! over when responses arrive.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::oneshot;

use crate::api::{ApiError, ApiReader, ApiResult};
use crate::pagination::{CollectionQuery, Locator};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Envelope for `count` synthetic patients, sliced at `offset`.
///
/// `prev`/`next` are left out; [`PagedApi`] adds them.
pub fn collection_envelope(offset: usize, max: usize, count: usize) -> Value {
    let end = count.min(offset + max);
    let items: Vec<Value> = (offset..end)
        .map(|i| {
            json!({
                "key": format!("key-{i}"),
                "name": format!("Patient {i}"),
                "code": i.to_string(),
            })
        })
        .collect();
    json!({
        "code": "OK",
        "data": items,
        "offset": offset,
        "max": max,
        "total": count,
        "count": count,
        "prev": null,
        "next": null,
        "q": "",
    })
}

#[derive(Deserialize)]
struct PageParams {
    offset: usize,
    max: usize,
    #[serde(default)]
    q: String,
    #[serde(default)]
    fields: String,
}

/// Serves `count` records in pages, issuing `prev`/`next` locators the way
/// the server does.
pub struct PagedApi {
    endpoint: String,
    count: usize,
    requests: Mutex<Vec<String>>,
    failure: Mutex<Option<ApiError>>,
}

impl PagedApi {
    pub fn new(endpoint: &str, count: usize) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            count,
            requests: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    /// Locators requested so far, oldest first.
    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }

    /// Makes the next request fail with `err`.
    pub fn fail_next(&self, err: ApiError) {
        *lock(&self.failure) = Some(err);
    }

    fn sibling(&self, params: &PageParams, offset: usize) -> Option<String> {
        let max = std::num::NonZeroUsize::new(params.max)?;
        let query = CollectionQuery {
            offset,
            max,
            filter_text: params.q.clone(),
            fields: params
                .fields
                .split(',')
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect(),
        };
        query
            .build_locator(&self.endpoint)
            .ok()
            .map(Locator::into_inner)
    }
}

#[async_trait]
impl ApiReader for PagedApi {
    async fn get(&self, locator: &Locator) -> ApiResult<Value> {
        lock(&self.requests).push(locator.as_str().to_string());
        if let Some(err) = lock(&self.failure).take() {
            return Err(err);
        }

        let query = locator
            .as_str()
            .split_once('?')
            .map(|(_, query)| query)
            .unwrap_or_default();
        let params: PageParams = serde_html_form::from_str(query)
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        let mut body = collection_envelope(params.offset, params.max, self.count);
        body["q"] = json!(params.q);
        if params.offset > 0 {
            let prev = params.offset.saturating_sub(params.max);
            body["prev"] = json!(self.sibling(&params, prev));
        }
        if params.offset + params.max < self.count {
            body["next"] = json!(self.sibling(&params, params.offset + params.max));
        }
        Ok(body)
    }
}

/// Holds every response until the test releases it through the sender
/// returned by [`GatedApi::gate`].
#[derive(Default)]
pub struct GatedApi {
    gates: Mutex<HashMap<String, oneshot::Receiver<ApiResult<Value>>>>,
}

impl GatedApi {
    pub fn gate(&self, locator: &str) -> oneshot::Sender<ApiResult<Value>> {
        let (tx, rx) = oneshot::channel();
        lock(&self.gates).insert(locator.to_string(), rx);
        tx
    }
}

#[async_trait]
impl ApiReader for GatedApi {
    async fn get(&self, locator: &Locator) -> ApiResult<Value> {
        let gate = lock(&self.gates).remove(locator.as_str());
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ApiError::Transport("gate dropped".to_string()))),
            None => Err(ApiError::NotFound),
        }
    }
}
