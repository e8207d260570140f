//! Decoding of the collection envelope returned by list endpoints.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::{ApiError, ApiResult};
use crate::pagination::Locator;

/// Envelope member that echoes the filter the server actually ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppliedFilterKey {
    Filter,
    Q,
}

impl AppliedFilterKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            AppliedFilterKey::Filter => "filter",
            AppliedFilterKey::Q => "q",
        }
    }
}

/// Per-endpoint envelope adapter, fixed when a browser is constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnvelopeConfig {
    pub applied_filter_key: AppliedFilterKey,
}

impl EnvelopeConfig {
    pub const fn new(applied_filter_key: AppliedFilterKey) -> Self {
        Self { applied_filter_key }
    }
}

/// One page of a collection together with its pagination metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionPage<T> {
    pub items: Vec<T>,
    pub offset: usize,
    pub max: usize,
    /// Records across all pages, ignoring the filter.
    pub total: usize,
    /// Records matching the applied filter.
    pub count: usize,
    pub prev: Option<Locator>,
    pub next: Option<Locator>,
    /// May lag behind the text currently in the search box.
    pub applied_filter: String,
}

#[derive(Deserialize)]
struct RawEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    offset: usize,
    max: usize,
    #[serde(default)]
    total: usize,
    #[serde(default)]
    count: usize,
    #[serde(default)]
    prev: Option<String>,
    #[serde(default)]
    next: Option<String>,
}

fn non_blank_locator(value: Option<String>) -> Option<Locator> {
    value.filter(|s| !s.trim().is_empty()).map(Locator::from)
}

impl<T: DeserializeOwned> CollectionPage<T> {
    /// Decodes a list response and checks its pagination invariants.
    ///
    /// An envelope with `max == 0`, more items than `max`, or items running
    /// past `count` is reported as [`ApiError::Decode`].
    pub fn from_envelope(body: Value, config: EnvelopeConfig) -> ApiResult<Self> {
        let applied_filter = body
            .get(config.applied_filter_key.as_str())
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let raw: RawEnvelope<T> = serde_json::from_value(body)?;

        if raw.max == 0 {
            return Err(ApiError::Decode("page size `max` must be positive".to_string()));
        }
        if raw.data.len() > raw.max {
            return Err(ApiError::Decode(format!(
                "page holds {} items but max is {}",
                raw.data.len(),
                raw.max
            )));
        }
        let end = raw.offset.checked_add(raw.data.len()).ok_or_else(|| {
            ApiError::Decode(format!("offset {} is out of range", raw.offset))
        })?;
        if end > raw.count {
            return Err(ApiError::Decode(format!(
                "offset {} + {} items exceeds count {}",
                raw.offset,
                raw.data.len(),
                raw.count
            )));
        }

        Ok(Self {
            items: raw.data,
            offset: raw.offset,
            max: raw.max,
            total: raw.total,
            count: raw.count,
            prev: non_blank_locator(raw.prev),
            next: non_blank_locator(raw.next),
            applied_filter,
        })
    }
}

impl<T> CollectionPage<T> {
    /// One-based page number derived from the echoed offset.
    pub fn page_number(&self) -> usize {
        self.offset / self.max.max(1) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patient::PatientSummary;
    use serde_json::json;

    const Q: EnvelopeConfig = EnvelopeConfig::new(AppliedFilterKey::Q);

    #[test]
    fn decodes_envelope_with_configured_filter_key() {
        let body = json!({
            "code": "OK",
            "data": [{"name": "Maria", "code": "1"}],
            "offset": 10, "max": 10, "total": 30, "count": 11,
            "prev": "/api/v1/patient/?offset=0&max=10",
            "next": null,
            "q": "maria",
            "filter": "ignored"
        });

        let page: CollectionPage<PatientSummary> = CollectionPage::from_envelope(body, Q).unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.applied_filter, "maria");
        assert_eq!(
            page.prev.as_ref().map(Locator::as_str),
            Some("/api/v1/patient/?offset=0&max=10")
        );
        assert_eq!(page.next, None);
        assert_eq!(page.page_number(), 2);
    }

    #[test]
    fn filter_key_variant_reads_filter_member() {
        let body = json!({
            "data": [], "offset": 0, "max": 20, "total": 0, "count": 0,
            "filter": "x", "q": "y"
        });
        let page: CollectionPage<PatientSummary> =
            CollectionPage::from_envelope(body, EnvelopeConfig::new(AppliedFilterKey::Filter))
                .unwrap();
        assert_eq!(page.applied_filter, "x");
    }

    #[test]
    fn null_applied_filter_reads_as_empty() {
        let body = json!({"data": [], "offset": 0, "max": 20, "count": 0, "q": null});
        let page: CollectionPage<PatientSummary> = CollectionPage::from_envelope(body, Q).unwrap();
        assert_eq!(page.applied_filter, "");
    }

    #[test]
    fn rejects_more_items_than_max() {
        let body = json!({"data": [{}, {}, {}], "offset": 0, "max": 2, "count": 3});
        let err = CollectionPage::<PatientSummary>::from_envelope(body, Q).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn rejects_items_past_count() {
        let body = json!({"data": [{}, {}], "offset": 9, "max": 10, "count": 10});
        let err = CollectionPage::<PatientSummary>::from_envelope(body, Q).unwrap_err();
        assert!(matches!(err, ApiError::Decode(msg) if msg.contains("exceeds count")));
    }

    #[test]
    fn rejects_offset_that_overflows() {
        let body = json!({"data": [{}], "offset": u64::MAX, "max": 10, "count": 5});
        let err = CollectionPage::<PatientSummary>::from_envelope(body, Q).unwrap_err();
        assert!(matches!(err, ApiError::Decode(msg) if msg.contains("out of range")));
    }

    #[test]
    fn rejects_zero_page_size() {
        let body = json!({"data": [], "offset": 0, "max": 0, "count": 0});
        assert!(CollectionPage::<PatientSummary>::from_envelope(body, Q).is_err());
    }
}
