//! Turns list input fields into collection request locators.

use std::num::NonZeroUsize;

use serde::Serialize;

use crate::pagination::{Locator, PaginationError};

/// Request shape of a collection endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionQuery {
    pub offset: usize,
    pub max: NonZeroUsize,
    pub filter_text: String,
    /// Field selectors, comma-joined on the wire.
    pub fields: Vec<String>,
}

#[derive(Serialize)]
struct CollectionParams<'a> {
    offset: usize,
    max: usize,
    q: &'a str,
    fields: String,
}

#[derive(Serialize)]
struct ExactMatchParams<'a> {
    exact: bool,
    q: &'a str,
    fields: &'a str,
}

impl CollectionQuery {
    /// First page with an empty filter.
    pub fn new<I, S>(max: NonZeroUsize, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            offset: 0,
            max,
            filter_text: String::new(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Encodes `offset`, `max`, `q` and `fields` in that order.
    ///
    /// The result depends on nothing but the query and the endpoint, so equal
    /// inputs always produce byte-identical locators.
    pub fn build_locator(&self, endpoint: &str) -> Result<Locator, PaginationError> {
        let params = CollectionParams {
            offset: self.offset,
            max: self.max.get(),
            q: &self.filter_text,
            fields: self.fields.join(","),
        };
        let query = serde_html_form::to_string(&params)
            .map_err(|e| PaginationError::Encode(e.to_string()))?;
        Ok(Locator::new(format!("{endpoint}?{query}")))
    }
}

/// Locator of the duplicate-key precheck: `exact=true&q=<key>&fields=<key_field>`.
pub fn exact_match_locator(
    endpoint: &str,
    key: &str,
    key_field: &str,
) -> Result<Locator, PaginationError> {
    let params = ExactMatchParams {
        exact: true,
        q: key,
        fields: key_field,
    };
    let query =
        serde_html_form::to_string(&params).map_err(|e| PaginationError::Encode(e.to_string()))?;
    Ok(Locator::new(format!("{endpoint}?{query}")))
}
