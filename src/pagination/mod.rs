//! Paginated collection browsing shared by the patient and transfusion lists.
//!
//! [`CollectionQuery`] builds request locators, [`CollectionPage`] decodes the
//! server envelope, [`Cursor`] derives prev/next availability and
//! [`CollectionBrowser`] ties them together behind a single-flight fetcher.

use thiserror::Error;

use crate::api::ApiError;

pub mod browser;
pub mod cursor;
pub mod locator;
pub mod page;
pub mod query;

pub use browser::{BrowserConfig, BrowserState, CollectionBrowser, FetchOutcome, KeyPress};
pub use cursor::Cursor;
pub use locator::Locator;
pub use page::{AppliedFilterKey, CollectionPage, EnvelopeConfig};
pub use query::{CollectionQuery, exact_match_locator};

/// Message shown when a page could not be loaded.
pub const FETCH_FAILED_MESSAGE: &str =
    "Ocorreu um erro ao realizar sua consulta, por favor contacte o administrador";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("failed to fetch collection page: {0}")]
    FetchFailed(ApiError),

    #[error("authentication required")]
    AuthenticationRequired,

    #[error("failed to encode query: {0}")]
    Encode(String),
}
