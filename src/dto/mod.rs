//! Data transfer objects handed from controllers to views.

use serde::Serialize;

use crate::pagination::BrowserState;

pub mod dashboard;
pub mod login;
pub mod patients;
pub mod transfusions;

/// Result of a delete confirmation dialog.
///
/// Returned whatever the server answered; the caller decides between an
/// error message and a list reload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteOutcome<R> {
    pub success: bool,
    pub record: R,
}

/// What a list view renders from its browser state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total: usize,
    pub count: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub filter_text: String,
    pub applied_filter: String,
    pub loading: bool,
}

impl<T: Clone> From<&BrowserState<T>> for ListView<T> {
    fn from(state: &BrowserState<T>) -> Self {
        let page = state.last_page.as_ref();
        Self {
            items: state.items().to_vec(),
            page: state.page_number,
            total: page.map_or(0, |p| p.total),
            count: page.map_or(0, |p| p.count),
            has_prev: state.cursor.has_prev,
            has_next: state.cursor.has_next,
            filter_text: state.query.filter_text.clone(),
            applied_filter: page.map(|p| p.applied_filter.clone()).unwrap_or_default(),
            loading: state.loading,
        }
    }
}
