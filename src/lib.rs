//! Client-side controllers for the patient and blood-transfusion records
//! application.
//!
//! Controllers in [`services`] talk to the REST API through the traits in
//! [`api`], report to the user through the injected [`session::Session`] and
//! hand views plain data from [`dto`]. The list views share one
//! [`pagination::CollectionBrowser`].

pub mod api;
pub mod domain;
pub mod dto;
pub mod error_conversions;
pub mod forms;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod session;
