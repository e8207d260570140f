//! Wire models exchanged with the REST API, plus the client configuration.

pub mod config;
pub mod patient;
pub mod transfusion;
