//! Domain records exposed by the controller layer.

pub mod patient;
pub mod stats;
pub mod transfusion;
pub mod types;
pub mod user;
