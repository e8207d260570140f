//! Forms filled in by the user, validated before any request is made.

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod patient;
pub mod transfusion;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid record code")]
    InvalidCode,

    #[error("invalid name")]
    InvalidName,

    #[error("invalid record key")]
    InvalidKey,

    #[error("invalid local")]
    InvalidLocal,

    #[error("no patient selected")]
    MissingPatient,

    #[error("invalid choice: {0}")]
    InvalidChoice(String),
}

impl From<TypeConstraintError> for FormError {
    fn from(err: TypeConstraintError) -> Self {
        match err {
            TypeConstraintError::InvalidValue(value) => FormError::InvalidChoice(value),
            TypeConstraintError::InvalidCode => FormError::InvalidCode,
            TypeConstraintError::EmptyString => FormError::InvalidName,
        }
    }
}
