//! Conversions from lower-level errors into [`ServiceError`].

use crate::api::ApiError;
use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::pagination::PaginationError;
use crate::services::ServiceError;

impl From<ApiError> for ServiceError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized | ApiError::Forbidden => ServiceError::AuthenticationRequired,
            ApiError::NotFound => ServiceError::RecordNotFound,
            other => ServiceError::Api(other),
        }
    }
}

impl From<PaginationError> for ServiceError {
    fn from(err: PaginationError) -> Self {
        match err {
            PaginationError::FetchFailed(api) => ServiceError::CollectionFetchFailed(api),
            PaginationError::AuthenticationRequired => ServiceError::AuthenticationRequired,
            PaginationError::Encode(msg) => ServiceError::Form(msg),
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        ServiceError::Form(err.to_string())
    }
}

impl From<TypeConstraintError> for ServiceError {
    fn from(err: TypeConstraintError) -> Self {
        ServiceError::Form(err.to_string())
    }
}
