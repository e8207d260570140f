//! Controllers behind each view: patients, transfusions, dashboard and login.
//!
//! Every controller is handed the [`Session`](crate::session::Session) and an
//! API implementation at construction; none of them keep global state.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::api::{ApiError, ApiReader, take_data};
use crate::domain::types::RecordCode;
use crate::pagination::{Locator, exact_match_locator};
use crate::routes::{Navigation, Route};
use crate::session::Session;

pub mod dashboard;
pub mod login;
pub mod patients;
pub mod transfusions;

/// Errors surfaced to the view layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("collection fetch failed: {0}")]
    CollectionFetchFailed(ApiError),

    #[error("a record with code {0} already exists")]
    DuplicateKeyRejected(String),

    #[error("record not found")]
    RecordNotFound,

    #[error("authentication required")]
    AuthenticationRequired,

    #[error("form error: {0}")]
    Form(String),

    #[error("api error: {0}")]
    Api(ApiError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Where the user ends up when a controller fails to mount.
    ///
    /// Only missing authentication leaves the current view; everything else is
    /// shown in place.
    pub fn fallback_route(&self) -> Option<Route> {
        match self {
            ServiceError::AuthenticationRequired => Some(Route::Login),
            _ => None,
        }
    }
}

/// Turns a failed authentication while mounting a view into a login redirect.
pub(crate) fn redirect_on_auth<T>(
    session: &Session,
    result: ServiceResult<Navigation<T>>,
) -> ServiceResult<Navigation<T>> {
    match result {
        Err(ServiceError::AuthenticationRequired) => {
            session.expire();
            Ok(Navigation::Redirect(Route::Login))
        }
        other => other,
    }
}

/// Logs a failed request and tells the user, or expires the session when
/// the server no longer accepts our credentials.
pub(crate) fn report_failure(session: &Session, err: ApiError, message: &str) -> ServiceError {
    log::error!("{message}: {err}");
    let err = ServiceError::from(err);
    match err {
        ServiceError::AuthenticationRequired => session.expire(),
        _ => session.show_error(message, Some("Erro")),
    }
    err
}

/// Folds one branch of a concurrent load into the aggregate.
///
/// Authentication failures abort the whole load; any other failure is logged,
/// recorded in `failed` and leaves the branch empty so the rest still renders.
pub(crate) fn settle<T, E>(
    what: &str,
    result: Result<T, E>,
    failed: &mut bool,
) -> ServiceResult<Option<T>>
where
    E: Into<ServiceError>,
{
    match result.map_err(Into::into) {
        Ok(value) => Ok(Some(value)),
        Err(ServiceError::AuthenticationRequired) => Err(ServiceError::AuthenticationRequired),
        Err(err) => {
            log::error!("Failed to load {what}: {err}");
            *failed = true;
            Ok(None)
        }
    }
}

/// `GET` + `data.<member>` in one step, for the lookup lists.
pub(crate) async fn fetch_member<A, T>(api: &A, path: &str, member: &str) -> Result<T, ApiError>
where
    A: ApiReader + ?Sized,
    T: DeserializeOwned,
{
    let body = api.get(&Locator::from(path)).await?;
    crate::api::decode_member(body, member)
}

/// Looks for an existing record with `code` before creating one.
///
/// The check and the following `POST` are separate requests, so another
/// client may still insert the same code in between.
pub(crate) async fn ensure_unique_code<A>(
    api: &A,
    session: &Session,
    endpoint: &str,
    code: &RecordCode,
    failure_message: &str,
) -> ServiceResult<()>
where
    A: ApiReader + ?Sized,
{
    let locator = exact_match_locator(endpoint, code.as_str(), "code")?;
    let matches = match api.get(&locator).await.and_then(take_data) {
        Ok(Value::Array(items)) => items,
        Ok(Value::Null) => Vec::new(),
        Ok(other) => {
            log::error!("Unexpected precheck payload for {code}: {other}");
            session.show_error(failure_message, Some("Erro"));
            return Err(ServiceError::Api(ApiError::Decode(
                "precheck data is not a list".to_string(),
            )));
        }
        Err(err) => return Err(report_failure(session, err, failure_message)),
    };

    if !matches.is_empty() {
        session.show_error(format!("Código '{code}' duplicado"), Some("Erro"));
        return Err(ServiceError::DuplicateKeyRejected(code.as_str().to_string()));
    }
    Ok(())
}
