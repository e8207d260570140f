//! Patient list, registration, editing and deletion.

use std::num::NonZeroUsize;
use std::sync::Arc;

use validator::Validate;

use crate::api::{
    ApiError, ApiReader, ApiWriter, BLOOD_TYPES_ENDPOINT, PATIENT_ENDPOINT,
    PATIENT_TYPES_ENDPOINT, record_path, take_data,
};
use crate::domain::patient::{NewPatient, Patient, PatientSummary, UpdatePatient};
use crate::domain::types::RecordKey;
use crate::dto::DeleteOutcome;
use crate::dto::patients::{EditPatientPageData, NewPatientPageData};
use crate::forms::patient::{EditPatientForm, NewPatientForm};
use crate::models::patient::{PatientData, PatientPayload};
use crate::pagination::{
    AppliedFilterKey, BrowserConfig, CollectionBrowser, EnvelopeConfig, Locator,
};
use crate::routes::{Navigation, Route};
use crate::services::{
    ServiceError, ServiceResult, ensure_unique_code, fetch_member, redirect_on_auth,
    report_failure, settle,
};
use crate::session::Session;

/// Field selectors the patient list asks for.
pub const PATIENT_LIST_FIELDS: [&str; 2] = ["name", "code"];

pub type PatientBrowser<A> = CollectionBrowser<PatientSummary, A>;

pub fn patient_list_config(page_size: NonZeroUsize) -> BrowserConfig {
    BrowserConfig {
        endpoint: format!("{PATIENT_ENDPOINT}/"),
        page_size,
        fields: PATIENT_LIST_FIELDS.iter().map(|f| f.to_string()).collect(),
        envelope: EnvelopeConfig::new(AppliedFilterKey::Q),
    }
}

/// Mounts the patient list and loads its first page.
///
/// A failed first page still mounts the view with the error notification set;
/// only a missing login redirects.
pub async fn mount_patient_list<A>(
    api: Arc<A>,
    session: &Session,
    page_size: NonZeroUsize,
) -> ServiceResult<Navigation<CollectionBrowser<PatientSummary, A>>>
where
    A: ApiReader + ?Sized,
{
    if session.require_login().is_err() {
        return Ok(Navigation::Redirect(Route::Login));
    }

    let browser = CollectionBrowser::new(api, session.clone(), patient_list_config(page_size));
    match browser.load().await {
        Ok(_) => Ok(Navigation::Render(browser)),
        Err(err) => match ServiceError::from(err) {
            ServiceError::AuthenticationRequired => Ok(Navigation::Redirect(Route::Login)),
            err => {
                log::error!("Patient list mounted without data: {err}");
                Ok(Navigation::Render(browser))
            }
        },
    }
}

/// Loads one patient by storage key.
///
/// The endpoint has answered both with the record and with a one-element
/// list; an empty list counts as not found.
pub(crate) async fn fetch_patient<A>(api: &A, key: &RecordKey) -> ServiceResult<Patient>
where
    A: ApiReader + ?Sized,
{
    let locator = Locator::new(record_path(PATIENT_ENDPOINT, key.as_str()));
    let data = take_data(api.get(&locator).await?)?;
    let wire: PatientData = serde_json::from_value(data).map_err(ApiError::from)?;
    let wire = wire.into_first().ok_or(ServiceError::RecordNotFound)?;
    Patient::try_from(wire).map_err(|err| ServiceError::Api(ApiError::Decode(err.to_string())))
}

/// Loads both lookup lists for the registration form.
///
/// Whatever loads is kept; the form defaults to the first entry of each list.
pub async fn load_new_patient_form<A>(
    api: &A,
    session: &Session,
) -> ServiceResult<Navigation<NewPatientPageData>>
where
    A: ApiReader + ?Sized,
{
    if session.require_login().is_err() {
        return Ok(Navigation::Redirect(Route::Login));
    }

    let result: ServiceResult<Navigation<NewPatientPageData>> = async {
        let (blood_types, patient_types) = tokio::join!(
            fetch_member::<_, Vec<String>>(api, BLOOD_TYPES_ENDPOINT, "types"),
            fetch_member::<_, Vec<String>>(api, PATIENT_TYPES_ENDPOINT, "types"),
        );
        let mut failed = false;
        let blood_types = settle("blood types", blood_types, &mut failed)?.unwrap_or_default();
        let patient_types =
            settle("patient types", patient_types, &mut failed)?.unwrap_or_default();

        Ok(Navigation::Render(NewPatientPageData {
            form: NewPatientForm::with_defaults(&blood_types, &patient_types),
            blood_types,
            patient_types,
            failed,
        }))
    }
    .await;

    redirect_on_auth(session, result)
}

/// Registers a patient after checking its record code is free.
///
/// A taken code is reported on the session and nothing is posted.
pub async fn create_patient<A>(
    api: &A,
    session: &Session,
    form: &NewPatientForm,
) -> ServiceResult<Route>
where
    A: ApiReader + ApiWriter + ?Sized,
{
    session.require_login()?;

    if let Err(err) = form.validate() {
        log::error!("Failed to validate form: {err}");
        return Err(ServiceError::Form("Erro de validação do formulário".to_string()));
    }
    let patient = NewPatient::try_from(form).map_err(|err| {
        log::error!("Failed to read patient form: {err}");
        ServiceError::from(err)
    })?;

    let failure = "Paciente não pode ser cadastrado. contate o administrador";
    ensure_unique_code(api, session, PATIENT_ENDPOINT, &patient.code, failure).await?;

    let body = serde_json::to_value(PatientPayload::from(&patient)).map_err(ApiError::from)?;
    api.post(PATIENT_ENDPOINT, &body)
        .await
        .map_err(|err| report_failure(session, err, failure))?;

    session.show_success(
        format!("Paciente '{}' cadastrado", patient.name),
        Some("Sucesso"),
    );
    Ok(Route::Patients)
}

/// Loads the edit form for the patient stored under `key`.
///
/// An unknown key shows a warning and sends the user back to the list.
pub async fn load_patient_edit<A>(
    api: &A,
    session: &Session,
    key: &RecordKey,
) -> ServiceResult<Navigation<EditPatientPageData>>
where
    A: ApiReader + ?Sized,
{
    if session.require_login().is_err() {
        return Ok(Navigation::Redirect(Route::Login));
    }

    let result: ServiceResult<Navigation<EditPatientPageData>> = async {
        let (blood_types, patient_types, patient) = tokio::join!(
            fetch_member::<_, Vec<String>>(api, BLOOD_TYPES_ENDPOINT, "types"),
            fetch_member::<_, Vec<String>>(api, PATIENT_TYPES_ENDPOINT, "types"),
            fetch_patient(api, key),
        );

        let patient = match patient {
            Ok(patient) => patient,
            Err(ServiceError::RecordNotFound) => {
                log::warn!("Patient {key} not found");
                session.show_warning("Paciente não encontrado", Some("Não encontrado"));
                return Ok(Navigation::Redirect(Route::Patients));
            }
            Err(err) => {
                log::error!("Failed to load patient {key}: {err}");
                if !matches!(err, ServiceError::AuthenticationRequired) {
                    session.show_error(
                        "Paciente não pode ser carregado. contate o administrador",
                        Some("Erro"),
                    );
                }
                return Err(err);
            }
        };

        let mut failed = false;
        let blood_types = settle("blood types", blood_types, &mut failed)?.unwrap_or_default();
        let patient_types =
            settle("patient types", patient_types, &mut failed)?.unwrap_or_default();

        Ok(Navigation::Render(EditPatientPageData {
            blood_types,
            patient_types,
            form: EditPatientForm::from(&patient),
            failed,
        }))
    }
    .await;

    redirect_on_auth(session, result)
}

/// Saves an edited patient.
pub async fn save_patient<A>(
    api: &A,
    session: &Session,
    form: &EditPatientForm,
) -> ServiceResult<Route>
where
    A: ApiWriter + ?Sized,
{
    session.require_login()?;

    if let Err(err) = form.validate() {
        log::error!("Failed to validate form: {err}");
        return Err(ServiceError::Form("Erro de validação do formulário".to_string()));
    }
    let patient = UpdatePatient::try_from(form)?;

    let body = serde_json::to_value(PatientPayload::from(&patient)).map_err(ApiError::from)?;
    api.put(PATIENT_ENDPOINT, &body).await.map_err(|err| {
        report_failure(
            session,
            err,
            "Paciente não pode ser atualizado. contate o administrador",
        )
    })?;

    session.show_success(
        format!("Paciente '{}' atualizado", patient.name),
        Some("Salvo"),
    );
    Ok(Route::Patients)
}

/// Deletes a patient confirmed in the delete dialog.
///
/// Success is decided by the response status alone.
pub async fn delete_patient<A>(api: &A, record: PatientSummary) -> DeleteOutcome<PatientSummary>
where
    A: ApiWriter + ?Sized,
{
    let Some(key) = record.key.as_deref().filter(|k| !k.trim().is_empty()) else {
        log::error!("Cannot delete patient {} without a key", record.code);
        return DeleteOutcome {
            success: false,
            record,
        };
    };

    let success = match api.delete(&record_path(PATIENT_ENDPOINT, key)).await {
        Ok(()) => true,
        Err(err) => {
            log::error!("Failed to delete patient {key}: {err}");
            false
        }
    };
    DeleteOutcome { success, record }
}
