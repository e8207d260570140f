//! Transfusion list, registration form, patient typeahead and deletion.

use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::NaiveDate;
use validator::Validate;

use crate::api::{
    ApiError, ApiReader, ApiWriter, BLOOD_CONTENTS_ENDPOINT, BLOOD_TYPES_ENDPOINT,
    LOCALS_ENDPOINT, PATIENT_ENDPOINT, TRANSFUSION_ENDPOINT, record_path, take_data,
};
use crate::domain::patient::PatientSummary;
use crate::domain::transfusion::{NewTransfusion, TransfusionSummary};
use crate::domain::types::RecordKey;
use crate::dto::DeleteOutcome;
use crate::dto::transfusions::{NewTransfusionPageData, PatientSuggestion};
use crate::forms::transfusion::NewTransfusionForm;
use crate::models::transfusion::NewTransfusionPayload;
use crate::pagination::{
    AppliedFilterKey, BrowserConfig, CollectionBrowser, CollectionQuery, EnvelopeConfig,
};
use crate::routes::{Navigation, Route};
use crate::services::patients::fetch_patient;
use crate::services::{
    ServiceError, ServiceResult, ensure_unique_code, fetch_member, redirect_on_auth,
    report_failure, settle,
};
use crate::session::Session;

pub const TRANSFUSION_LIST_FIELDS: [&str; 3] = ["patient.name", "code", "patient.code"];

/// Entries offered by the patient typeahead.
pub const SUGGESTION_LIMIT: usize = 10;

pub type TransfusionBrowser<A> = CollectionBrowser<TransfusionSummary, A>;

pub fn transfusion_list_config(page_size: NonZeroUsize) -> BrowserConfig {
    BrowserConfig {
        endpoint: TRANSFUSION_ENDPOINT.to_string(),
        page_size,
        fields: TRANSFUSION_LIST_FIELDS.iter().map(|f| f.to_string()).collect(),
        envelope: EnvelopeConfig::new(AppliedFilterKey::Q),
    }
}

/// Mounts the transfusion list and loads its first page.
pub async fn mount_transfusion_list<A>(
    api: Arc<A>,
    session: &Session,
    page_size: NonZeroUsize,
) -> ServiceResult<Navigation<CollectionBrowser<TransfusionSummary, A>>>
where
    A: ApiReader + ?Sized,
{
    if session.require_login().is_err() {
        return Ok(Navigation::Redirect(Route::Login));
    }

    let browser =
        CollectionBrowser::new(api, session.clone(), transfusion_list_config(page_size));
    match browser.load().await.map_err(ServiceError::from) {
        Err(ServiceError::AuthenticationRequired) => Ok(Navigation::Redirect(Route::Login)),
        Err(err) => {
            log::error!("Transfusion list mounted without data: {err}");
            Ok(Navigation::Render(browser))
        }
        Ok(_) => Ok(Navigation::Render(browser)),
    }
}

/// Loads the lookup lists, and the patient when one is preselected.
///
/// `today` becomes the default date. An unknown patient shows a warning and
/// sends the user to the transfusion list.
pub async fn load_new_transfusion_form<A>(
    api: &A,
    session: &Session,
    patient_key: Option<&RecordKey>,
    today: NaiveDate,
) -> ServiceResult<Navigation<NewTransfusionPageData>>
where
    A: ApiReader + ?Sized,
{
    if session.require_login().is_err() {
        return Ok(Navigation::Redirect(Route::Login));
    }

    let result: ServiceResult<Navigation<NewTransfusionPageData>> = async {
        let patient = async {
            match patient_key {
                Some(key) => Some(fetch_patient(api, key).await),
                None => None,
            }
        };
        let (blood_types, locals, blood_contents, patient) = tokio::join!(
            fetch_member::<_, Vec<String>>(api, BLOOD_TYPES_ENDPOINT, "types"),
            fetch_member::<_, Vec<String>>(api, LOCALS_ENDPOINT, "locals"),
            fetch_member::<_, Vec<String>>(api, BLOOD_CONTENTS_ENDPOINT, "contents"),
            patient,
        );

        let mut failed = false;
        let patient = match patient {
            None => None,
            Some(Err(ServiceError::RecordNotFound)) => {
                log::warn!("Patient {patient_key:?} not found");
                session.show_warning("Paciente não encontrado", Some("Não encontrado"));
                return Ok(Navigation::Redirect(Route::Transfusions));
            }
            Some(result) => settle("patient", result, &mut failed)?,
        };

        let blood_types = settle("blood types", blood_types, &mut failed)?.unwrap_or_default();
        let locals = settle("locals", locals, &mut failed)?.unwrap_or_default();
        let blood_contents =
            settle("blood contents", blood_contents, &mut failed)?.unwrap_or_default();

        let form = NewTransfusionForm::with_defaults(
            &locals,
            today,
            patient.as_ref().map(PatientSummary::from),
        );
        Ok(Navigation::Render(NewTransfusionPageData {
            blood_types,
            blood_contents,
            locals,
            form,
            failed,
        }))
    }
    .await;

    redirect_on_auth(session, result)
}

/// Records a transfusion after checking its code is free.
pub async fn create_transfusion<A>(
    api: &A,
    session: &Session,
    form: &NewTransfusionForm,
) -> ServiceResult<Route>
where
    A: ApiReader + ApiWriter + ?Sized,
{
    session.require_login()?;

    if let Err(err) = form.validate() {
        log::error!("Failed to validate form: {err}");
        return Err(ServiceError::Form("Erro de validação do formulário".to_string()));
    }
    let transfusion = NewTransfusion::try_from(form).map_err(|err| {
        log::error!("Failed to read transfusion form: {err}");
        ServiceError::from(err)
    })?;

    let failure = "Transfusão não pode ser cadastrada. contate o administrador";
    ensure_unique_code(api, session, TRANSFUSION_ENDPOINT, &transfusion.code, failure).await?;

    let body = serde_json::to_value(NewTransfusionPayload::from(&transfusion))
        .map_err(ApiError::from)?;
    api.post(TRANSFUSION_ENDPOINT, &body)
        .await
        .map_err(|err| report_failure(session, err, failure))?;

    session.show_success(
        format!("Transfusão para '{}' cadastrada", transfusion.patient_name),
        Some("Sucesso"),
    );
    Ok(Route::Transfusions)
}

/// Patients matching `text` for the typeahead, shown as `code | name` with
/// accents stripped from the name.
pub async fn suggest_patients<A>(api: &A, text: &str) -> ServiceResult<Vec<PatientSuggestion>>
where
    A: ApiReader + ?Sized,
{
    let query = CollectionQuery {
        filter_text: text.to_string(),
        ..CollectionQuery::new(
            NonZeroUsize::new(SUGGESTION_LIMIT).unwrap_or(NonZeroUsize::MIN),
            ["name", "code"],
        )
    };
    let locator = query.build_locator(&format!("{PATIENT_ENDPOINT}/"))?;

    let body = api.get(&locator).await.map_err(|err| {
        log::error!("Failed to load patient suggestions: {err}");
        err
    })?;
    let patients: Vec<PatientSummary> =
        serde_json::from_value(take_data(body)?).map_err(ApiError::from)?;

    Ok(patients.into_iter().map(PatientSuggestion::from).collect())
}

/// Deletes a transfusion confirmed in the delete dialog.
pub async fn delete_transfusion<A>(
    api: &A,
    record: TransfusionSummary,
) -> DeleteOutcome<TransfusionSummary>
where
    A: ApiWriter + ?Sized,
{
    let Some(key) = record.key.as_deref().filter(|k| !k.trim().is_empty()) else {
        log::error!("Cannot delete transfusion {} without a key", record.code);
        return DeleteOutcome {
            success: false,
            record,
        };
    };

    let success = api
        .delete(&record_path(TRANSFUSION_ENDPOINT, key))
        .await
        .map_err(|err| log::error!("Failed to delete transfusion {key}: {err}"))
        .is_ok();
    DeleteOutcome { success, record }
}
