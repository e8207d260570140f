use crate::api::{ApiReader, ApiResult, PATIENT_STATS_ENDPOINT, TRANSFUSION_STATS_ENDPOINT};
use crate::domain::stats::{PatientStats, TransfusionStats};
use crate::dto::dashboard::DashboardData;
use crate::routes::{Navigation, Route};
use crate::services::{ServiceResult, fetch_member, redirect_on_auth, settle};
use crate::session::Session;

/// Loads the landing page counters concurrently.
///
/// A counter that fails to load is left out and `failed` is set; the other
/// one is still shown.
pub async fn load_dashboard<A>(
    api: &A,
    session: &Session,
) -> ServiceResult<Navigation<DashboardData>>
where
    A: ApiReader + ?Sized,
{
    if session.require_login().is_err() {
        return Ok(Navigation::Redirect(Route::Login));
    }

    let (transfusions, patients) = tokio::join!(
        fetch_member::<_, TransfusionStats>(api, TRANSFUSION_STATS_ENDPOINT, "stats"),
        fetch_member::<_, PatientStats>(api, PATIENT_STATS_ENDPOINT, "stats"),
    );

    redirect_on_auth(session, assemble(transfusions, patients))
}

fn assemble(
    transfusions: ApiResult<TransfusionStats>,
    patients: ApiResult<PatientStats>,
) -> ServiceResult<Navigation<DashboardData>> {
    let mut failed = false;
    let transfusions = settle("transfusion stats", transfusions, &mut failed)?;
    let patients = settle("patient stats", patients, &mut failed)?;
    Ok(Navigation::Render(DashboardData {
        no_reaction_percent: transfusions.and_then(|s| s.no_reaction_percent()),
        transfusions,
        patients,
        failed,
    }))
}
