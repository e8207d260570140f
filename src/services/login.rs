use crate::api::{ApiError, ApiReader, CURRENT_USER_ENDPOINT, decode_member};
use crate::domain::user::CurrentUser;
use crate::dto::login::LoginPageData;
use crate::pagination::Locator;
use crate::routes::{Navigation, Route};
use crate::session::Session;

/// Entry point of the login view.
///
/// Users already known to the session go straight to the dashboard. Others
/// are probed once more against the API. A user returned by the probe is
/// recorded on the session before redirecting; a 403 means the identity
/// provider accepted them but this application does not.
pub async fn enter_login<A>(api: &A, session: &Session) -> Navigation<LoginPageData>
where
    A: ApiReader + ?Sized,
{
    let snapshot = session.snapshot();
    if !snapshot.need_login {
        return Navigation::Redirect(Route::Dashboard);
    }

    let mut page = LoginPageData {
        login_url: snapshot.login_url,
        forbidden: false,
    };
    let probe = api.get(&Locator::from(CURRENT_USER_ENDPOINT)).await;
    match probe.and_then(|body| decode_member::<CurrentUser>(body, "user")) {
        Ok(user) => {
            session.authenticate(user);
            return Navigation::Redirect(Route::Dashboard);
        }
        Err(ApiError::Forbidden) => page.forbidden = true,
        Err(err) => log::info!("Login required: {err}"),
    }
    Navigation::Render(page)
}
