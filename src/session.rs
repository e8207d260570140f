//! Session context shared by every controller.
//!
//! A [`Session`] is established once per process and cloned into each
//! controller. Controllers read it through [`Session::snapshot`] and write to
//! it only through the notification methods and [`Session::expire`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::Value;

use crate::api::{
    ApiReader, CURRENT_USER_ENDPOINT, GOOGLE_LOGIN_ENDPOINT, GOOGLE_LOGOUT_ENDPOINT, decode_member,
};
use crate::domain::user::CurrentUser;
use crate::pagination::Locator;
use crate::services::{ServiceError, ServiceResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Error,
    Warning,
    Success,
    Info,
}

impl NotificationKind {
    /// Style class of the message box.
    pub const fn css_class(self) -> &'static str {
        match self {
            NotificationKind::Error => "box-danger",
            NotificationKind::Warning => "box-warning",
            NotificationKind::Success => "box-success",
            NotificationKind::Info => "box-info",
        }
    }
}

/// User-facing message. Only the latest one is kept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub title: Option<String>,
}

/// Read-only view of who is logged in and where to send them to log in/out.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub user: Option<CurrentUser>,
    pub need_login: bool,
    pub login_url: Option<String>,
    pub logout_url: Option<String>,
}

#[derive(Default)]
struct SessionInner {
    snapshot: Mutex<SessionSnapshot>,
    notification: Mutex<Option<Notification>>,
}

#[derive(Clone, Default)]
pub struct Session {
    inner: Arc<SessionInner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn continue_locator(endpoint: &str, origin: &str) -> Option<Locator> {
    match serde_html_form::to_string([("continue", origin)]) {
        Ok(query) => Some(Locator::new(format!("{endpoint}?{query}"))),
        Err(err) => {
            log::error!("Failed to encode continue origin {origin}: {err}");
            None
        }
    }
}

/// Asks the identity endpoint for a redirect URL, read from its `continue` member.
async fn identity_url<A>(api: &A, endpoint: &str, origin: &str) -> Option<String>
where
    A: ApiReader + ?Sized,
{
    let locator = continue_locator(endpoint, origin)?;
    match api.get(&locator).await {
        Ok(body) => body
            .get("continue")
            .and_then(Value::as_str)
            .map(str::to_string),
        Err(err) => {
            log::warn!("Failed to load identity URL from {endpoint}: {err}");
            None
        }
    }
}

impl Session {
    /// Loads the current user and the login/logout URLs concurrently.
    ///
    /// Each request settles on its own: a failed user lookup marks the
    /// session as needing login without discarding the URLs, and vice versa.
    pub async fn establish<A>(api: &A, origin: &str) -> Self
    where
        A: ApiReader + ?Sized,
    {
        let me_locator = Locator::from(CURRENT_USER_ENDPOINT);
        let (me, login_url, logout_url) = tokio::join!(
            api.get(&me_locator),
            identity_url(api, GOOGLE_LOGIN_ENDPOINT, origin),
            identity_url(api, GOOGLE_LOGOUT_ENDPOINT, origin),
        );

        let user = match me.and_then(|body| decode_member::<CurrentUser>(body, "user")) {
            Ok(user) => Some(user),
            Err(err) => {
                log::info!("No authenticated user: {err}");
                None
            }
        };

        let snapshot = SessionSnapshot {
            need_login: user.is_none(),
            user,
            login_url,
            logout_url,
        };
        Self::from_snapshot(snapshot)
    }

    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                snapshot: Mutex::new(snapshot),
                notification: Mutex::new(None),
            }),
        }
    }

    /// Session with nobody logged in.
    pub fn anonymous() -> Self {
        Self::from_snapshot(SessionSnapshot {
            need_login: true,
            ..SessionSnapshot::default()
        })
    }

    pub fn with_user(user: CurrentUser) -> Self {
        Self::from_snapshot(SessionSnapshot {
            user: Some(user),
            ..SessionSnapshot::default()
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        lock(&self.inner.snapshot).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        let snapshot = lock(&self.inner.snapshot);
        !snapshot.need_login && snapshot.user.is_some()
    }

    /// Gate for controllers that must not mount without a user.
    pub fn require_login(&self) -> ServiceResult<()> {
        if lock(&self.inner.snapshot).need_login {
            return Err(ServiceError::AuthenticationRequired);
        }
        Ok(())
    }

    /// Records the user the server just confirmed, e.g. from the login probe.
    pub fn authenticate(&self, user: CurrentUser) {
        let mut snapshot = lock(&self.inner.snapshot);
        snapshot.user = Some(user);
        snapshot.need_login = false;
    }

    /// Drops the user after the server rejected our credentials.
    pub fn expire(&self) {
        let mut snapshot = lock(&self.inner.snapshot);
        snapshot.user = None;
        snapshot.need_login = true;
    }

    pub fn notify<M: Into<String>>(&self, kind: NotificationKind, message: M, title: Option<&str>) {
        let notification = Notification {
            kind,
            message: message.into(),
            title: title.map(str::to_string),
        };
        *lock(&self.inner.notification) = Some(notification);
    }

    pub fn show_error<M: Into<String>>(&self, message: M, title: Option<&str>) {
        self.notify(NotificationKind::Error, message, title);
    }

    pub fn show_warning<M: Into<String>>(&self, message: M, title: Option<&str>) {
        self.notify(NotificationKind::Warning, message, title);
    }

    pub fn show_success<M: Into<String>>(&self, message: M, title: Option<&str>) {
        self.notify(NotificationKind::Success, message, title);
    }

    pub fn show_info<M: Into<String>>(&self, message: M, title: Option<&str>) {
        self.notify(NotificationKind::Info, message, title);
    }

    /// Current notification, left in place.
    pub fn notification(&self) -> Option<Notification> {
        lock(&self.inner.notification).clone()
    }

    /// Removes and returns the current notification once the view has shown it.
    pub fn take_notification(&self) -> Option<Notification> {
        lock(&self.inner.notification).take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::api::mock::MockApi;
    use serde_json::json;

    fn identity_mock(me: Result<Value, ApiError>) -> MockApi {
        let mut api = MockApi::new();
        api.expect_get()
            .withf(|locator| locator.as_str() == CURRENT_USER_ENDPOINT)
            .times(1)
            .returning(move |_| me.clone());
        api.expect_get()
            .withf(|locator| {
                locator.as_str()
                    == "/api/v1/user/login/google?continue=https%3A%2F%2Frt.example.org"
            })
            .times(1)
            .returning(|_| Ok(json!({"continue": "https://accounts.example.com/login"})));
        api.expect_get()
            .withf(|locator| locator.as_str().starts_with(GOOGLE_LOGOUT_ENDPOINT))
            .times(1)
            .returning(|_| Ok(json!({"continue": "https://accounts.example.com/logout"})));
        api
    }

    #[tokio::test]
    async fn establish_loads_user_and_identity_urls() {
        let api = identity_mock(Ok(json!({
            "code": "OK",
            "data": {"user": {"userid": "42", "email": "ana@example.org", "admin": true}}
        })));

        let session = Session::establish(&api, "https://rt.example.org").await;
        let snapshot = session.snapshot();

        assert!(!snapshot.need_login);
        assert_eq!(snapshot.user.map(|u| u.email), Some("ana@example.org".to_string()));
        assert_eq!(
            snapshot.login_url.as_deref(),
            Some("https://accounts.example.com/login")
        );
        assert!(session.require_login().is_ok());
    }

    /// A failed user lookup still keeps the login URL so the login page can link to it.
    #[tokio::test]
    async fn establish_without_user_needs_login() {
        let api = identity_mock(Err(ApiError::Unauthorized));

        let session = Session::establish(&api, "https://rt.example.org").await;
        let snapshot = session.snapshot();

        assert!(snapshot.need_login);
        assert!(snapshot.user.is_none());
        assert!(snapshot.login_url.is_some());
        assert!(matches!(
            session.require_login(),
            Err(ServiceError::AuthenticationRequired)
        ));
    }

    #[test]
    fn latest_notification_wins() {
        let session = Session::anonymous();
        session.show_info("first", None);
        session.show_error("second", Some("Erro"));

        let shown = session.take_notification().expect("notification set");
        assert_eq!(shown.kind, NotificationKind::Error);
        assert_eq!(shown.message, "second");
        assert_eq!(shown.title.as_deref(), Some("Erro"));
        assert_eq!(shown.kind.css_class(), "box-danger");
        assert!(session.take_notification().is_none());
    }

    #[test]
    fn authenticate_is_undone_by_expire() {
        let session = Session::anonymous();
        let user = CurrentUser {
            email: "ana@example.org".to_string(),
            ..CurrentUser::default()
        };

        session.authenticate(user.clone());
        assert!(session.is_authenticated());
        assert_eq!(session.snapshot().user, Some(user));

        session.expire();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn expire_clears_user_for_every_clone() {
        let session = Session::with_user(CurrentUser::default());
        let clone = session.clone();
        assert!(clone.require_login().is_ok());

        session.expire();

        assert!(clone.snapshot().need_login);
        assert!(clone.snapshot().user.is_none());
    }
}
