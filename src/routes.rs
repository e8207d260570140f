//! Navigation targets returned by controllers.

use std::fmt::{Display, Formatter};

use crate::domain::types::RecordKey;

/// Views a controller can send the user to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Login,
    Patients,
    NewPatient,
    EditPatient(RecordKey),
    Transfusions,
    /// Optionally preselects the patient the transfusion belongs to.
    NewTransfusion(Option<RecordKey>),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Dashboard => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Patients => "/patient".to_string(),
            Route::NewPatient => "/patient/new".to_string(),
            Route::EditPatient(key) => format!("/patient/{key}/edit"),
            Route::Transfusions => "/transfusion".to_string(),
            Route::NewTransfusion(None) => "/transfusion/new".to_string(),
            Route::NewTransfusion(Some(key)) => format!("/patient/{key}/transfusion/new"),
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Either data for the requested view or a redirect elsewhere.
#[derive(Clone, Debug, PartialEq)]
pub enum Navigation<T> {
    Render(T),
    Redirect(Route),
}

impl<T> Navigation<T> {
    pub fn redirect_target(&self) -> Option<&Route> {
        match self {
            Navigation::Redirect(route) => Some(route),
            Navigation::Render(_) => None,
        }
    }

    pub fn into_rendered(self) -> Option<T> {
        match self {
            Navigation::Render(data) => Some(data),
            Navigation::Redirect(_) => None,
        }
    }
}
