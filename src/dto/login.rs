use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoginPageData {
    pub login_url: Option<String>,
    /// Logged in with the identity provider but not allowed in.
    pub forbidden: bool,
}
