use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// User returned by `/api/v1/user/me`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct CurrentUser {
    #[serde(default)]
    pub userid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub authorized: bool,
    #[serde(default)]
    pub added_at: Option<String>,
}

impl CurrentUser {
    /// Parses `added_at`, accepting RFC 3339 and the naive formats the API emits.
    pub fn since(&self) -> Option<NaiveDateTime> {
        let raw = self.added_at.as_deref()?.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.naive_utc());
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%a, %d %b %Y %H:%M:%S GMT"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    }

    /// Name to greet the user with, falling back to the email address.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn user_added_at(raw: &str) -> CurrentUser {
        CurrentUser {
            email: "nurse@example.com".into(),
            added_at: Some(raw.into()),
            ..CurrentUser::default()
        }
    }

    #[test]
    fn since_accepts_supported_formats() {
        let expected = NaiveDate::from_ymd_opt(2016, 2, 3)
            .unwrap()
            .and_hms_opt(10, 20, 30)
            .unwrap();

        assert_eq!(user_added_at("2016-02-03T10:20:30").since(), Some(expected));
        assert_eq!(user_added_at("2016-02-03 10:20:30").since(), Some(expected));
        assert_eq!(user_added_at("2016-02-03T10:20:30Z").since(), Some(expected));
        assert_eq!(
            user_added_at("Wed, 03 Feb 2016 10:20:30 GMT").since(),
            Some(expected)
        );
        assert_eq!(user_added_at("yesterday").since(), None);
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let mut user = user_added_at("");
        assert_eq!(user.display_name(), "nurse@example.com");
        user.name = Some("Ana".into());
        assert_eq!(user.display_name(), "Ana");
    }
}
