use serde::{Deserialize, Serialize};

/// One bookmark row as stored by the backend.
///
/// `created_at` is an ISO-8601 string; descending lexicographic order matches
/// descending chronological order, which is what the snapshot query relies on.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub user_id: String,
    #[serde(default)]
    pub created_at: String,
}

/// Authenticated user as returned by the hosted auth service.
///
/// Only `id` is load-bearing (row ownership filter); everything else is kept
/// flexible to avoid breaking when backend fields evolve.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct SessionUser {
    pub id: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Value,
}

/// UI color scheme. Persisted to localStorage, applied via the `dark` class
/// on the document element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Theme::Dark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_bookmark_row_deserialize() {
        let json = r#"{
            "id": "b1",
            "title": "Example",
            "url": "https://example.com",
            "user_id": "u1",
            "created_at": "2026-01-02T03:04:05.678Z"
        }"#;
        let b: Bookmark = serde_json::from_str(json).expect("row should parse");
        assert_eq!(b.id, "b1");
        assert_eq!(b.url, "https://example.com");
        assert_eq!(b.user_id, "u1");
    }

    #[test]
    fn test_session_user_tolerates_extra_fields() {
        let json = r#"{
            "id": "u1",
            "email": "u@example.com",
            "aud": "authenticated",
            "app_metadata": {"provider": "email"}
        }"#;
        let u: SessionUser = serde_json::from_str(json).expect("user should parse");
        assert_eq!(u.id, "u1");
        assert_eq!(u.email.as_deref(), Some("u@example.com"));
        assert_eq!(u.extra["aud"], "authenticated");
    }

    #[test]
    fn test_theme_round_trip() {
        assert_eq!(Theme::Dark.to_string(), "dark");
        assert_eq!(Theme::from_str("light").unwrap(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert!(Theme::from_str("solarized").is_err());
    }
}
