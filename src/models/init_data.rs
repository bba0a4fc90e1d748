use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Init-data fields whose signature has been checked.
///
/// The only way to obtain one outside this crate is
/// [`verify_init_data`](crate::utils::telegram_auth::verify_init_data), so holding a
/// `VerifiedIdentity` means every field in it came from the platform client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    fields: BTreeMap<String, String>,
}

/// The `user` object embedded in init data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAppUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
    pub is_premium: Option<bool>,
}

impl VerifiedIdentity {
    pub(crate) fn from_verified(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Decodes the `user` field. `None` when it is absent or not a user object.
    pub fn user(&self) -> Option<WebAppUser> {
        serde_json::from_str(self.get("user")?).ok()
    }

    /// The `id` of the `user` field rendered as text, or an empty string when the
    /// field is missing or malformed.
    pub fn user_tag(&self) -> String {
        let Some(raw) = self.get("user") else {
            return String::new();
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) else {
            return String::new();
        };
        match value.get("id") {
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::String(s)) => s.clone(),
            _ => String::new(),
        }
    }

    /// When the client says the data was signed. Not checked for freshness.
    pub fn auth_date(&self) -> Option<DateTime<Utc>> {
        let secs: i64 = self.get("auth_date")?.parse().ok()?;
        DateTime::from_timestamp(secs, 0)
    }

    pub fn query_id(&self) -> Option<&str> {
        self.get("query_id")
    }

    pub fn start_param(&self) -> Option<&str> {
        self.get("start_param")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(pairs: &[(&str, &str)]) -> VerifiedIdentity {
        VerifiedIdentity::from_verified(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn user_tag_renders_numeric_and_string_ids() {
        assert_eq!(identity(&[("user", r#"{"id":42}"#)]).user_tag(), "42");
        assert_eq!(identity(&[("user", r#"{"id":"abc"}"#)]).user_tag(), "abc");
    }

    #[test]
    fn user_tag_degrades_to_empty() {
        assert_eq!(identity(&[]).user_tag(), "");
        assert_eq!(identity(&[("user", "not json")]).user_tag(), "");
        assert_eq!(identity(&[("user", "[1,2,3]")]).user_tag(), "");
        assert_eq!(identity(&[("user", r#"{"name":"x"}"#)]).user_tag(), "");
        assert_eq!(identity(&[("user", r#"{"id":null}"#)]).user_tag(), "");
    }

    #[test]
    fn typed_user_and_auth_date() {
        let id = identity(&[
            (
                "user",
                r#"{"id":7,"first_name":"Ann","username":"ann","is_premium":true}"#,
            ),
            ("auth_date", "1700000000"),
            ("query_id", "AAE"),
        ]);

        let user = id.user().expect("user parses");
        assert_eq!(user.id, 7);
        assert_eq!(user.first_name, "Ann");
        assert_eq!(user.username.as_deref(), Some("ann"));
        assert_eq!(user.last_name, None);

        assert_eq!(id.auth_date().map(|d| d.timestamp()), Some(1_700_000_000));
        assert_eq!(id.query_id(), Some("AAE"));
        assert_eq!(id.start_param(), None);
    }

    #[test]
    fn auth_date_ignores_garbage() {
        assert_eq!(identity(&[("auth_date", "yesterday")]).auth_date(), None);
    }
}
