use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credentials submitted to `register` and `login`.
#[derive(Clone, Serialize, Deserialize)]
pub struct UsernamePasswordInput {
    pub username: String,
    pub password: String,
}

impl UsernamePasswordInput {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

impl fmt::Debug for UsernamePasswordInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsernamePasswordInput")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A validation failure tied to one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self { field: field.to_string(), message: message.to_string() }
    }
}

/// Domain user (API view, no password).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<models::user::Model> for AuthUser {
    fn from(m: models::user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

/// Stored user together with its password hash.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: AuthUser,
    pub password_hash: String,
}

impl From<models::user::Model> for Credentials {
    fn from(m: models::user::Model) -> Self {
        let password_hash = m.password.clone();
        Self { user: m.into(), password_hash }
    }
}

/// Result envelope of `register` and `login`: a user on success, field
/// errors otherwise. Absent members are left out of the JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl UserResponse {
    pub fn with_user(user: AuthUser) -> Self {
        Self { user: Some(user), errors: None }
    }

    pub fn field_error(field: &str, message: &str) -> Self {
        Self { user: None, errors: Some(vec![FieldError::new(field, message)]) }
    }

    /// First error reported for `field`, if any.
    pub fn error_for(&self, field: &str) -> Option<&FieldError> {
        self.errors.as_deref()?.iter().find(|e| e.field == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_omits_absent_members() {
        let json = serde_json::to_value(UserResponse::field_error("username", "taken")).unwrap();
        assert!(json.get("user").is_none());
        assert_eq!(json["errors"][0]["field"], "username");
    }

    #[test]
    fn user_serializes_camel_case_without_password() {
        let now = Utc::now();
        let user = AuthUser { id: 7, username: "alice".into(), created_at: now, updated_at: now };
        let json = serde_json::to_value(UserResponse::with_user(user)).unwrap();
        assert_eq!(json["user"]["id"], 7);
        assert!(json["user"].get("createdAt").is_some());
        assert!(json["user"].get("password").is_none());
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn debug_redacts_password() {
        let input = UsernamePasswordInput::new("alice", "Str0ngPW");
        let shown = format!("{:?}", input);
        assert!(shown.contains("alice"));
        assert!(!shown.contains("Str0ngPW"));
    }
}
