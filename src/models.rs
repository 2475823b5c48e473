//! Core data models for the contact book.
//!
//! [`Contact`] is the canonical record every storage backend produces;
//! [`ContactResponse`] is the JSON shape handed to HTTP and CLI callers.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A persisted contact, identical across storage backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// Storage-assigned identifier, always surfaced as a string.
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Unvalidated create input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl NewContact {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Copy with surrounding whitespace removed from both fields.
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }
}

/// Contact response shape: `{ id, name, email, createdAt }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: String, // ISO8601
}

impl From<Contact> for ContactResponse {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id,
            name: contact.name,
            email: contact.email,
            created_at: format_ts_iso(&contact.created_at),
        }
    }
}

/// Formats a timestamp as `2024-05-01T12:00:00.000Z`.
pub fn format_ts_iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Converts Unix milliseconds to a UTC timestamp, clamping out-of-range values to the epoch.
pub fn ts_from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_shape() {
        let contact = Contact {
            id: "1".to_string(),
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            created_at: ts_from_millis(1_714_564_800_123),
        };
        let json = serde_json::to_value(ContactResponse::from(contact)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "1",
                "name": "John Doe",
                "email": "john@example.com",
                "createdAt": "2024-05-01T12:00:00.123Z"
            })
        );
    }

    #[test]
    fn test_new_contact_missing_fields_default_empty() {
        let input: NewContact = serde_json::from_str(r#"{"name": "Ann"}"#).unwrap();
        assert_eq!(input.name, "Ann");
        assert_eq!(input.email, "");
    }

    #[test]
    fn test_trimmed() {
        let input = NewContact::new("  Ann Lee ", " ann@example.com\n");
        let t = input.trimmed();
        assert_eq!(t.name, "Ann Lee");
        assert_eq!(t.email, "ann@example.com");
    }
}
