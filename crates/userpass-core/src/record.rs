//! The timestamped credential record.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::error::{Result, UserpassError};

/// One `(key, timestamp, username, secret)` fact, as written by one host.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Record {
    /// Account or site identifier records are grouped by
    pub key: String,

    /// Seconds since the epoch when the record was written (always > 0)
    pub timestamp: i64,

    pub username: String,

    #[serde(rename = "password")]
    pub secret: String,
}

impl Record {
    /// Build a record, rejecting non-positive timestamps.
    ///
    /// # Errors
    ///
    /// Returns `UserpassError::InvalidInput` if `timestamp <= 0`.
    pub fn new(
        key: impl Into<String>,
        timestamp: i64,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self> {
        if timestamp <= 0 {
            return Err(UserpassError::InvalidInput(format!(
                "Record timestamp must be positive (got {})",
                timestamp
            )));
        }
        Ok(Self {
            key: key.into(),
            timestamp,
            username: username.into(),
            secret: secret.into(),
        })
    }

    /// The `(username, secret)` projection callers display.
    pub fn credential(&self) -> (String, String) {
        (self.username.clone(), self.secret.clone())
    }
}

/// Chronological, then by key, username and secret.
///
/// A total order, so sorting a merged view never depends on which source was
/// loaded first.
impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.timestamp, &self.key, &self.username, &self.secret).cmp(&(
            other.timestamp,
            &other.key,
            &other.username,
            &other.secret,
        ))
    }
}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("key", &self.key)
            .field("timestamp", &self.timestamp)
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Reject field values the line format cannot carry.
///
/// Tabs and newlines are field and record separators in a source file.
pub fn validate_field(name: &str, value: &str) -> Result<()> {
    if value.contains(['\t', '\n', '\r']) {
        return Err(UserpassError::InvalidInput(format!(
            "{} must not contain tabs or newlines",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_non_positive_timestamp() {
        assert!(Record::new("site", 0, "alice", "p1").is_err());
        assert!(Record::new("site", -5, "alice", "p1").is_err());
        assert!(Record::new("site", 1, "alice", "p1").is_ok());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let record = Record::new("site", 100, "alice", "hunter2").unwrap();
        let debug = format!("{:?}", record);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_order_breaks_timestamp_ties_by_content() {
        let mut records = vec![
            Record::new("site", 500, "bob", "y").unwrap(),
            Record::new("site", 100, "zed", "z").unwrap(),
            Record::new("site", 500, "alice", "x").unwrap(),
        ];
        records.sort();
        let usernames: Vec<&str> = records.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(usernames, vec!["zed", "alice", "bob"]);
    }

    #[test]
    fn test_serializes_secret_as_password() {
        let value = serde_json::to_value(Record::new("site", 100, "alice", "p1").unwrap()).unwrap();
        assert_eq!(value["key"], "site");
        assert_eq!(value["timestamp"], 100);
        assert_eq!(value["password"], "p1");
        assert!(value.get("secret").is_none());
    }

    #[test]
    fn test_validate_field() {
        assert!(validate_field("key", "example.com").is_ok());
        assert!(validate_field("key", "a\tb").is_err());
        assert!(validate_field("password", "line\nbreak").is_err());
    }
}
