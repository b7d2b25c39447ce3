//! Activity entries
//!
//! An activity is one logged eco-travel experience. Entries are created by
//! the form path without an id, receive an auto-incremented id from the
//! entry store, and are never mutated afterwards: they are only deleted,
//! either after the remote endpoint acknowledged them or by a clear/reset.
//!
//! # Wire format
//!
//! ```json
//! {"id": 3, "description": "Heron at the lagoon", "type": "sighting", "date": "2025-03-01T09:30:00.000Z"}
//! ```

use crate::shared::error::SharedError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned activity identifier
pub type ActivityId = i64;

/// Closed set of activity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    /// Wildlife sighting
    Sighting,
    /// Hiking or trekking
    Hiking,
    /// Conservation volunteering
    Conservation,
    /// Cultural visit
    Cultural,
    /// Anything else
    Other,
}

impl ActivityType {
    /// Every activity type, in form order
    pub const ALL: [ActivityType; 5] = [
        ActivityType::Sighting,
        ActivityType::Hiking,
        ActivityType::Conservation,
        ActivityType::Cultural,
        ActivityType::Other,
    ];

    /// Stable lowercase tag used in JSON and in the store
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Sighting => "sighting",
            ActivityType::Hiking => "hiking",
            ActivityType::Conservation => "conservation",
            ActivityType::Cultural => "cultural",
            ActivityType::Other => "other",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = SharedError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ActivityType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| SharedError::validation("type", format!("unknown activity type '{}'", value)))
    }
}

/// Formats a timestamp the way entries carry it: RFC 3339, milliseconds, `Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// An activity that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivity {
    /// Free-text description, never blank
    pub description: String,
    /// Activity kind
    #[serde(rename = "type")]
    pub kind: ActivityType,
    /// ISO-8601 creation timestamp
    pub date: String,
}

impl NewActivity {
    /// Create an activity stamped with the current time
    pub fn new(description: impl Into<String>, kind: ActivityType) -> Result<Self, SharedError> {
        Self::at(description, kind, Utc::now())
    }

    /// Create an activity with an explicit creation time
    pub fn at(
        description: impl Into<String>,
        kind: ActivityType,
        date: DateTime<Utc>,
    ) -> Result<Self, SharedError> {
        let activity = Self {
            description: description.into(),
            kind,
            date: format_timestamp(date),
        };
        activity.validate()?;
        Ok(activity)
    }

    /// Check the invariants of an entry received from outside
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.description.trim().is_empty() {
            return Err(SharedError::validation("description", "description cannot be empty"));
        }
        DateTime::parse_from_rfc3339(&self.date).map_err(|err| {
            SharedError::validation("date", format!("'{}' is not an ISO-8601 timestamp: {}", self.date, err))
        })?;
        Ok(())
    }
}

/// A persisted activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Store-assigned id
    pub id: ActivityId,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub date: String,
}

impl Activity {
    /// Attach the id assigned by the store
    pub fn from_new(id: ActivityId, activity: NewActivity) -> Self {
        Self {
            id,
            description: activity.description,
            kind: activity.kind,
            date: activity.date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_blank_description_is_rejected() {
        let err = NewActivity::new("   ", ActivityType::Hiking).unwrap_err();
        assert_eq!(err, SharedError::validation("description", "description cannot be empty"));
    }

    #[test]
    fn test_date_is_millisecond_iso() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        let activity = NewActivity::at("Heron at the lagoon", ActivityType::Sighting, at).unwrap();
        assert_eq!(activity.date, "2025-03-01T09:30:00.000Z");
    }

    #[test]
    fn test_json_uses_type_key() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        let activity = Activity::from_new(
            7,
            NewActivity::at("Beach clean-up", ActivityType::Conservation, at).unwrap(),
        );
        let value = serde_json::to_value(&activity).unwrap();
        assert_eq!(value["type"], "conservation");
        assert_eq!(value["id"], 7);
    }

    #[test]
    fn test_unknown_type_fails_to_parse() {
        assert!("avistamiento".parse::<ActivityType>().is_err());
        assert_eq!("cultural".parse::<ActivityType>().unwrap(), ActivityType::Cultural);
    }

    #[test]
    fn test_validate_rejects_bad_date() {
        let activity = NewActivity {
            description: "Museum".to_string(),
            kind: ActivityType::Cultural,
            date: "yesterday".to_string(),
        };
        assert!(activity.validate().is_err());
    }
}
