use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::datetime;

// --- Task priority ---

/// Urgency levels, totally ordered `none < low < medium < high`.
///
/// Parsing is case-insensitive and never fails: anything that is not a level
/// name (including non-string JSON values in stored data) loads as `none`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl Priority {
    /// Case-insensitive parse. `None` (the `Option`) means the text is not a
    /// level name, so callers can warn before falling back.
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Lenient form used at deserialization boundaries.
    pub fn from_text(text: &str) -> Self {
        Self::parse(text).unwrap_or_default()
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Unknown names and non-string values both load as `none`.
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::String(text) => Self::from_text(&text),
            _ => Self::None,
        })
    }
}

// --- Task record ---

/// Mint a new task id: a v4 UUID rendered as lowercase hex.
pub fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Task {
    /** Immutable primary key (unique per task); records loaded without one
    get a freshly minted id */
    #[serde(default = "fresh_id")]
    pub id: String,

    /** Required human-readable summary; never empty for a stored task */
    pub description: String,

    /** Completion flag, flipped by toggle */
    #[serde(default)]
    pub completed: bool,

    /** Urgency; records loaded without one default to `none` */
    #[serde(default)]
    pub priority: Priority,

    /** Canonical due timestamp, or a legacy string preserved verbatim.
    Absent is a distinct state from unparsable */
    #[serde(default)]
    pub due_date: Option<String>,

    /** Creation timestamp in canonical form, set once */
    #[serde(default = "datetime::now_canonical")]
    pub created_at: String,
}

impl Task {
    /// First 8 characters of the id, used for display and completion.
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!(Priority::parse("high"), Some(Priority::High));
        assert_eq!(Priority::parse("HIGH"), Some(Priority::High));
        assert_eq!(Priority::parse("Medium"), Some(Priority::Medium));
        assert_eq!(Priority::parse("none"), Some(Priority::None));
        assert_eq!(Priority::parse("urgent"), None);
        assert_eq!(Priority::parse(""), None);
    }

    #[test]
    fn priority_fallback_is_none() {
        assert_eq!(Priority::from_text("urgent"), Priority::None);
        assert_eq!(Priority::from_text("LOW"), Priority::Low);
    }

    #[test]
    fn priority_ordering() {
        assert!(Priority::None < Priority::Low);
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
    }

    #[test]
    fn priority_serializes_as_lowercase_name() {
        let json = serde_json::to_string(&Priority::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }

    #[test]
    fn priority_deserializes_leniently() {
        let high: Priority = serde_json::from_str("\"HIGH\"").unwrap();
        assert_eq!(high, Priority::High);
        let unknown: Priority = serde_json::from_str("\"urgent\"").unwrap();
        assert_eq!(unknown, Priority::None);
        let number: Priority = serde_json::from_str("3").unwrap();
        assert_eq!(number, Priority::None);
        let null: Priority = serde_json::from_str("null").unwrap();
        assert_eq!(null, Priority::None);
    }

    #[test]
    fn record_missing_priority_and_id_is_healed() {
        let task: Task =
            serde_json::from_str(r#"{"description": "water plants", "completed": false}"#).unwrap();
        assert_eq!(task.priority, Priority::None);
        assert!(!task.id.is_empty());
        assert_eq!(task.due_date, None);
        assert!(!task.created_at.is_empty());
    }

    #[test]
    fn short_id_is_eight_chars() {
        let task = Task {
            id: "abc123def456".to_string(),
            description: "x".to_string(),
            completed: false,
            priority: Priority::None,
            due_date: None,
            created_at: datetime::now_canonical(),
        };
        assert_eq!(task.short_id(), "abc123de");
    }

    #[test]
    fn fresh_ids_are_unique_lowercase() {
        let a = fresh_id();
        let b = fresh_id();
        assert_ne!(a, b);
        assert_eq!(a, a.to_lowercase());
    }
}
