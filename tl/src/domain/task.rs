//! Task domain type

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::id::{TaskId, generate_task_id, short_id};

/// A single to-do item
///
/// Serialized field names match the stored layout:
/// `{"id", "text", "completed", "createdAt"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, assigned at creation
    pub id: TaskId,

    /// Item text, never empty after trim
    pub text: String,

    /// Whether the item has been completed
    pub completed: bool,

    /// Creation instant
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a new task with a generated ID, stamped now
    ///
    /// The text is trimmed; callers reject empty text before calling this.
    pub fn new(text: impl AsRef<str>) -> Self {
        let task = Self {
            id: generate_task_id(),
            text: text.as_ref().trim().to_string(),
            completed: false,
            // Stored timestamps carry milliseconds; truncate so a reload compares equal
            created_at: Utc::now().trunc_subsecs(3),
        };
        debug!(id = %task.id, "Task::new: created");
        task
    }

    /// Short display form of the ID
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }

    /// Flip the completion flag
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

/// Serde adapter for ISO-8601 timestamps with millisecond precision
/// (`2024-05-01T12:30:00.000Z`)
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
    }
}
