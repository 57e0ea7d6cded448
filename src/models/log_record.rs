use super::category::CategoryId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single timed activity entry. `end == None` means the log is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: String,
    pub category_id: CategoryId,
    #[serde(default)]
    pub task_id: Option<String>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub note: String,
    pub day_key: NaiveDate, // ⇔ logs.day_key (TEXT "YYYY-MM-DD")
    #[serde(default)]
    pub duration_sec: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LogRecord {
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    pub fn day_key_str(&self) -> String {
        self.day_key.format("%Y-%m-%d").to_string()
    }
}

/// Fields accepted when creating a log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLog {
    pub category_id: CategoryId,
    pub task_id: Option<String>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub note: String,
}

impl NewLog {
    pub fn open(category_id: CategoryId, start: DateTime<Utc>) -> Self {
        Self {
            category_id,
            task_id: None,
            start,
            end: None,
            note: String::new(),
        }
    }

    pub fn closed(category_id: CategoryId, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            end: Some(end),
            ..Self::open(category_id, start)
        }
    }
}

/// Partial update. `end` and `task_id` separate "leave as is" (`None`)
/// from "set to null" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub task_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl LogPatch {
    pub fn stop_at(end: DateTime<Utc>) -> Self {
        Self {
            end: Some(Some(end)),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True when applying the patch leaves the record open.
    pub fn reopens(&self) -> bool {
        matches!(self.end, Some(None))
    }

    /// Apply the raw field changes. Derived fields are the caller's job.
    pub fn apply_to(&self, rec: &mut LogRecord) {
        if let Some(c) = self.category_id {
            rec.category_id = c;
        }
        if let Some(t) = &self.task_id {
            rec.task_id = t.clone();
        }
        if let Some(s) = self.start {
            rec.start = s;
        }
        if let Some(e) = self.end {
            rec.end = e;
        }
        if let Some(n) = &self.note {
            rec.note = n.clone();
        }
    }
}

// `null` must become `Some(None)`, a missing key stays `None` via `#[serde(default)]`.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Query filter for listing logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub day_key: Option<NaiveDate>,
    pub category_id: Option<CategoryId>,
    pub task_id: Option<String>,
    pub open_only: bool,
}

impl LogFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn day(day: NaiveDate) -> Self {
        Self {
            day_key: Some(day),
            ..Self::default()
        }
    }

    pub fn open() -> Self {
        Self {
            open_only: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, rec: &LogRecord) -> bool {
        self.day_key.is_none_or(|d| rec.day_key == d)
            && self.category_id.is_none_or(|c| rec.category_id == c)
            && self
                .task_id
                .as_deref()
                .is_none_or(|t| rec.task_id.as_deref() == Some(t))
            && (!self.open_only || rec.is_open())
    }
}
