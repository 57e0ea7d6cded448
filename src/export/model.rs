use crate::db::queries::ts_to_db;
use crate::models::LogRecord;
use serde::Serialize;

/// Flat row written by both exporters.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct LogExport {
    pub id: String,
    pub category_id: String,
    pub category: String,
    pub task_id: Option<String>,
    pub start: String,
    pub end: Option<String>,
    pub day_key: String,
    pub duration_sec: Option<i64>,
    pub note: String,
}

impl From<&LogRecord> for LogExport {
    fn from(r: &LogRecord) -> Self {
        Self {
            id: r.id.clone(),
            category_id: r.category_id.code().to_string(),
            category: r.category_id.label().to_string(),
            task_id: r.task_id.clone(),
            start: ts_to_db(&r.start),
            end: r.end.as_ref().map(ts_to_db),
            day_key: r.day_key_str(),
            duration_sec: r.duration_sec,
            note: r.note.clone(),
        }
    }
}
