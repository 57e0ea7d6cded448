//! Request/response shapes of the logs boundary and the operations behind them.
//!
//! - `GET logs?day=` → [`get_logs`]
//! - `POST logs` → [`post_logs`]
//! - `PATCH logs/{id}` → [`patch_log`]

use crate::core::mirror::MirrorStore;
use crate::core::tracker::{Clock, StartOptions};
use crate::db::repository::LogRepository;
use crate::errors::{AppError, AppResult, ErrorKind};
use crate::models::{CategoryId, LogFilter, LogPatch, LogRecord, NewLog};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsQuery {
    #[serde(default)]
    pub day: Option<NaiveDate>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub task_id: Option<String>,
}

impl From<&LogsQuery> for LogFilter {
    fn from(q: &LogsQuery) -> Self {
        LogFilter {
            day_key: q.day,
            category_id: q.category_id,
            task_id: q.task_id.clone(),
            open_only: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLogRequest {
    pub category_id: CategoryId,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

/// Refresh the mirror with `query` and return its collection.
pub fn get_logs<R: LogRepository, C: Clock>(
    mirror: &mut MirrorStore<R, C>,
    query: &LogsQuery,
) -> AppResult<Vec<LogRecord>> {
    mirror.refresh(&LogFilter::from(query))?;
    Ok(mirror.logs().to_vec())
}

/// Create a log.
///
/// Neither bound given starts a log now (idempotent while one runs).
/// A `start` without `end` inserts an open log and conflicts with a running one.
/// An `end` without `start` is rejected.
pub fn post_logs<R: LogRepository, C: Clock>(
    mirror: &mut MirrorStore<R, C>,
    req: CreateLogRequest,
) -> AppResult<LogRecord> {
    match (req.start, req.end) {
        (None, None) => mirror.start(
            req.category_id,
            StartOptions {
                task_id: req.task_id,
                note: req.note,
            },
        ),
        (Some(start), end) => mirror.manual_insert(NewLog {
            category_id: req.category_id,
            task_id: req.task_id,
            start,
            end,
            note: req.note.unwrap_or_default(),
        }),
        (None, Some(_)) => Err(AppError::InvalidTime(
            "an end time requires a start time".into(),
        )),
    }
}

pub fn patch_log<R: LogRepository, C: Clock>(
    mirror: &mut MirrorStore<R, C>,
    id: &str,
    patch: &LogPatch,
) -> AppResult<LogRecord> {
    mirror.manual_update(id, patch)
}

/// HTTP-equivalent status for an error.
pub fn status_of(err: &AppError) -> u16 {
    match err.kind() {
        ErrorKind::NotFound => 404,
        ErrorKind::Conflict => 409,
        ErrorKind::Transport => 502,
        ErrorKind::Invalid => 400,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::derive::DayZone;
    use crate::core::tracker::{ManualClock, Tracker};
    use crate::db::repository::InMemoryLogRepository;
    use chrono::{FixedOffset, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 6, 0, 0).unwrap()
    }

    fn mirror() -> MirrorStore<InMemoryLogRepository, ManualClock> {
        let repo = InMemoryLogRepository::new(DayZone::Fixed(FixedOffset::east_opt(0).unwrap()));
        MirrorStore::new(Tracker::with_clock(repo, ManualClock::new(t0())))
    }

    #[test]
    fn post_without_bounds_starts_now() {
        let mut m = mirror();
        let req: CreateLogRequest =
            serde_json::from_str(r#"{"category_id":"c_learning","note":"ch. 3"}"#).unwrap();
        let rec = post_logs(&mut m, req).unwrap();
        assert_eq!(rec.start, t0());
        assert!(rec.is_open());
        assert_eq!(rec.note, "ch. 3");
    }

    #[test]
    fn post_with_bounds_inserts_closed() {
        let mut m = mirror();
        let req: CreateLogRequest = serde_json::from_value(serde_json::json!({
            "category_id": "c_intern",
            "start": "2024-07-01T00:00:00Z",
            "end": "2024-07-01T01:00:00Z",
        }))
        .unwrap();
        let rec = post_logs(&mut m, req).unwrap();
        assert_eq!(rec.duration_sec, Some(3600));
        assert_eq!(rec.day_key_str(), "2024-07-01");
    }

    #[test]
    fn post_end_only_is_invalid() {
        let mut m = mirror();
        let req = CreateLogRequest {
            category_id: CategoryId::Fun,
            task_id: None,
            note: None,
            start: None,
            end: Some(t0()),
        };
        let err = post_logs(&mut m, req).unwrap_err();
        assert_eq!(status_of(&err), 400);
    }

    #[test]
    fn patch_errors_map_to_statuses() {
        let mut m = mirror();
        let err = patch_log(&mut m, "nope", &LogPatch::default()).unwrap_err();
        assert_eq!(status_of(&err), 404);

        post_logs(
            &mut m,
            CreateLogRequest {
                category_id: CategoryId::Fun,
                task_id: None,
                note: None,
                start: None,
                end: None,
            },
        )
        .unwrap();
        let err = post_logs(
            &mut m,
            CreateLogRequest {
                category_id: CategoryId::Meal,
                task_id: None,
                note: None,
                start: Some(t0()),
                end: None,
            },
        )
        .unwrap_err();
        assert_eq!(status_of(&err), 409);
    }

    #[test]
    fn get_filters_by_day() {
        let mut m = mirror();
        for day in [1, 2] {
            let s = Utc.with_ymd_and_hms(2024, 7, day, 3, 0, 0).unwrap();
            m.manual_insert(NewLog::closed(CategoryId::Meal, s, s)).unwrap();
        }
        let q = LogsQuery {
            day: NaiveDate::from_ymd_opt(2024, 7, 2),
            ..LogsQuery::default()
        };
        let logs = get_logs(&mut m, &q).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].day_key_str(), "2024-07-02");
    }
}
