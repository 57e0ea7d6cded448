//! Durable store of log records.
//!
//! The repository owns the derived fields: every create/update recomputes
//! `day_key` and `duration_sec` from the stored `start`/`end` and stamps
//! `created_at`/`updated_at`.

use crate::core::derive::{DayZone, duration_of};
use crate::errors::{AppError, AppResult};
use crate::models::{LogFilter, LogPatch, LogRecord, NewLog};
use chrono::{DateTime, SubsecRound, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

pub trait LogRepository {
    fn create(&self, new: NewLog) -> AppResult<LogRecord>;
    fn update(&self, id: &str, patch: &LogPatch) -> AppResult<LogRecord>;
    fn find_by_id(&self, id: &str) -> AppResult<Option<LogRecord>>;
    /// Ordered by `start` ascending.
    fn list_all(&self, filter: &LogFilter) -> AppResult<Vec<LogRecord>>;

    fn find_open(&self) -> AppResult<Vec<LogRecord>> {
        self.list_all(&LogFilter::open())
    }
}

/// Timestamps are persisted with microsecond precision; derive from the
/// value that will be read back.
pub(crate) fn stored_precision(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

/// Build the stored form of a new log.
pub(crate) fn materialize(
    id: String,
    new: NewLog,
    now: DateTime<Utc>,
    zone: DayZone,
) -> LogRecord {
    let start = stored_precision(new.start);
    let end = new.end.map(stored_precision);
    let now = stored_precision(now);
    LogRecord {
        id,
        category_id: new.category_id,
        task_id: new.task_id,
        start,
        end,
        note: new.note,
        day_key: zone.day_key(start),
        duration_sec: duration_of(start, end),
        created_at: now,
        updated_at: now,
    }
}

/// Apply `patch` and bring the derived fields back in line.
pub(crate) fn patch_record(
    rec: &mut LogRecord,
    patch: &LogPatch,
    now: DateTime<Utc>,
    zone: DayZone,
) {
    patch.apply_to(rec);
    rec.start = stored_precision(rec.start);
    rec.end = rec.end.map(stored_precision);
    rec.day_key = zone.day_key(rec.start);
    rec.duration_sec = duration_of(rec.start, rec.end);
    rec.updated_at = stored_precision(now);
}

pub(crate) fn new_id() -> String {
    ulid::Ulid::new().to_string()
}

pub(crate) fn conflict_open(existing: &str) -> AppError {
    AppError::Conflict(format!("another log is already running ({existing})"))
}

/// Mutex-guarded map, used by tests and as a scratch store.
#[derive(Debug, Default)]
pub struct InMemoryLogRepository {
    logs: Mutex<HashMap<String, LogRecord>>,
    zone: DayZone,
}

impl InMemoryLogRepository {
    pub fn new(zone: DayZone) -> Self {
        Self {
            logs: Mutex::new(HashMap::new()),
            zone,
        }
    }

    /// Insert a record verbatim, bypassing every check. Test seeding only.
    pub fn seed(&self, rec: LogRecord) -> AppResult<()> {
        self.lock()?.insert(rec.id.clone(), rec);
        Ok(())
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, HashMap<String, LogRecord>>> {
        self.logs
            .lock()
            .map_err(|e| AppError::Other(format!("log store lock poisoned: {e}")))
    }

    fn open_other_than(logs: &HashMap<String, LogRecord>, id: Option<&str>) -> Option<String> {
        logs.values()
            .find(|l| l.is_open() && Some(l.id.as_str()) != id)
            .map(|l| l.id.clone())
    }
}

impl LogRepository for InMemoryLogRepository {
    fn create(&self, new: NewLog) -> AppResult<LogRecord> {
        let mut logs = self.lock()?;
        if new.end.is_none()
            && let Some(other) = Self::open_other_than(&logs, None)
        {
            return Err(conflict_open(&other));
        }

        let rec = materialize(new_id(), new, Utc::now(), self.zone);
        debug!(id = %rec.id, "created log");
        logs.insert(rec.id.clone(), rec.clone());
        Ok(rec)
    }

    fn update(&self, id: &str, patch: &LogPatch) -> AppResult<LogRecord> {
        let mut logs = self.lock()?;
        let mut rec = logs
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;

        patch_record(&mut rec, patch, Utc::now(), self.zone);
        if rec.is_open()
            && let Some(other) = Self::open_other_than(&logs, Some(id))
        {
            return Err(conflict_open(&other));
        }

        logs.insert(rec.id.clone(), rec.clone());
        Ok(rec)
    }

    fn find_by_id(&self, id: &str) -> AppResult<Option<LogRecord>> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn list_all(&self, filter: &LogFilter) -> AppResult<Vec<LogRecord>> {
        let mut out: Vec<LogRecord> = self
            .lock()?
            .values()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryId;
    use chrono::{FixedOffset, TimeZone};

    fn utc_repo() -> InMemoryLogRepository {
        InMemoryLogRepository::new(DayZone::Fixed(FixedOffset::east_opt(0).unwrap()))
    }

    fn t(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn create_derives_fields() {
        let repo = utc_repo();
        let rec = repo
            .create(NewLog::closed(CategoryId::Intern, t(9, 0), t(10, 0)))
            .unwrap();
        assert_eq!(rec.duration_sec, Some(3600));
        assert_eq!(rec.day_key_str(), "2024-01-01");
        assert_eq!(rec.created_at, rec.updated_at);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let repo = utc_repo();
        let err = repo.update("nope", &LogPatch::default()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn second_open_create_is_rejected() {
        let repo = utc_repo();
        repo.create(NewLog::open(CategoryId::Fun, t(8, 0))).unwrap();
        let err = repo
            .create(NewLog::open(CategoryId::Meal, t(9, 0)))
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn list_is_sorted_and_filtered() {
        let repo = utc_repo();
        repo.create(NewLog::closed(CategoryId::Meal, t(12, 0), t(12, 30)))
            .unwrap();
        repo.create(NewLog::closed(CategoryId::Univ, t(8, 0), t(9, 0)))
            .unwrap();
        let all = repo.list_all(&LogFilter::all()).unwrap();
        assert_eq!(all[0].category_id, CategoryId::Univ);
        assert_eq!(all[1].category_id, CategoryId::Meal);

        let meals = repo
            .list_all(&LogFilter {
                category_id: Some(CategoryId::Meal),
                ..LogFilter::default()
            })
            .unwrap();
        assert_eq!(meals.len(), 1);
    }
}
