//! Running-log state machine.
//!
//! There is at most one open log. The current state is never cached here:
//! [`Tracker::state`] re-derives it from the repository on every call.

use crate::db::repository::{LogRepository, conflict_open};
use crate::errors::{AppError, AppResult};
use crate::models::{CategoryId, LogPatch, LogRecord, NewLog};
use chrono::{DateTime, Utc};
use std::cell::Cell;
use tracing::{debug, info, warn};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock returning a settable instant; handy for tests and replay.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    pub fn advance(&self, secs: i64) {
        self.now.set(self.now.get() + chrono::Duration::seconds(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running(LogRecord),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartOptions {
    pub task_id: Option<String>,
    pub note: Option<String>,
}

/// Pick the authoritative running log: the open one with the latest start.
/// Several open logs only happen after an invariant breach; the last writer wins.
pub fn recompute_running(logs: &[LogRecord]) -> Option<&LogRecord> {
    logs.iter()
        .filter(|l| l.is_open())
        .fold(None, |best: Option<&LogRecord>, l| match best {
            Some(b) if b.start > l.start => Some(b),
            _ => Some(l),
        })
}

pub struct Tracker<R, C = SystemClock> {
    repo: R,
    clock: C,
}

impl<R: LogRepository> Tracker<R, SystemClock> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            clock: SystemClock,
        }
    }
}

impl<R: LogRepository, C: Clock> Tracker<R, C> {
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn state(&self) -> AppResult<RunState> {
        let open = self.repo.find_open()?;
        if open.len() > 1 {
            warn!(count = open.len(), "more than one running log in store");
        }
        Ok(match recompute_running(&open) {
            Some(r) => RunState::Running(r.clone()),
            None => RunState::Idle,
        })
    }

    /// Start a log now. Already running → the running log is returned unchanged.
    pub fn start(&self, category_id: CategoryId, opts: StartOptions) -> AppResult<LogRecord> {
        if let RunState::Running(current) = self.state()? {
            debug!(id = %current.id, "start ignored, already running");
            return Ok(current);
        }

        let new = NewLog {
            category_id,
            task_id: opts.task_id,
            start: self.clock.now(),
            end: None,
            note: opts.note.unwrap_or_default(),
        };
        let rec = self.repo.create(new)?;
        info!(id = %rec.id, category = %rec.category_id, "log started");
        Ok(rec)
    }

    /// Stop the running log. Idle → `None` without touching the store.
    pub fn stop(&self) -> AppResult<Option<LogRecord>> {
        let RunState::Running(current) = self.state()? else {
            debug!("stop ignored, nothing running");
            return Ok(None);
        };

        let rec = self
            .repo
            .update(&current.id, &LogPatch::stop_at(self.clock.now()))?;
        info!(id = %rec.id, duration = ?rec.duration_sec, "log stopped");
        Ok(Some(rec))
    }

    /// Insert a fully specified log. An open insert is refused while another log runs.
    pub fn manual_insert(&self, new: NewLog) -> AppResult<LogRecord> {
        if new.end.is_none()
            && let RunState::Running(current) = self.state()?
        {
            return Err(conflict_open(&current.id));
        }

        let rec = self.repo.create(new)?;
        info!(id = %rec.id, open = rec.is_open(), "log inserted");
        Ok(rec)
    }

    /// Patch a log. Re-opening it is refused while a different log runs.
    pub fn manual_update(&self, id: &str, patch: &LogPatch) -> AppResult<LogRecord> {
        let existing = self
            .repo
            .find_by_id(id)?
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;

        let ends_open = match patch.end {
            Some(end) => end.is_none(),
            None => existing.is_open(),
        };
        if ends_open {
            let others: Vec<LogRecord> = self
                .repo
                .find_open()?
                .into_iter()
                .filter(|l| l.id != id)
                .collect();
            if let Some(other) = recompute_running(&others) {
                return Err(conflict_open(&other.id));
            }
        }

        let rec = self.repo.update(id, patch)?;
        info!(id = %rec.id, "log updated");
        Ok(rec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::derive::DayZone;
    use crate::db::repository::InMemoryLogRepository;
    use crate::models::LogFilter;
    use chrono::{FixedOffset, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    fn tracker() -> Tracker<InMemoryLogRepository, ManualClock> {
        let repo = InMemoryLogRepository::new(DayZone::Fixed(FixedOffset::east_opt(0).unwrap()));
        Tracker::with_clock(repo, ManualClock::new(t0()))
    }

    fn open_at(id: &str, start: DateTime<Utc>) -> LogRecord {
        LogRecord {
            id: id.into(),
            category_id: CategoryId::Other,
            task_id: None,
            start,
            end: None,
            note: String::new(),
            day_key: start.date_naive(),
            duration_sec: None,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn recompute_running_prefers_latest_start() {
        let older = open_at("a", t0());
        let newer = open_at("b", t0() + chrono::Duration::minutes(5));
        let mut closed = open_at("c", t0() + chrono::Duration::hours(1));
        closed.end = Some(closed.start);

        let logs = vec![newer.clone(), older, closed];
        assert_eq!(recompute_running(&logs).map(|l| l.id.as_str()), Some("b"));
        assert!(recompute_running(&[]).is_none());
    }

    #[test]
    fn start_then_stop() {
        let tr = tracker();
        let a = tr.start(CategoryId::Intern, StartOptions::default()).unwrap();
        assert!(a.is_open());
        assert_eq!(a.start, t0());
        assert_eq!(tr.state().unwrap(), RunState::Running(a.clone()));

        tr.clock().advance(90);
        let stopped = tr.stop().unwrap().unwrap();
        assert_eq!(stopped.id, a.id);
        assert_eq!(stopped.end, Some(t0() + chrono::Duration::seconds(90)));
        assert_eq!(stopped.duration_sec, Some(90));
        assert_eq!(tr.state().unwrap(), RunState::Idle);
    }

    #[test]
    fn start_is_idempotent_while_running() {
        let tr = tracker();
        let a = tr
            .start(
                CategoryId::Intern,
                StartOptions {
                    note: Some("first".into()),
                    ..StartOptions::default()
                },
            )
            .unwrap();
        tr.clock().advance(60);
        let again = tr.start(CategoryId::Meal, StartOptions::default()).unwrap();

        assert_eq!(again, a);
        assert_eq!(tr.repo().list_all(&LogFilter::all()).unwrap().len(), 1);
    }

    #[test]
    fn stop_while_idle_is_noop() {
        let tr = tracker();
        assert_eq!(tr.stop().unwrap(), None);
        assert!(tr.repo().list_all(&LogFilter::all()).unwrap().is_empty());
    }

    #[test]
    fn open_manual_insert_conflicts_with_running() {
        let tr = tracker();
        tr.start(CategoryId::Fun, StartOptions::default()).unwrap();
        let err = tr
            .manual_insert(NewLog::open(CategoryId::Meal, t0()))
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn closed_manual_insert_leaves_running_alone() {
        let tr = tracker();
        let a = tr.start(CategoryId::Fun, StartOptions::default()).unwrap();
        let t = t0() - chrono::Duration::hours(3);
        let rec = tr
            .manual_insert(NewLog::closed(
                CategoryId::Intern,
                t,
                t + chrono::Duration::seconds(3600),
            ))
            .unwrap();
        assert_eq!(rec.duration_sec, Some(3600));
        assert_eq!(tr.state().unwrap(), RunState::Running(a));
    }

    #[test]
    fn manual_update_start_recomputes_derived() {
        let tr = tracker();
        let rec = tr
            .manual_insert(NewLog::closed(
                CategoryId::Univ,
                t0(),
                t0() + chrono::Duration::hours(2),
            ))
            .unwrap();
        let new_start = t0() - chrono::Duration::days(1);
        let upd = tr
            .manual_update(
                &rec.id,
                &LogPatch {
                    start: Some(new_start),
                    ..LogPatch::default()
                },
            )
            .unwrap();
        assert_eq!(upd.day_key_str(), "2023-12-31");
        assert_eq!(upd.duration_sec, Some(26 * 3600));
    }

    #[test]
    fn manual_update_reopen_conflicts() {
        let tr = tracker();
        let closed = tr
            .manual_insert(NewLog::closed(CategoryId::Univ, t0(), t0()))
            .unwrap();
        tr.start(CategoryId::Fun, StartOptions::default()).unwrap();
        let err = tr
            .manual_update(
                &closed.id,
                &LogPatch {
                    end: Some(None),
                    ..LogPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn manual_update_running_log_itself_is_allowed() {
        let tr = tracker();
        let a = tr.start(CategoryId::Fun, StartOptions::default()).unwrap();
        let upd = tr
            .manual_update(
                &a.id,
                &LogPatch {
                    note: Some("gaming".into()),
                    ..LogPatch::default()
                },
            )
            .unwrap();
        assert!(upd.is_open());
        assert_eq!(upd.note, "gaming");
    }

    #[test]
    fn manual_update_unknown_is_not_found() {
        let tr = tracker();
        let err = tr.manual_update("ghost", &LogPatch::default()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn state_tolerates_double_open_store() {
        let tr = tracker();
        tr.repo().seed(open_at("old", t0())).unwrap();
        tr.repo()
            .seed(open_at("new", t0() + chrono::Duration::minutes(1)))
            .unwrap();
        match tr.state().unwrap() {
            RunState::Running(r) => assert_eq!(r.id, "new"),
            RunState::Idle => panic!("expected running"),
        }
    }
}
