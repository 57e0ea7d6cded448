//! In-process mirror of the log collection.
//!
//! Every mutation goes through the [`Tracker`]; the returned canonical record
//! replaces the local copy by id and `running` is recomputed from the whole
//! collection afterwards. A failed call leaves `logs` and `running` as they were.

use crate::cache::LocalCache;
use crate::core::tracker::{Clock, StartOptions, SystemClock, Tracker, recompute_running};
use crate::db::repository::LogRepository;
use crate::errors::AppResult;
use crate::models::{CategoryId, LogFilter, LogPatch, LogRecord, NewLog};
use tracing::{debug, warn};

pub struct MirrorStore<R, C = SystemClock> {
    tracker: Tracker<R, C>,
    logs: Vec<LogRecord>,
    running: Option<LogRecord>,
    cache: Option<LocalCache>,
}

impl<R: LogRepository, C: Clock> MirrorStore<R, C> {
    pub fn new(tracker: Tracker<R, C>) -> Self {
        Self {
            tracker,
            logs: Vec::new(),
            running: None,
            cache: None,
        }
    }

    /// Write every refresh/mutation through to `cache` (best effort).
    pub fn with_cache(mut self, cache: LocalCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn logs(&self) -> &[LogRecord] {
        &self.logs
    }

    pub fn running(&self) -> Option<&LogRecord> {
        self.running.as_ref()
    }

    pub fn tracker(&self) -> &Tracker<R, C> {
        &self.tracker
    }

    pub fn cache(&self) -> Option<&LocalCache> {
        self.cache.as_ref()
    }

    /// Seed the collection from the local cache, before the first refresh.
    pub fn hydrate_from_cache(&mut self) -> usize {
        let Some(cache) = &self.cache else {
            return 0;
        };
        let mut logs = cache.get_all_logs();
        logs.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        let n = logs.len();
        self.logs = logs;
        self.recompute();
        debug!(count = n, "mirror hydrated from cache");
        n
    }

    /// Replace the collection wholesale with what the store holds.
    pub fn refresh(&mut self, filter: &LogFilter) -> AppResult<()> {
        let fresh = self.tracker.repo().list_all(filter)?;
        self.logs = fresh;
        self.recompute();

        if let Some(cache) = &self.cache
            && let Err(e) = cache.bulk_put_logs(&self.logs)
        {
            warn!("local cache write failed: {e}");
        }
        Ok(())
    }

    pub fn start(&mut self, category_id: CategoryId, opts: StartOptions) -> AppResult<LogRecord> {
        let rec = self.tracker.start(category_id, opts)?;
        self.apply(rec.clone());
        Ok(rec)
    }

    pub fn stop(&mut self) -> AppResult<Option<LogRecord>> {
        let rec = self.tracker.stop()?;
        if let Some(r) = &rec {
            self.apply(r.clone());
        } else {
            self.recompute();
        }
        Ok(rec)
    }

    pub fn manual_insert(&mut self, new: NewLog) -> AppResult<LogRecord> {
        let rec = self.tracker.manual_insert(new)?;
        self.apply(rec.clone());
        Ok(rec)
    }

    pub fn manual_update(&mut self, id: &str, patch: &LogPatch) -> AppResult<LogRecord> {
        let rec = self.tracker.manual_update(id, patch)?;
        self.apply(rec.clone());
        Ok(rec)
    }

    fn apply(&mut self, rec: LogRecord) {
        if let Some(cache) = &self.cache
            && let Err(e) = cache.put_log(&rec)
        {
            warn!("local cache write failed: {e}");
        }

        match self.logs.iter_mut().find(|l| l.id == rec.id) {
            Some(slot) => *slot = rec,
            None => self.logs.push(rec),
        }
        self.logs
            .sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        self.recompute();
    }

    fn recompute(&mut self) {
        self.running = recompute_running(&self.logs).cloned();
    }
}
