//! Best-effort on-disk mirror of logs, categories and tasks.
//!
//! Stored as one JSON document; written through a temp file and renamed into
//! place. Never the source of truth: readers fall back to an empty snapshot
//! when the file is missing or unreadable.

mod index;

pub use index::LogIndex;

use crate::errors::AppResult;
use crate::models::{Category, CategoryId, LogRecord, Task};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Logs,
    Categories,
    Tasks,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Logs => "logs",
            Collection::Categories => "categories",
            Collection::Tasks => "tasks",
        }
    }
}

/// On-disk document layout. Opaque outside this module.
#[doc(hidden)]
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    logs: BTreeMap<String, LogRecord>,
    #[serde(default)]
    categories: BTreeMap<String, Category>,
    #[serde(default)]
    tasks: BTreeMap<String, Task>,
}

/// A row type that lives in one of the cache collections.
pub trait CacheItem: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;

    fn key(&self) -> String;

    #[doc(hidden)]
    fn slot(snap: &Snapshot) -> &BTreeMap<String, Self>;
    #[doc(hidden)]
    fn slot_mut(snap: &mut Snapshot) -> &mut BTreeMap<String, Self>;
}

impl CacheItem for LogRecord {
    const COLLECTION: Collection = Collection::Logs;

    fn key(&self) -> String {
        self.id.clone()
    }
    fn slot(snap: &Snapshot) -> &BTreeMap<String, Self> {
        &snap.logs
    }
    fn slot_mut(snap: &mut Snapshot) -> &mut BTreeMap<String, Self> {
        &mut snap.logs
    }
}

impl CacheItem for Category {
    const COLLECTION: Collection = Collection::Categories;

    fn key(&self) -> String {
        self.id.code().to_string()
    }
    fn slot(snap: &Snapshot) -> &BTreeMap<String, Self> {
        &snap.categories
    }
    fn slot_mut(snap: &mut Snapshot) -> &mut BTreeMap<String, Self> {
        &mut snap.categories
    }
}

impl CacheItem for Task {
    const COLLECTION: Collection = Collection::Tasks;

    fn key(&self) -> String {
        self.id.clone()
    }
    fn slot(snap: &Snapshot) -> &BTreeMap<String, Self> {
        &snap.tasks
    }
    fn slot_mut(snap: &mut Snapshot) -> &mut BTreeMap<String, Self> {
        &mut snap.tasks
    }
}

#[derive(Debug, Clone)]
pub struct LocalCache {
    path: PathBuf,
}

impl LocalCache {
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Snapshot {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Snapshot::default(),
            Err(e) => {
                warn!(path = %self.path.display(), "cannot read local cache: {e}");
                return Snapshot::default();
            }
        };
        match serde_json::from_str::<Snapshot>(&raw) {
            Ok(snap) if snap.version <= CACHE_VERSION => snap,
            Ok(snap) => {
                warn!(version = snap.version, "local cache written by a newer version, ignored");
                Snapshot::default()
            }
            Err(e) => {
                warn!(path = %self.path.display(), "corrupt local cache ignored: {e}");
                Snapshot::default()
            }
        }
    }

    fn write(&self, mut snap: Snapshot) -> AppResult<()> {
        snap.version = CACHE_VERSION;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&snap)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn get_all<T: CacheItem>(&self) -> Vec<T> {
        T::slot(&self.read()).values().cloned().collect()
    }

    pub fn put<T: CacheItem>(&self, item: &T) -> AppResult<()> {
        let mut snap = self.read();
        T::slot_mut(&mut snap).insert(item.key(), item.clone());
        self.write(snap)
    }

    /// Upsert every item in one write. Returns how many were written.
    pub fn bulk_put<T: CacheItem>(&self, items: &[T]) -> AppResult<usize> {
        let mut snap = self.read();
        let slot = T::slot_mut(&mut snap);
        for item in items {
            slot.insert(item.key(), item.clone());
        }
        self.write(snap)?;
        debug!(collection = T::COLLECTION.name(), count = items.len(), "cache bulk write");
        Ok(items.len())
    }

    pub fn get_all_logs(&self) -> Vec<LogRecord> {
        self.get_all()
    }

    pub fn put_log(&self, rec: &LogRecord) -> AppResult<()> {
        self.put(rec)
    }

    pub fn bulk_put_logs(&self, logs: &[LogRecord]) -> AppResult<usize> {
        self.bulk_put(logs)
    }

    /// Index over the cached logs (start, day key, category, task).
    pub fn log_index(&self) -> LogIndex {
        LogIndex::build(self.get_all_logs())
    }

    pub fn logs_by_day(&self, day: NaiveDate) -> Vec<LogRecord> {
        self.log_index().by_day(day)
    }

    pub fn logs_by_category(&self, category: CategoryId) -> Vec<LogRecord> {
        self.log_index().by_category(category)
    }

    pub fn logs_by_task(&self, task_id: &str) -> Vec<LogRecord> {
        self.log_index().by_task(task_id)
    }

    pub fn logs_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<LogRecord> {
        self.log_index().between(from, to)
    }

    /// Categories sorted by their `order`.
    pub fn categories(&self) -> Vec<Category> {
        let mut cats: Vec<Category> = self.get_all();
        cats.sort_by_key(|c| c.order);
        cats
    }

    pub fn tasks_by_status(&self, status: &str) -> Vec<Task> {
        self.get_all::<Task>()
            .into_iter()
            .filter(|t| t.status == status)
            .collect()
    }

    pub fn tasks_by_category(&self, category: CategoryId) -> Vec<Task> {
        self.get_all::<Task>()
            .into_iter()
            .filter(|t| t.category_id == Some(category))
            .collect()
    }

    /// Tasks with a due date, soonest first.
    pub fn tasks_by_due(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .get_all::<Task>()
            .into_iter()
            .filter(|t| t.due.is_some())
            .collect();
        tasks.sort_by_key(|t| t.due);
        tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rec(id: &str, cat: CategoryId, hour: u32, task: Option<&str>) -> LogRecord {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, hour, 0, 0).unwrap();
        LogRecord {
            id: id.into(),
            category_id: cat,
            task_id: task.map(str::to_string),
            start,
            end: Some(start + chrono::Duration::minutes(30)),
            note: String::new(),
            day_key: start.date_naive(),
            duration_sec: Some(1800),
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::open(dir.path().join("nope.json"));
        assert!(cache.get_all_logs().is_empty());
        assert!(cache.categories().is_empty());
    }

    #[test]
    fn corrupt_file_reads_empty_and_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{not json").unwrap();
        let cache = LocalCache::open(&path);
        assert!(cache.get_all_logs().is_empty());

        cache.put_log(&rec("a", CategoryId::Fun, 1, None)).unwrap();
        assert_eq!(cache.get_all_logs().len(), 1);
    }

    #[test]
    fn put_replaces_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::open(dir.path().join("cache.json"));
        let mut a = rec("a", CategoryId::Fun, 1, None);
        cache.put_log(&a).unwrap();
        a.note = "changed".into();
        cache.put_log(&a).unwrap();

        let logs = cache.get_all_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].note, "changed");
    }

    #[test]
    fn collections_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::open(dir.path().join("cache.json"));
        assert_eq!(cache.bulk_put(&Category::builtin()).unwrap(), 11);
        cache
            .put(&Task {
                id: "t1".into(),
                title: "thesis".into(),
                status: "doing".into(),
                due: NaiveDate::from_ymd_opt(2024, 3, 1),
                category_id: Some(CategoryId::Univ),
            })
            .unwrap();
        cache
            .bulk_put_logs(&[
                rec("a", CategoryId::Univ, 9, Some("t1")),
                rec("b", CategoryId::Meal, 12, None),
            ])
            .unwrap();

        assert_eq!(cache.categories()[0].id, CategoryId::Univ);
        assert_eq!(cache.tasks_by_status("doing").len(), 1);
        assert_eq!(cache.tasks_by_category(CategoryId::Univ).len(), 1);
        assert_eq!(cache.tasks_by_due()[0].id, "t1");
        assert_eq!(cache.logs_by_task("t1").len(), 1);
        assert_eq!(cache.logs_by_category(CategoryId::Meal)[0].id, "b");
        assert_eq!(
            cache
                .logs_by_day(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
                .len(),
            2
        );
        assert_eq!(Collection::Tasks.name(), "tasks");
    }
}
