pub mod add;
pub mod backup;
pub mod config;
pub mod db;
pub mod edit;
pub mod export;
pub mod init;
pub mod list;
pub mod log;
pub mod start;
pub mod status;
pub mod stop;

use crate::cache::LocalCache;
use crate::config::Config;
use crate::core::derive::DayZone;
use crate::core::{MirrorStore, Tracker};
use crate::db::initialize::init_db;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::SqliteLogRepository;
use crate::errors::{AppError, AppResult};
use crate::models::{CategoryId, LogRecord};
use crate::utils::formatting::secs2readable;
use crate::utils::time::format_in_zone;
use std::fs;
use std::path::Path;
use tracing::warn;

pub(crate) type Store = MirrorStore<SqliteLogRepository>;

/// Open the configured database (migrating it if needed) behind a mirror
/// seeded from the local cache.
pub(crate) fn open_store(cfg: &Config) -> AppResult<Store> {
    if let Some(parent) = Path::new(&cfg.database).parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let zone = cfg.zone()?;
    let pool = DbPool::new(&cfg.database)?;
    init_db(&pool.conn)?;

    let repo = SqliteLogRepository::new(pool, zone);
    let mut store =
        MirrorStore::new(Tracker::new(repo)).with_cache(LocalCache::open(&cfg.cache_file));
    store.hydrate_from_cache();
    Ok(store)
}

/// Record an operation in the audit table. Failures only warn.
pub(crate) fn audit(store: &Store, operation: &str, target: &str, message: &str) {
    if let Err(e) = ttlog(store.tracker().repo().conn(), operation, target, message) {
        warn!("failed to write internal log: {e}");
    }
}

pub(crate) fn parse_category(code: &str) -> AppResult<CategoryId> {
    CategoryId::from_code(code).ok_or_else(|| AppError::InvalidCategory(code.to_string()))
}

/// One-line human summary of a log.
pub(crate) fn describe(rec: &LogRecord, zone: DayZone) -> String {
    let start = format_in_zone(rec.start, zone, "%Y-%m-%d %H:%M");
    match (rec.end, rec.duration_sec) {
        (Some(end), Some(secs)) => format!(
            "{} [{}] {} → {} ({})",
            rec.id,
            rec.category_id.label(),
            start,
            format_in_zone(end, zone, "%H:%M"),
            secs2readable(secs)
        ),
        _ => format!("{} [{}] {} → running", rec.id, rec.category_id.label(), start),
    }
}
