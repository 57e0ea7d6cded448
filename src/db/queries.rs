//! SQLite-backed log repository.

use crate::core::derive::DayZone;
use crate::db::pool::DbPool;
use crate::db::repository::{LogRepository, conflict_open, materialize, new_id, patch_record};
use crate::errors::{AppError, AppResult};
use crate::models::{CategoryId, LogFilter, LogPatch, LogRecord, NewLog};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, warn};

const SELECT_LOGS: &str = "SELECT id, category_id, task_id, start_at, end_at, note, day_key, \
                           duration_sec, created_at, updated_at FROM logs";

pub struct SqliteLogRepository {
    pool: DbPool,
    zone: DayZone,
}

impl SqliteLogRepository {
    pub fn new(pool: DbPool, zone: DayZone) -> Self {
        Self { pool, zone }
    }

    pub fn conn(&self) -> &Connection {
        &self.pool.conn
    }

    fn load(conn: &Connection, id: &str) -> AppResult<Option<LogRecord>> {
        let sql = format!("{SELECT_LOGS} WHERE id = ?1");
        let rec = conn.query_row(&sql, [id], map_row).optional()?;
        Ok(rec)
    }

    fn open_other_than(conn: &Connection, id: Option<&str>) -> AppResult<Option<String>> {
        let other = conn
            .query_row(
                "SELECT id FROM logs WHERE end_at IS NULL AND id IS NOT ?1 LIMIT 1",
                [id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(other)
    }
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
pub fn ts_to_db(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_err(idx: usize, what: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        Box::new(AppError::InvalidTime(what)),
    )
}

fn ts_from_db(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| conversion_err(idx, raw.to_string()))
}

pub fn map_row(row: &Row) -> rusqlite::Result<LogRecord> {
    let cat_str: String = row.get("category_id")?;
    let category_id = CategoryId::from_db_str(&cat_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidCategory(cat_str.clone())),
        )
    })?;

    let start_str: String = row.get("start_at")?;
    let end_str: Option<String> = row.get("end_at")?;
    let day_str: String = row.get("day_key")?;
    let created_str: String = row.get("created_at")?;
    let updated_str: String = row.get("updated_at")?;

    let day_key = NaiveDate::parse_from_str(&day_str, "%Y-%m-%d").map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidDate(day_str.clone())),
        )
    })?;

    Ok(LogRecord {
        id: row.get("id")?,
        category_id,
        task_id: row.get("task_id")?,
        start: ts_from_db(3, &start_str)?,
        end: end_str.as_deref().map(|s| ts_from_db(4, s)).transpose()?,
        note: row.get("note")?,
        day_key,
        duration_sec: row.get("duration_sec")?,
        created_at: ts_from_db(8, &created_str)?,
        updated_at: ts_from_db(9, &updated_str)?,
    })
}

const SINGLE_OPEN_INDEX: &str = "idx_logs_single_open";

/// Only the partial unique index on open rows means "another log is running".
fn violates_single_open(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, msg) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                && msg.as_deref().is_none_or(|m| m.contains(SINGLE_OPEN_INDEX))
        }
        _ => false,
    }
}

/// The partial unique index on open rows turns a racing double-open into a constraint error.
fn map_write_err(err: rusqlite::Error) -> AppError {
    if violates_single_open(&err) {
        warn!("open-log constraint rejected a write: {err}");
        AppError::Conflict("another log is already running".to_string())
    } else {
        AppError::Db(err)
    }
}

pub fn insert_log(conn: &Connection, rec: &LogRecord) -> AppResult<()> {
    conn.execute(
        "INSERT INTO logs (id, category_id, task_id, start_at, end_at, note, day_key,
                           duration_sec, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            rec.id,
            rec.category_id.to_db_str(),
            rec.task_id,
            ts_to_db(&rec.start),
            rec.end.as_ref().map(ts_to_db),
            rec.note,
            rec.day_key_str(),
            rec.duration_sec,
            ts_to_db(&rec.created_at),
            ts_to_db(&rec.updated_at),
        ],
    )
    .map_err(map_write_err)?;
    Ok(())
}

/// Update a log (all fields except id and created_at)
pub fn update_log(conn: &Connection, rec: &LogRecord) -> AppResult<()> {
    conn.execute(
        "UPDATE logs
         SET category_id = ?1, task_id = ?2, start_at = ?3, end_at = ?4,
             note = ?5, day_key = ?6, duration_sec = ?7, updated_at = ?8
         WHERE id = ?9",
        params![
            rec.category_id.to_db_str(),
            rec.task_id,
            ts_to_db(&rec.start),
            rec.end.as_ref().map(ts_to_db),
            rec.note,
            rec.day_key_str(),
            rec.duration_sec,
            ts_to_db(&rec.updated_at),
            rec.id,
        ],
    )
    .map_err(map_write_err)?;
    Ok(())
}

impl LogRepository for SqliteLogRepository {
    fn create(&self, new: NewLog) -> AppResult<LogRecord> {
        let conn = self.conn();
        if new.end.is_none()
            && let Some(other) = Self::open_other_than(conn, None)?
        {
            return Err(conflict_open(&other));
        }

        let rec = materialize(new_id(), new, Utc::now(), self.zone);
        insert_log(conn, &rec)?;
        debug!(id = %rec.id, category = %rec.category_id, "inserted log");

        Self::load(conn, &rec.id)?
            .ok_or_else(|| AppError::Other(format!("log {} vanished after insert", rec.id)))
    }

    fn update(&self, id: &str, patch: &LogPatch) -> AppResult<LogRecord> {
        let tx = self.conn().unchecked_transaction()?;

        let mut rec = Self::load(&tx, id)?.ok_or_else(|| AppError::NotFound(id.to_string()))?;
        patch_record(&mut rec, patch, Utc::now(), self.zone);

        if rec.is_open()
            && let Some(other) = Self::open_other_than(&tx, Some(id))?
        {
            return Err(conflict_open(&other));
        }

        update_log(&tx, &rec)?;
        let stored = Self::load(&tx, id)?.ok_or_else(|| AppError::NotFound(id.to_string()))?;
        tx.commit()?;

        debug!(id = %stored.id, "updated log");
        Ok(stored)
    }

    fn find_by_id(&self, id: &str) -> AppResult<Option<LogRecord>> {
        Self::load(self.conn(), id)
    }

    fn list_all(&self, filter: &LogFilter) -> AppResult<Vec<LogRecord>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(day) = filter.day_key {
            clauses.push("day_key = ?");
            values.push(day.format("%Y-%m-%d").to_string());
        }
        if let Some(cat) = filter.category_id {
            clauses.push("category_id = ?");
            values.push(cat.to_db_str().to_string());
        }
        if let Some(task) = &filter.task_id {
            clauses.push("task_id = ?");
            values.push(task.clone());
        }
        if filter.open_only {
            clauses.push("end_at IS NULL");
        }

        let mut sql = SELECT_LOGS.to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY start_at ASC, id ASC");

        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(values.iter()), map_row)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}
