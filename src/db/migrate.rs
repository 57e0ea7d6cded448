use rusqlite::{Connection, OptionalExtension, Result};
use tracing::{info, warn};

const SINGLE_OPEN_INDEX: &str = "20250301_0002_single_open_log_index";

/// Ensure that the `log` (audit) table exists.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

/// Create the `logs` table with its lookup indices.
fn create_logs_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS logs (
            id            TEXT PRIMARY KEY,
            category_id   TEXT NOT NULL,
            task_id       TEXT,
            start_at      TEXT NOT NULL,
            end_at        TEXT,
            note          TEXT NOT NULL DEFAULT '',
            day_key       TEXT NOT NULL,
            duration_sec  INTEGER CHECK(duration_sec IS NULL OR duration_sec >= 0),
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL,
            CHECK((end_at IS NULL) = (duration_sec IS NULL))
        );

        CREATE INDEX IF NOT EXISTS idx_logs_start ON logs(start_at);
        CREATE INDEX IF NOT EXISTS idx_logs_day ON logs(day_key);
        CREATE INDEX IF NOT EXISTS idx_logs_category ON logs(category_id);
        CREATE INDEX IF NOT EXISTS idx_logs_task ON logs(task_id);
        "#,
    )?;
    Ok(())
}

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// At most one row may have `end_at IS NULL`; enforced by a partial unique index.
fn migrate_single_open_index(conn: &Connection) -> Result<()> {
    if migration_applied(conn, SINGLE_OPEN_INDEX)? {
        return Ok(());
    }

    let open: i64 = conn.query_row(
        "SELECT COUNT(*) FROM logs WHERE end_at IS NULL",
        [],
        |row| row.get(0),
    )?;
    if open > 1 {
        warn!(
            open,
            "multiple running logs found; open-log index not created until they are stopped"
        );
        return Ok(());
    }

    conn.execute_batch(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_logs_single_open
         ON logs((end_at IS NULL)) WHERE end_at IS NULL;",
    )?;
    mark_applied(
        conn,
        SINGLE_OPEN_INDEX,
        "Added unique index allowing a single running log",
    )?;

    info!("migration applied: {SINGLE_OPEN_INDEX}");
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Idempotent; called by `init` and every time the store is opened.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;

    if !table_exists(conn, "logs")? {
        create_logs_table(conn)?;
        mark_applied(conn, "20250301_0001_create_logs", "Created logs table")?;
        info!("created logs table");
    } else {
        create_logs_table(conn)?;
    }

    migrate_single_open_index(conn)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        run_pending_migrations(&conn).unwrap();

        let applied: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(applied, 2);
    }

    #[test]
    fn open_log_index_deferred_when_data_violates_it() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_log_table(&conn).unwrap();
        create_logs_table(&conn).unwrap();
        for id in ["a", "b"] {
            conn.execute(
                "INSERT INTO logs (id, category_id, start_at, day_key, created_at, updated_at)
                 VALUES (?1, 'c_fun', '2024-01-01T00:00:00.000000Z', '2024-01-01',
                         '2024-01-01T00:00:00.000000Z', '2024-01-01T00:00:00.000000Z')",
                [id],
            )
            .unwrap();
        }

        run_pending_migrations(&conn).unwrap();
        assert!(!migration_applied(&conn, SINGLE_OPEN_INDEX).unwrap());
    }
}
