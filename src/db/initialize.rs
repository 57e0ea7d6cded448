use crate::db::migrate::run_pending_migrations;
use crate::errors::{AppError, AppResult};
use rusqlite::Connection;
use tracing::debug;

/// Bring the schema up to date.
/// Called by `init` and every time a command opens the store.
pub fn init_db(conn: &Connection) -> AppResult<()> {
    run_pending_migrations(conn).map_err(|e| AppError::Migration(e.to_string()))?;
    debug!("schema up to date");
    Ok(())
}
