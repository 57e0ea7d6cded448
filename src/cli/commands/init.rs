use crate::cache::LocalCache;
use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::log::ttlog;
use crate::errors::AppResult;
use crate::models::Category;
use crate::ui::messages::{info, success, warning};
use rusqlite::Connection;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (left untouched in test mode)
///  - the SQLite database with all pending migrations
///  - the local cache, seeded with the built-in categories
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.db.clone(), cli.test)?;

    info(format!("Config file : {}", Config::config_file().display()));
    info(format!("Database    : {}", cfg.database));

    let conn = Connection::open(&cfg.database)?;
    init_db(&conn)?;

    let cache = LocalCache::open(&cfg.cache_file);
    if let Err(e) = cache.bulk_put(&Category::builtin()) {
        warning(format!("Failed to seed local cache: {e}"));
    }

    if let Err(e) = ttlog(
        &conn,
        "init",
        &cfg.database,
        &format!("Database initialized at {}", cfg.database),
    ) {
        warning(format!("Failed to write internal log: {e}"));
    }

    success("dayclock initialization completed!");
    Ok(())
}
