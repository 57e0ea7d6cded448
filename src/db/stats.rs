use crate::db::pool::DbPool;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use crate::utils::formatting::secs2readable;
use chrono::NaiveDate;
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) TOTAL LOGS / RUNNING
    //
    let count: i64 = pool
        .conn
        .query_row("SELECT COUNT(*) FROM logs", [], |row| row.get(0))?;
    let running: i64 = pool.conn.query_row(
        "SELECT COUNT(*) FROM logs WHERE end_at IS NULL",
        [],
        |row| row.get(0),
    )?;
    println!("{}• Total logs:{} {}{}{}", CYAN, RESET, GREEN, count, RESET);
    println!("{}• Running:{} {}", CYAN, RESET, running);

    let tracked: i64 = pool.conn.query_row(
        "SELECT IFNULL(SUM(duration_sec), 0) FROM logs",
        [],
        |row| row.get(0),
    )?;
    println!("{}• Tracked:{} {}", CYAN, RESET, secs2readable(tracked));

    //
    // 3) DAY RANGE
    //
    let first_day: Option<String> = pool
        .conn
        .query_row("SELECT MIN(day_key) FROM logs", [], |row| row.get(0))
        .optional()?
        .flatten();

    let last_day: Option<String> = pool
        .conn
        .query_row("SELECT MAX(day_key) FROM logs", [], |row| row.get(0))
        .optional()?
        .flatten();

    let fmt_first = first_day
        .clone()
        .unwrap_or_else(|| format!("{GREY}--{RESET}"));
    let fmt_last = last_day
        .clone()
        .unwrap_or_else(|| format!("{GREY}--{RESET}"));

    println!("{}• Day range:{}", CYAN, RESET);
    println!("    from: {}", fmt_first);
    println!("    to:   {}", fmt_last);

    //
    // 4) AVERAGE LOGS/DAY
    //
    if let (Some(f), Some(l)) = (first_day, last_day) {
        let d1 = parse_date(&f)?;
        let d2 = parse_date(&l)?;
        let days = (d2 - d1).num_days().max(1);

        let avg = count as f64 / days as f64;
        println!("{}• Average logs/day:{} {:.2}", CYAN, RESET, avg);
    }

    println!();
    Ok(())
}

fn parse_date(date_str: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}
