use crate::api::{LogsQuery, get_logs};
use crate::cache::LocalCache;
use crate::cli::commands::{open_store, parse_category};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::derive::DayZone;
use crate::errors::{AppError, AppResult, ErrorKind};
use crate::models::{LogFilter, LogRecord};
use crate::ui::messages::{info, warning};
use crate::utils::colors::{RESET, color_for_state, colorize_optional};
use crate::utils::date::{parse_date, today};
use crate::utils::formatting::{bold, secs2hhmm};
use crate::utils::table::{Column, Table};
use crate::utils::time::format_in_zone;
use tracing::warn;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List {
        day,
        today: only_today,
        category,
        task,
        json,
    } = cmd
    {
        let zone = cfg.zone()?;
        let day = match (day, *only_today) {
            (Some(d), _) => Some(parse_date(d).ok_or_else(|| AppError::InvalidDate(d.clone()))?),
            (None, true) => Some(today(zone)),
            (None, false) => None,
        };
        let query = LogsQuery {
            day,
            category_id: category.as_deref().map(parse_category).transpose()?,
            task_id: task.clone(),
        };

        let logs = match open_store(cfg) {
            Ok(mut store) => match get_logs(&mut store, &query) {
                Ok(logs) => logs,
                Err(e) if e.kind() == ErrorKind::Transport => stale(store.logs(), &query, &e),
                Err(e) => return Err(e),
            },
            Err(e) if e.kind() == ErrorKind::Transport => {
                stale(&LocalCache::open(&cfg.cache_file).get_all_logs(), &query, &e)
            }
            Err(e) => return Err(e),
        };

        if *json {
            println!("{}", serde_json::to_string_pretty(&logs)?);
            return Ok(());
        }

        if logs.is_empty() {
            info("No logs found.");
            return Ok(());
        }

        print_table(&logs, zone);
    }
    Ok(())
}

/// Serve the cached copy when the database cannot be read.
fn stale(cached: &[LogRecord], query: &LogsQuery, err: &AppError) -> Vec<LogRecord> {
    warn!("database unavailable, listing cached logs: {err}");
    warning(format!("Database unavailable ({err}); showing cached logs, which may be stale."));

    let filter = LogFilter::from(query);
    let mut logs: Vec<LogRecord> = cached.iter().filter(|l| filter.matches(l)).cloned().collect();
    logs.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
    logs
}

fn print_table(logs: &[LogRecord], zone: DayZone) {
    let mut table = Table::new(vec![
        Column::new("ID", 26),
        Column::new("DAY", 10),
        Column::new("CATEGORY", 14),
        Column::new("START", 5),
        Column::new("END", 5),
        Column::new("TIME", 6),
        Column::new("NOTE", 0),
    ]);

    for l in logs {
        let end = l
            .end
            .map(|e| format_in_zone(e, zone, "%H:%M"))
            .unwrap_or_else(|| "--:--".to_string());
        let time = l.duration_sec.map(secs2hhmm).unwrap_or_else(|| "--".into());

        table.add_row(vec![
            format!("{}{}{}", color_for_state(l.is_open()), l.id, RESET),
            l.day_key_str(),
            l.category_id.label().to_string(),
            format_in_zone(l.start, zone, "%H:%M"),
            colorize_optional(&end),
            colorize_optional(&time),
            l.note.clone(),
        ]);
    }

    print!("{}", table.render());

    let total: i64 = logs.iter().filter_map(|l| l.duration_sec).sum();
    println!("\n{} {}", bold("Total:"), secs2hhmm(total));
}
