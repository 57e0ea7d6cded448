use crate::api::{CreateLogRequest, post_logs};
use crate::cli::commands::{audit, describe, open_store, parse_category};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::success;
use crate::utils::date::today;
use crate::utils::time::{parse_optional_timestamp, parse_timestamp};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Add {
        category,
        start,
        end,
        task,
        note,
    } = cmd
    {
        let category_id = parse_category(category)?;
        let zone = cfg.zone()?;
        let day = today(zone);
        let start = parse_timestamp(start, zone, day)?;
        let end = parse_optional_timestamp(end.as_ref(), zone, day)?;

        let mut store = open_store(cfg)?;
        let rec = post_logs(
            &mut store,
            CreateLogRequest {
                category_id,
                task_id: task.clone(),
                note: note.clone(),
                start: Some(start),
                end,
            },
        )?;

        audit(
            &store,
            "insert",
            &rec.id,
            &format!("Inserted {} on {}", rec.category_id.code(), rec.day_key_str()),
        );
        success(format!("Added {}", describe(&rec, zone)));
    }
    Ok(())
}
