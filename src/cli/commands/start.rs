use crate::api::{CreateLogRequest, post_logs};
use crate::cli::commands::{audit, describe, open_store, parse_category};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::RunState;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Start {
        category,
        task,
        note,
    } = cmd
    {
        let category_id = match category {
            Some(c) => parse_category(c)?,
            None => cfg.default_category_id()?,
        };
        let zone = cfg.zone()?;
        let mut store = open_store(cfg)?;

        if let RunState::Running(current) = store.tracker().state()? {
            warning(format!(
                "Already running: {}. Stop it first to switch.",
                describe(&current, zone)
            ));
            return Ok(());
        }

        let rec = post_logs(
            &mut store,
            CreateLogRequest {
                category_id,
                task_id: task.clone(),
                note: note.clone(),
                start: None,
                end: None,
            },
        )?;

        audit(&store, "start", &rec.id, &format!("Started {}", rec.category_id.code()));
        success(format!("Started {}", describe(&rec, zone)));
    }
    Ok(())
}
