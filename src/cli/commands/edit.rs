use crate::api::patch_log;
use crate::cli::commands::{audit, describe, open_store, parse_category};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::LogPatch;
use crate::ui::messages::{success, warning};
use crate::utils::date::today;
use crate::utils::time::{parse_optional_timestamp, parse_timestamp};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Edit {
        id,
        category,
        start,
        end,
        reopen,
        task,
        no_task,
        note,
    } = cmd
    {
        let zone = cfg.zone()?;
        let day = today(zone);

        let patch = LogPatch {
            category_id: category.as_deref().map(parse_category).transpose()?,
            task_id: match (task, *no_task) {
                (_, true) => Some(None),
                (Some(t), false) => Some(Some(t.clone())),
                (None, false) => None,
            },
            start: start
                .as_deref()
                .map(|s| parse_timestamp(s, zone, day))
                .transpose()?,
            end: if *reopen {
                Some(None)
            } else {
                parse_optional_timestamp(end.as_ref(), zone, day)?.map(Some)
            },
            note: note.clone(),
        };

        if patch.is_empty() {
            warning("Nothing to change.");
            return Ok(());
        }

        let mut store = open_store(cfg)?;
        let rec = patch_log(&mut store, id, &patch)?;

        let fields = serde_json::to_string(&patch)?;
        audit(&store, "update", &rec.id, &fields);
        success(format!("Updated {}", describe(&rec, zone)));
    }
    Ok(())
}
