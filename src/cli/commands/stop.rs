use crate::cli::commands::{audit, describe, open_store};
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

pub fn handle(cfg: &Config) -> AppResult<()> {
    let zone = cfg.zone()?;
    let mut store = open_store(cfg)?;

    match store.stop()? {
        Some(rec) => {
            audit(
                &store,
                "stop",
                &rec.id,
                &format!("Stopped after {}s", rec.duration_sec.unwrap_or(0)),
            );
            success(format!("Stopped {}", describe(&rec, zone)));
        }
        None => info("Nothing is running."),
    }
    Ok(())
}
