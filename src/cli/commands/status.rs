use crate::cli::commands::{describe, open_store};
use crate::config::Config;
use crate::core::RunState;
use crate::errors::AppResult;
use crate::ui::messages::info;
use crate::utils::formatting::secs2readable;
use chrono::Utc;

pub fn handle(cfg: &Config) -> AppResult<()> {
    let zone = cfg.zone()?;
    let store = open_store(cfg)?;

    match store.tracker().state()? {
        RunState::Running(rec) => {
            let elapsed = (Utc::now() - rec.start).num_seconds().max(0);
            println!("● Running: {}", describe(&rec, zone));
            println!("  Elapsed: {}", secs2readable(elapsed));
            if !rec.note.is_empty() {
                println!("  Note:    {}", rec.note);
            }
        }
        RunState::Idle => info("Idle: nothing is running."),
    }
    Ok(())
}
