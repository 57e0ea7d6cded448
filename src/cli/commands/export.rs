use crate::cli::commands::{audit, open_store};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::export::ExportLogic;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        range,
        force,
    } = cmd
    {
        let store = open_store(cfg)?;
        let count = ExportLogic::export(
            store.tracker().repo(),
            *format,
            file,
            range.as_deref(),
            *force,
        )?;
        if count > 0 {
            audit(
                &store,
                "export",
                file,
                &format!("Exported {count} logs as {}", format.as_str()),
            );
        }
    }
    Ok(())
}
