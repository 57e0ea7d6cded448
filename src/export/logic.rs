use crate::db::repository::LogRepository;
use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::LogExport;
use crate::models::{LogFilter, LogRecord};
use crate::ui::messages::warning;
use crate::utils::date::range_bounds;
use chrono::NaiveDate;
use std::path::Path;
use tracing::debug;

pub struct ExportLogic;

impl ExportLogic {
    /// Export logs, ordered by start.
    ///
    /// `range` is `None`, `"all"`, or `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, or
    /// two of those joined by `:`. Bounds apply to the day key, inclusive.
    /// Returns how many logs were written; nothing is written when none match.
    pub fn export<R: LogRepository>(
        repo: &R,
        format: ExportFormat,
        file: &str,
        range: Option<&str>,
        force: bool,
    ) -> AppResult<usize> {
        let bounds = parse_range(range)?;
        let path = Path::new(file);
        ensure_writable(path, force)?;

        let rows: Vec<LogExport> = select(repo.list_all(&LogFilter::all())?, bounds)
            .iter()
            .map(LogExport::from)
            .collect();
        debug!(count = rows.len(), format = format.as_str(), "export selected");

        if rows.is_empty() {
            warning("No logs found for the selected range.");
            return Ok(0);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        match format {
            ExportFormat::Csv => export_csv(&rows, path)?,
            ExportFormat::Json => export_json(&rows, path)?,
        }

        Ok(rows.len())
    }
}

fn parse_range(range: Option<&str>) -> AppResult<Option<(NaiveDate, NaiveDate)>> {
    match range {
        None => Ok(None),
        Some(r) if r.eq_ignore_ascii_case("all") => Ok(None),
        Some(r) => range_bounds(r).map(Some).map_err(AppError::InvalidDate),
    }
}

fn select(logs: Vec<LogRecord>, bounds: Option<(NaiveDate, NaiveDate)>) -> Vec<LogRecord> {
    match bounds {
        None => logs,
        Some((from, to)) => logs
            .into_iter()
            .filter(|l| l.day_key >= from && l.day_key <= to)
            .collect(),
    }
}
