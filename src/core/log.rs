use crate::db::log::{AuditEntry, load_log};
use crate::errors::AppResult;
use ansi_term::Colour;
use regex::Regex;
use rusqlite::Connection;
use std::sync::LazyLock;

const OP_WIDTH: usize = 60;

static ANSI: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\x1B\[[0-9;]*[mK]").ok());

fn strip_ansi(s: &str) -> String {
    match ANSI.as_ref() {
        Some(re) => re.replace_all(s, "").into_owned(),
        None => s.to_string(),
    }
}

fn color_for_operation(op: &str) -> Colour {
    match op {
        "start" | "insert" => Colour::Green,
        "stop" => Colour::Red,
        "update" => Colour::Yellow,
        "migration_applied" => Colour::Purple,
        "backup" | "export" => Colour::Blue,
        "init" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

/// Render one audit row as `id: date | op (target) => message`.
fn render_entry(e: &AuditEntry, id_w: usize, date_w: usize, op_w: usize) -> String {
    let color = color_for_operation(&e.operation);

    let mut visible = if e.target.is_empty() {
        e.operation.clone()
    } else {
        format!("{} ({})", e.operation, e.target)
    };
    if visible.chars().count() > OP_WIDTH {
        visible = visible.chars().take(OP_WIDTH - 3).collect::<String>() + "...";
    }

    // only the operation word is colored
    let colored = match visible.split_once(' ') {
        Some((op, rest)) => format!("{} {}", color.paint(op), rest),
        None => color.paint(visible.as_str()).to_string(),
    };
    let padding = " ".repeat(op_w.saturating_sub(strip_ansi(&colored).chars().count()));

    format!(
        "{:>id_w$}: {:<date_w$} | {}{} => {}",
        e.id, e.date, colored, padding, e.message
    )
}

pub struct LogLogic;

impl LogLogic {
    pub fn render(entries: &[AuditEntry]) -> Vec<String> {
        let id_w = entries
            .iter()
            .map(|e| e.id.to_string().len())
            .max()
            .unwrap_or(1);
        let date_w = entries.iter().map(|e| e.date.len()).max().unwrap_or(10);
        let op_w = entries
            .iter()
            .map(|e| match e.target.is_empty() {
                true => e.operation.chars().count(),
                false => e.operation.chars().count() + e.target.chars().count() + 3,
            })
            .max()
            .unwrap_or(10)
            .min(OP_WIDTH);

        entries
            .iter()
            .map(|e| render_entry(e, id_w, date_w, op_w))
            .collect()
    }

    pub fn print_log(conn: &Connection) -> AppResult<()> {
        let entries = load_log(conn)?;
        println!("📜 Internal log:\n");
        for line in Self::render(&entries) {
            println!("{line}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, op: &str, target: &str) -> AuditEntry {
        AuditEntry {
            id,
            date: "2024-05-01T08:00:00Z".into(),
            operation: op.into(),
            target: target.into(),
            message: "msg".into(),
        }
    }

    #[test]
    fn rendered_lines_align_without_ansi() {
        let lines = LogLogic::render(&[entry(1, "init", ""), entry(12, "start", "01HX")]);
        let plain: Vec<String> = lines.iter().map(|l| strip_ansi(l)).collect();
        assert!(plain[0].starts_with(" 1: 2024-05-01T08:00:00Z | init"));
        assert!(plain[1].starts_with("12: 2024-05-01T08:00:00Z | start (01HX)"));
        assert_eq!(plain[0].find("=>"), plain[1].find("=>"));
    }

    #[test]
    fn long_targets_are_truncated() {
        let long = "x".repeat(100);
        let line = strip_ansi(&LogLogic::render(&[entry(1, "backup", &long)])[0]);
        assert!(line.contains("..."));
    }
}
