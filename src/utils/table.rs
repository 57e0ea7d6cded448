//! Table rendering utilities for CLI outputs.

use regex::Regex;
use std::sync::LazyLock;

static ANSI: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\x1B\[[0-9;]*[mK]").ok());

/// Visible length of `s`, ignoring ANSI escapes.
pub fn visible_len(s: &str) -> usize {
    match ANSI.as_ref() {
        Some(re) => re.replace_all(s, "").chars().count(),
        None => s.chars().count(),
    }
}

pub struct Column {
    pub header: String,
    pub width: usize,
}

impl Column {
    pub fn new(header: &str, width: usize) -> Self {
        Self {
            header: header.to_string(),
            width,
        }
    }
}

pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn push_cell(out: &mut String, cell: &str, width: usize) {
        out.push_str(cell);
        out.push_str(&" ".repeat(width.saturating_sub(visible_len(cell)) + 1));
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        for col in &self.columns {
            Self::push_cell(&mut out, &col.header, col.width);
        }
        out.push('\n');

        for row in &self.rows {
            for (i, col) in self.columns.iter().enumerate() {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                Self::push_cell(&mut out, cell, col.width);
            }
            out.push('\n');
        }

        out
    }
}
