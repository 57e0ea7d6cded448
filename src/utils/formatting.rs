//! Formatting utilities used for CLI and export outputs.

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

/// Seconds as `HHh MMm SSs`, e.g. `01h 05m 00s`.
pub fn secs2readable(secs: i64) -> String {
    let s = secs.max(0);
    format!("{:02}h {:02}m {:02}s", s / 3600, (s % 3600) / 60, s % 60)
}

/// Seconds as `HH:MM`, truncated to the minute.
pub fn secs2hhmm(secs: i64) -> String {
    let s = secs.max(0);
    format!("{:02}:{:02}", s / 3600, (s % 3600) / 60)
}
