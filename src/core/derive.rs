//! Derived fields of a log: local day key and elapsed duration.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, Utc};

/// Zone used to compute the calendar day a log belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayZone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl DayZone {
    /// Parse `"local"` or a `±HH:MM` offset.
    pub fn parse(s: &str) -> AppResult<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("local") {
            return Ok(DayZone::Local);
        }
        if s.eq_ignore_ascii_case("utc") || s == "Z" {
            return Ok(DayZone::Fixed(Utc.fix()));
        }

        let (sign, rest) = if let Some(r) = s.strip_prefix('+') {
            (1, r)
        } else if let Some(r) = s.strip_prefix('-') {
            (-1, r)
        } else {
            return Err(AppError::Config(format!("Invalid UTC offset: {s}")));
        };
        let (h, m) = rest
            .split_once(':')
            .ok_or_else(|| AppError::Config(format!("Invalid UTC offset: {s}")))?;
        let h: i32 = h
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid UTC offset: {s}")))?;
        let m: i32 = m
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid UTC offset: {s}")))?;
        if h > 23 || m > 59 {
            return Err(AppError::Config(format!("Invalid UTC offset: {s}")));
        }

        FixedOffset::east_opt(sign * (h * 3600 + m * 60))
            .map(DayZone::Fixed)
            .ok_or_else(|| AppError::Config(format!("Invalid UTC offset: {s}")))
    }

    pub fn day_key(&self, ts: DateTime<Utc>) -> NaiveDate {
        day_key_of(ts, *self)
    }
}

/// Calendar date of `ts` as seen in `zone`.
pub fn day_key_of(ts: DateTime<Utc>, zone: DayZone) -> NaiveDate {
    match zone {
        DayZone::Local => ts.with_timezone(&Local).date_naive(),
        DayZone::Fixed(off) => ts.with_timezone(&off).date_naive(),
    }
}

/// Whole seconds from `start` to `end`, clamped at zero. `None` while open.
pub fn duration_of(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Option<i64> {
    end.map(|e| (e - start).num_seconds().max(0))
}
