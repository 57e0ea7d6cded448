//! Time utilities: parse user-supplied timestamps in the configured zone.

use crate::core::derive::DayZone;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(t, "%H:%M").ok()
}

/// Interpret a wall-clock time in `zone`. Ambiguous local times take the earlier instant.
pub fn local_to_utc(naive: NaiveDateTime, zone: DayZone) -> Option<DateTime<Utc>> {
    match zone {
        DayZone::Local => Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
        DayZone::Fixed(off) => off
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]` (also with `T`), or `HH:MM` on `today`.
pub fn parse_timestamp(input: &str, zone: DayZone, today: NaiveDate) -> AppResult<DateTime<Utc>> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| parse_time(s).map(|t| today.and_time(t)))
        .ok_or_else(|| AppError::InvalidTime(s.to_string()))?;

    local_to_utc(naive, zone).ok_or_else(|| {
        AppError::InvalidTime(format!("{s} does not exist in the configured zone"))
    })
}

pub fn parse_optional_timestamp(
    input: Option<&String>,
    zone: DayZone,
    today: NaiveDate,
) -> AppResult<Option<DateTime<Utc>>> {
    input.map(|s| parse_timestamp(s, zone, today)).transpose()
}

/// Render a UTC instant as wall-clock time in `zone`.
pub fn format_in_zone(ts: DateTime<Utc>, zone: DayZone, fmt: &str) -> String {
    match zone {
        DayZone::Local => ts.with_timezone(&Local).format(fmt).to_string(),
        DayZone::Fixed(off) => ts.with_timezone(&off).format(fmt).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn jst() -> DayZone {
        DayZone::Fixed(FixedOffset::east_opt(9 * 3600).unwrap())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    #[test]
    fn rfc3339_keeps_instant() {
        let ts = parse_timestamp("2024-04-01T08:00:00+09:00", DayZone::Local, today()).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-31T23:00:00+00:00");
    }

    #[test]
    fn naive_forms_use_zone() {
        let ts = parse_timestamp("2024-04-01 08:30", jst(), today()).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-31T23:30:00+00:00");
        let ts = parse_timestamp("10:15", jst(), today()).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-04-01T01:15:00+00:00");
    }

    #[test]
    fn garbage_is_invalid_time() {
        assert!(matches!(
            parse_timestamp("yesterday-ish", jst(), today()),
            Err(AppError::InvalidTime(_))
        ));
    }

    #[test]
    fn formats_in_zone() {
        let ts = parse_timestamp("2024-04-01T00:00:00Z", jst(), today()).unwrap();
        assert_eq!(format_in_zone(ts, jst(), "%Y-%m-%d %H:%M"), "2024-04-01 09:00");
    }
}
