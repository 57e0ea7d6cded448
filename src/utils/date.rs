use crate::core::derive::DayZone;
use chrono::{Datelike, NaiveDate, Utc};

pub fn today(zone: DayZone) -> NaiveDate {
    zone.day_key(Utc::now())
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// First and last day covered by `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
pub fn period_bounds(p: &str) -> Result<(NaiveDate, NaiveDate), String> {
    // YYYY-MM-DD
    if let Some(d) = parse_date(p) {
        return Ok((d, d));
    }

    // YYYY-MM
    if let Ok(first) = NaiveDate::parse_from_str(&format!("{p}-01"), "%Y-%m-%d") {
        let next = if first.month() == 12 {
            NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
        };
        let last = next
            .and_then(|n| n.pred_opt())
            .ok_or_else(|| format!("Invalid period: {p}"))?;
        return Ok((first, last));
    }

    // YYYY
    if p.len() == 4
        && let Ok(year) = p.parse::<i32>()
        && let (Some(first), Some(last)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        )
    {
        return Ok((first, last));
    }

    Err(format!("Invalid period: {p}"))
}

/// A single period or `A:B`, where both ends are periods.
pub fn range_bounds(expr: &str) -> Result<(NaiveDate, NaiveDate), String> {
    match expr.split_once(':') {
        Some((a, b)) => {
            let (start, _) = period_bounds(a.trim())?;
            let (_, end) = period_bounds(b.trim())?;
            if end < start {
                return Err(format!("Invalid range (end before start): {expr}"));
            }
            Ok((start, end))
        }
        None => period_bounds(expr.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn periods() {
        assert_eq!(period_bounds("2024-02").unwrap(), (d("2024-02-01"), d("2024-02-29")));
        assert_eq!(period_bounds("2023-12").unwrap(), (d("2023-12-01"), d("2023-12-31")));
        assert_eq!(period_bounds("2024").unwrap(), (d("2024-01-01"), d("2024-12-31")));
        assert_eq!(period_bounds("2024-05-06").unwrap(), (d("2024-05-06"), d("2024-05-06")));
        assert!(period_bounds("soon").is_err());
    }

    #[test]
    fn ranges() {
        assert_eq!(
            range_bounds("2024-01:2024-03").unwrap(),
            (d("2024-01-01"), d("2024-03-31"))
        );
        assert!(range_bounds("2024-03:2024-01").is_err());
    }
}
