//! Deadline input parsing.

use super::error::{DeckError, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

/// Parses a user-typed deadline, interpreting wall-clock forms in `now`'s zone.
///
/// Accepted: RFC 3339, `YYYY-MM-DD HH:MM`, `YYYY-MM-DDTHH:MM`, `YYYY-MM-DD`
/// (start of day), and `today` / `tomorrow` with an optional `HH:MM`.
///
/// # Errors
/// Returns `DeckError::Validation` on unparseable input or a wall-clock time
/// that does not exist in the zone.
pub fn parse_deadline<Tz: TimeZone>(input: &str, now: &DateTime<Tz>) -> Result<DateTime<Utc>> {
    let s = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let invalid = || DeckError::validation("deadline", format!("cannot parse '{input}'"));
    let lower = s.to_lowercase();
    let today = now.date_naive();

    let (date, time_part) = if let Some(rest) = lower.strip_prefix("tomorrow") {
        (today.succ_opt().ok_or_else(invalid)?, rest.trim())
    } else if let Some(rest) = lower.strip_prefix("today") {
        (today, rest.trim())
    } else {
        let (d, t) = s
            .split_once(|c: char| c == ' ' || c == 'T')
            .map_or((s, ""), |(d, t)| (d, t.trim()));
        let date = NaiveDate::parse_from_str(d, "%Y-%m-%d").map_err(|_| invalid())?;
        (date, t)
    };

    let time = if time_part.is_empty() {
        NaiveTime::MIN
    } else {
        NaiveTime::parse_from_str(time_part, "%H:%M").map_err(|_| invalid())?
    };

    now.timezone()
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 18, 10, 0, 0)
            .unwrap()
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_rfc3339() {
        let dt = parse_deadline("2026-10-20T08:00:00Z", &now()).unwrap();
        assert_eq!(dt, utc(2026, 10, 20, 8, 0));
    }

    #[test]
    fn test_date_and_time_in_local_zone() {
        assert_eq!(
            parse_deadline("2026-10-20 18:00", &now()).unwrap(),
            utc(2026, 10, 20, 15, 0)
        );
        assert_eq!(
            parse_deadline("2026-10-20T18:00", &now()).unwrap(),
            utc(2026, 10, 20, 15, 0)
        );
    }

    #[test]
    fn test_date_only_is_start_of_day() {
        assert_eq!(
            parse_deadline("2026-10-20", &now()).unwrap(),
            utc(2026, 10, 19, 21, 0)
        );
    }

    #[test]
    fn test_relative_words() {
        assert_eq!(
            parse_deadline("today 18:00", &now()).unwrap(),
            utc(2026, 10, 18, 15, 0)
        );
        assert_eq!(
            parse_deadline("Tomorrow 09:00", &now()).unwrap(),
            utc(2026, 10, 19, 6, 0)
        );
        assert_eq!(
            parse_deadline("tomorrow", &now()).unwrap(),
            utc(2026, 10, 18, 21, 0)
        );
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_deadline("next week", &now()).is_err());
        assert!(parse_deadline("2026-13-01", &now()).is_err());
        assert!(parse_deadline("today 25:00", &now()).is_err());
    }
}
