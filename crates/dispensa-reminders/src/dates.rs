//! Calendar date handling for reminder instants.
//!
//! Item dates arrive as text (`YYYY-MM-DD`, sometimes with a `T...` tail from
//! ISO timestamps). Parsing never fails hard: bad input logs a warning and
//! yields `None`, and the caller skips the item.

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};

const YEAR_MIN: i32 = 2000;
const YEAR_MAX: i32 = 2100;

/// Quick shape check: the text must start with zero-padded `YYYY-MM-DD`.
pub fn has_date_shape(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() < 10 {
        return false;
    }
    bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes[..4].iter().all(|b| b.is_ascii_digit())
        && bytes[5..7].iter().all(|b| b.is_ascii_digit())
        && bytes[8..10].iter().all(|b| b.is_ascii_digit())
}

/// Parse an expiration date into the reminder instant at `hour` local time.
///
/// Rules, in order: take the part before the first `T`; split on `-` into
/// exactly three numeric parts (whitespace around a part is tolerated);
/// year 2000..=2100, month 1..=12, day 1..=31; the triple must name a real
/// calendar day. Anything else logs and returns `None`.
pub fn parse_reminder_instant(text: &str, hour: u8, item_id: &str) -> Option<DateTime<Utc>> {
    let date_part = text.split('T').next().unwrap_or(text);
    let parts: Vec<&str> = date_part.split('-').collect();
    if parts.len() != 3 {
        tracing::warn!("⚠️ Bad expiration date '{text}' for item {item_id}: expected YYYY-MM-DD");
        return None;
    }

    let (Ok(year), Ok(month), Ok(day)) = (
        parts[0].trim().parse::<i32>(),
        parts[1].trim().parse::<u32>(),
        parts[2].trim().parse::<u32>(),
    ) else {
        tracing::warn!("⚠️ Non-numeric expiration date '{text}' for item {item_id}");
        return None;
    };

    if !(YEAR_MIN..=YEAR_MAX).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day)
    {
        tracing::warn!(
            "⚠️ Expiration date out of range for item {item_id}: year={year} month={month} day={day}"
        );
        return None;
    }

    let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
        tracing::warn!("⚠️ '{text}' is not a real calendar day for item {item_id}");
        return None;
    };
    let Some(naive) = date.and_hms_opt(u32::from(hour), 0, 0) else {
        tracing::warn!("⚠️ Reminder hour {hour} is not a valid hour of day");
        return None;
    };

    // DST can leave a local time without a mapping; earliest() also picks the
    // first of an ambiguous pair.
    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => Some(local.with_timezone(&Utc)),
        None => {
            tracing::warn!("⚠️ Local time {naive} does not exist for item {item_id}");
            None
        }
    }
}

/// Instant for the pre-warning, `days` whole days before the expiry instant.
/// `None` only when the offset leaves the representable range.
pub fn pre_warning_instant(expiry: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    expiry.checked_sub_signed(Duration::try_days(days)?)
}

/// Whether reconciliation should consider this date at all: right shape, a
/// real calendar day, and today or later.
pub fn is_schedulable_date(text: &str, today: NaiveDate) -> bool {
    if !has_date_shape(text) {
        return false;
    }
    match NaiveDate::parse_from_str(&text[..10], "%Y-%m-%d") {
        Ok(date) => date >= today,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_plain_date_lands_on_local_hour() {
        let instant = parse_reminder_instant("2030-03-10", 9, "p1").unwrap();
        let local = instant.with_timezone(&Local);
        assert_eq!(local.hour(), 9);
        assert_eq!(local.minute(), 0);
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2030, 3, 10).unwrap());
    }

    #[test]
    fn test_parse_strips_time_tail() {
        let plain = parse_reminder_instant("2030-03-10", 9, "p1").unwrap();
        let tailed = parse_reminder_instant("2030-03-10T15:30:00.000Z", 9, "p1").unwrap();
        assert_eq!(plain, tailed);
    }

    #[test]
    fn test_parse_rejects_wrong_part_count() {
        assert!(parse_reminder_instant("2030-03", 9, "p1").is_none());
        assert!(parse_reminder_instant("2030-03-10-07", 9, "p1").is_none());
        assert!(parse_reminder_instant("", 9, "p1").is_none());
    }

    #[test]
    fn test_parse_rejects_non_numeric_parts() {
        assert!(parse_reminder_instant("2030-ab-10", 9, "p1").is_none());
        assert!(parse_reminder_instant("2030-03-1x", 9, "p1").is_none());
    }

    #[test]
    fn test_parse_tolerates_stray_whitespace_in_parts() {
        let plain = parse_reminder_instant("2030-03-10", 9, "p1").unwrap();
        assert_eq!(parse_reminder_instant("2030-03-10 ", 9, "p1"), Some(plain));
        assert_eq!(parse_reminder_instant("2030- 03-10", 9, "p1"), Some(plain));
    }

    #[test]
    fn test_parse_rejects_out_of_range_values() {
        assert!(parse_reminder_instant("1999-12-31", 9, "p1").is_none());
        assert!(parse_reminder_instant("2101-01-01", 9, "p1").is_none());
        assert!(parse_reminder_instant("2030-00-10", 9, "p1").is_none());
        assert!(parse_reminder_instant("2030-13-10", 9, "p1").is_none());
        assert!(parse_reminder_instant("2030-03-00", 9, "p1").is_none());
        assert!(parse_reminder_instant("2030-03-32", 9, "p1").is_none());
    }

    #[test]
    fn test_parse_rejects_impossible_calendar_day() {
        assert!(parse_reminder_instant("2030-02-30", 9, "p1").is_none());
        assert!(parse_reminder_instant("2030-04-31", 9, "p1").is_none());
    }

    #[test]
    fn test_parse_accepts_boundary_years() {
        assert!(parse_reminder_instant("2000-01-01", 9, "p1").is_some());
        assert!(parse_reminder_instant("2100-12-31", 9, "p1").is_some());
    }

    #[test]
    fn test_pre_warning_is_exact_whole_days_before() {
        let expiry = parse_reminder_instant("2030-03-10", 9, "p1").unwrap();
        let pre = pre_warning_instant(expiry, 3).unwrap();
        assert_eq!((expiry - pre).num_seconds(), 3 * 86_400);
    }

    #[test]
    fn test_pre_warning_absurd_offset_is_none() {
        let expiry = parse_reminder_instant("2030-03-10", 9, "p1").unwrap();
        assert!(pre_warning_instant(expiry, i64::MAX).is_none());
    }

    #[test]
    fn test_shape_check() {
        assert!(has_date_shape("2030-03-10"));
        assert!(has_date_shape("2030-03-10T15:30:00Z"));
        assert!(!has_date_shape("2030-3-10"));
        assert!(!has_date_shape("10-03-2030"));
        assert!(!has_date_shape("soon"));
        assert!(!has_date_shape(""));
    }

    #[test]
    fn test_schedulable_requires_today_or_later() {
        let today = NaiveDate::from_ymd_opt(2030, 3, 10).unwrap();
        assert!(!is_schedulable_date("2030-03-09", today));
        assert!(is_schedulable_date("2030-03-10", today));
        assert!(is_schedulable_date("2030-03-11", today));
        assert!(!is_schedulable_date("2030-02-30", today));
        assert!(!is_schedulable_date("not-a-date", today));
    }
}
