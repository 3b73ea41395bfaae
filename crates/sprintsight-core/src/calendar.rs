//! Business-day arithmetic.
//!
//! Working days are weekdays (Mon-Fri); there is no holiday calendar and no
//! timezone handling -- every timestamp in the system is UTC-naive.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// Count working days between two dates, inclusive of both endpoints.
///
/// Mirrors the spreadsheet NETWORKDAYS definition: a Monday-to-Friday range
/// counts 5, a same-day range counts 1 on a weekday and 0 on a weekend.
/// A reversed range mirrors sign (`working_days_between_dates(b, a) ==
/// -working_days_between_dates(a, b)`), which keeps "days remaining"
/// negative once a deadline has passed.
pub fn working_days_between_dates(start: NaiveDate, end: NaiveDate) -> i64 {
    if start > end {
        return -working_days_between_dates(end, start);
    }
    let total = (end - start).num_days() + 1;
    let full_weeks = total / 7;
    let mut days = full_weeks * 5;
    let mut cursor = start + Duration::days(full_weeks * 7);
    while cursor <= end {
        if is_working_day(cursor) {
            days += 1;
        }
        cursor += Duration::days(1);
    }
    days
}

/// Timestamp form of [`working_days_between_dates`]; truncates to dates.
pub fn working_days_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    working_days_between_dates(start.date(), end.date())
}

/// True for Monday through Friday.
pub fn is_working_day(date: NaiveDate) -> bool {
    date.weekday().number_from_monday() <= 5
}

/// Convert a working-day count to calendar days.
///
/// Five working days map to a seven-day week; the remainder carries over
/// unchanged. This is an estimation aid, not anchored to any actual weekday,
/// and is not an exact inverse of [`to_working_days`] for arbitrary inputs.
pub fn to_calendar_days(working_days: i64) -> i64 {
    let weeks = working_days / 5;
    let rest = working_days % 5;
    weeks * 7 + rest
}

/// Convert a calendar-day count to working days.
///
/// The remainder of a partial week is capped at 5 working days.
pub fn to_working_days(calendar_days: i64) -> i64 {
    let weeks = calendar_days / 7;
    let rest = (calendar_days % 7).min(5);
    weeks * 5 + rest
}
