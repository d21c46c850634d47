//! Calendar helpers.
//!
//! All windows are half-open `[start, end)` and expressed in UTC.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

/// Seconds in one day, used to express durations as fractional days.
const SECONDS_PER_DAY: f64 = 86_400.0;

/// A single calendar month as a half-open UTC window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub label: String,
}

/// Returns midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
}

/// Returns the `[start, end)` window covering `date`.
pub fn day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(date);
    (start, start + Duration::days(1))
}

/// Returns the first day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Moves a first-of-month date by `delta` calendar months.
pub fn shift_months(first: NaiveDate, delta: i32) -> NaiveDate {
    let index = first.year() * 12 + first.month0() as i32 + delta;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(first)
}

/// Short human-readable label such as `Mar 2024`.
pub fn month_label(first: NaiveDate) -> String {
    first.format("%b %Y").to_string()
}

/// Builds the `count` calendar months ending with the month containing `now`,
/// oldest first.
pub fn trailing_months(now: DateTime<Utc>, count: u32) -> Vec<MonthWindow> {
    let current = first_of_month(now.date_naive());

    (0..count as i32)
        .rev()
        .map(|back| {
            let first = shift_months(current, -back);
            let next = shift_months(first, 1);
            MonthWindow {
                start: start_of_day(first),
                end: start_of_day(next),
                label: month_label(first),
            }
        })
        .collect()
}

/// Fractional days elapsed from `start` to `end`. Negative when `end` precedes `start`.
pub fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_seconds() as f64 / SECONDS_PER_DAY
}
