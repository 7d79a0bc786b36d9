use std::sync::OnceLock;

use chrono::{Duration, Local, NaiveDate};
use regex::Regex;

const DAY_FORMAT: &str = "%Y-%m-%d";

fn day_pattern() -> &'static Regex {
    static DAY_RE: OnceLock<Regex> = OnceLock::new();
    DAY_RE.get_or_init(|| Regex::new(r"(\d{4})\D(\d{2})\D(\d{2})").expect("day pattern compiles"))
}

/// Canonical `YYYY-MM-DD` form of a calendar date, zero-padded.
pub fn day_string(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// Inverse of `day_string`. Returns `None` for anything that is not a
/// calendar date.
pub fn parse_day(ymd: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(ymd.trim(), DAY_FORMAT).ok()
}

/// Pulls the first `YYYY?MM?DD` group out of loosely-formatted server date
/// text (e.g. `"2025-03-04 00:00:00.000000"`) and returns it in canonical
/// form. Never panics; `None` when no date-shaped run exists.
pub fn extract_day(text: &str) -> Option<String> {
    let caps = day_pattern().captures(text)?;
    Some(format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]))
}

/// Canonical day-string `days` after `ymd`, with month/year rollover.
/// `None` only when `ymd` itself is not canonical.
pub fn shift_day(ymd: &str, days: i64) -> Option<String> {
    let date = parse_day(ymd)?;
    date.checked_add_signed(Duration::days(days)).map(day_string)
}

/// Today's LOCAL calendar date. The machine-local date is the reference for
/// every badge and grid computation; nothing here converts through UTC.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Whole days from `today` to `due` (negative when past).
pub fn diff_days(due: NaiveDate, today: NaiveDate) -> i64 {
    due.signed_duration_since(today).num_days()
}
