//! Heterogeneous date text normalization.
//!
//! Sites publish dates in wildly different shapes: ISO timestamps, RFC 2822
//! strings, written month names, bare `DD/MM/YYYY` numerics, and relative
//! phrases like "2 days ago". This module converts all of them into a single
//! sortable [`DateTime<Utc>`].
//!
//! # Precedence
//!
//! `DD/MM/YYYY` is matched before any generic parsing. Generic parsers
//! default to US month/day ordering, which silently swaps UK-style dates
//! like `04/05/2025`; the explicit rule keeps day/month dates from being
//! misfiled by up to eleven months.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static DAY_MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap());

static RELATIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week|month)s?\s+ago$").unwrap());

/// Datetime formats tried before date-only formats.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d/%m/%Y %H:%M",
    "%d %B %Y %H:%M",
    "%B %d, %Y %H:%M",
];

/// Date-only formats, midnight UTC assumed.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%d.%m.%Y",
    "%Y.%m.%d",
    "%d-%m-%Y",
    "%m/%d/%Y",
];

/// Convert arbitrary date text into a canonical UTC timestamp.
///
/// Returns `None` for empty or unparseable input; callers substitute the
/// current instant so sort order is never undefined. The strict
/// `DD/MM/YYYY` rule is applied first (see module docs), then a general
/// chain of RFC 3339, RFC 2822, common written/numeric formats, partial
/// month-year dates, and relative terms.
pub fn normalize(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(caps) = DAY_MONTH_YEAR.captures(trimmed) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date.and_time(NaiveTime::MIN).and_utc());
        }
        debug!(text = trimmed, "Slash date is not a valid day/month/year");
    }

    parse_general(trimmed)
}

/// The generic fallback chain, tried in order of decreasing strictness.
fn parse_general(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date.and_time(NaiveTime::MIN).and_utc());
        }
    }

    // Partial month-year dates resolve to the first of the month.
    for format in ["%d %B %Y", "%d %b %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("1 {text}"), format) {
            return Some(date.and_time(NaiveTime::MIN).and_utc());
        }
    }

    parse_relative(text)
}

/// Relative phrases like "today", "yesterday", or "3 days ago".
fn parse_relative(text: &str) -> Option<DateTime<Utc>> {
    let lowered = text.to_lowercase();
    let now = Utc::now();

    match lowered.as_str() {
        "today" | "just now" | "now" => return Some(now),
        "yesterday" => return Some(now - Duration::days(1)),
        _ => {}
    }

    let caps = RELATIVE.captures(&lowered)?;
    let amount: i64 = caps[1].parse().ok()?;
    let delta = match &caps[2] {
        "minute" => Duration::minutes(amount),
        "hour" => Duration::hours(amount),
        "day" => Duration::days(amount),
        "week" => Duration::weeks(amount),
        "month" => Duration::days(amount * 30),
        _ => return None,
    };
    Some(now - delta)
}
