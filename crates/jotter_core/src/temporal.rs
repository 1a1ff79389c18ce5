//! Temporal expression parsing.
//!
//! # Responsibility
//! - Turn free-form date/duration strings into a concrete `When`.
//! - Keep every time-sensitive computation anchored to an explicit
//!   reference instant supplied by the caller.
//!
//! # Invariants
//! - Unrecognized input always fails with the offending text preserved;
//!   nothing is silently defaulted.
//! - `When::Never` sorts after every absolute instant and is never past.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// A resolved relevance instant: an absolute timestamp or "never".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
    At(NaiveDateTime),
    Never,
}

impl When {
    /// Returns whether this instant lies strictly before `now`.
    ///
    /// `Never` is never past, regardless of `now`.
    pub fn is_past(&self, now: NaiveDateTime) -> bool {
        match self {
            Self::At(at) => *at < now,
            Self::Never => false,
        }
    }
}

impl Ord for When {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::At(a), Self::At(b)) => a.cmp(b),
            (Self::At(_), Self::Never) => Ordering::Less,
            (Self::Never, Self::At(_)) => Ordering::Greater,
            (Self::Never, Self::Never) => Ordering::Equal,
        }
    }
}

impl PartialOrd for When {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for When {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::At(at) => write!(f, "{}", at.format("%Y-%m-%dT%H:%M:%S")),
            Self::Never => write!(f, "never"),
        }
    }
}

pub type ExprResult<T> = Result<T, ExprError>;

/// Failure to recognize a temporal expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    Unparseable(String),
}

impl Display for ExprError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unparseable(input) => {
                write!(f, "unrecognized temporal expression `{input}`")
            }
        }
    }
}

impl Error for ExprError {}

static COUNTED_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\s+(hours?|days?|weeks?|months?|years?|business\s+days?)$")
        .expect("counted-unit pattern is valid")
});

static CLOCK_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("clock-time pattern is valid"));

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("iso-date pattern is valid"));

/// Parses a free-form temporal expression against a reference instant.
///
/// Recognized forms, most specific first:
/// - `never`
/// - ISO calendar date `YYYY-MM-DD` (resolved to end of that day)
/// - wall time `HH:MM` (resolved on the reference date)
/// - `N hours`, `N days`, `N weeks`, `N months`, `N years`
/// - `N business days` (weekday-only steps, Sat/Sun skipped)
/// - a weekday name, optionally prefixed with `next` (nearest strictly
///   future occurrence, never same-day)
///
/// Matching is case-insensitive and ignores surrounding whitespace. Counts
/// must be non-negative integers.
pub fn parse(input: &str, now: NaiveDateTime) -> ExprResult<When> {
    let normalized = input.trim().to_ascii_lowercase();
    let fail = || ExprError::Unparseable(input.to_string());

    if normalized.is_empty() {
        return Err(fail());
    }
    if normalized == "never" {
        return Ok(When::Never);
    }

    if ISO_DATE.is_match(&normalized) {
        let date = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").map_err(|_| fail())?;
        return Ok(When::At(end_of_day(date)));
    }

    if let Some(caps) = CLOCK_TIME.captures(&normalized) {
        let hour: u32 = caps[1].parse().map_err(|_| fail())?;
        let minute: u32 = caps[2].parse().map_err(|_| fail())?;
        let at = now.date().and_hms_opt(hour, minute, 0).ok_or_else(fail)?;
        return Ok(When::At(at));
    }

    if let Some(caps) = COUNTED_UNIT.captures(&normalized) {
        let count: i64 = caps[1].parse().map_err(|_| fail())?;
        let unit = caps[2].trim_end_matches('s');
        let at = match unit {
            "hour" => now.checked_add_signed(Duration::try_hours(count).ok_or_else(fail)?),
            "day" => now.checked_add_signed(Duration::try_days(count).ok_or_else(fail)?),
            "week" => now.checked_add_signed(Duration::try_weeks(count).ok_or_else(fail)?),
            "month" => {
                let months = u32::try_from(count).map_err(|_| fail())?;
                now.checked_add_months(Months::new(months))
            }
            "year" => {
                let months = u32::try_from(count)
                    .ok()
                    .and_then(|years| years.checked_mul(12))
                    .ok_or_else(fail)?;
                now.checked_add_months(Months::new(months))
            }
            _ => Some(advance_business_days(now, count)?),
        };
        return Ok(When::At(at.ok_or_else(fail)?));
    }

    let weekday_name = normalized.strip_prefix("next ").unwrap_or(&normalized);
    if let Some(weekday) = parse_weekday(weekday_name.trim()) {
        return Ok(When::At(end_of_day(upcoming_weekday(now, weekday))));
    }

    Err(fail())
}

/// Parses a plain duration expression (`N hours`, `N days`, `N weeks`).
///
/// Used by schemas wanting a span rather than an instant; calendar-shaped
/// units (months, years, business days) are deliberately not durations.
pub fn parse_duration(input: &str) -> ExprResult<Duration> {
    let normalized = input.trim().to_ascii_lowercase();
    let fail = || ExprError::Unparseable(input.to_string());

    let caps = COUNTED_UNIT.captures(&normalized).ok_or_else(fail)?;
    let count: i64 = caps[1].parse().map_err(|_| fail())?;
    match caps[2].trim_end_matches('s') {
        "hour" => Duration::try_hours(count).ok_or_else(fail),
        "day" => Duration::try_days(count).ok_or_else(fail),
        "week" => Duration::try_weeks(count).ok_or_else(fail),
        _ => Err(fail()),
    }
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 59, 59).expect("23:59:59 is a valid time")
}

/// Advances `count` weekday-only steps, skipping Saturday and Sunday.
fn advance_business_days(now: NaiveDateTime, count: i64) -> ExprResult<NaiveDateTime> {
    let overflow = || ExprError::Unparseable(format!("{count} business days"));
    let mut at = now;
    for _ in 0..count {
        at = at
            .checked_add_signed(Duration::try_days(1).ok_or_else(overflow)?)
            .ok_or_else(overflow)?;
        while matches!(at.weekday(), Weekday::Sat | Weekday::Sun) {
            at = at
                .checked_add_signed(Duration::try_days(1).ok_or_else(overflow)?)
                .ok_or_else(overflow)?;
        }
    }
    Ok(at)
}

/// Returns the nearest strictly future date falling on `target`.
fn upcoming_weekday(now: NaiveDateTime, target: Weekday) -> NaiveDate {
    let today = now.weekday().num_days_from_monday();
    let wanted = target.num_days_from_monday();
    let mut ahead = (wanted + 7 - today) % 7;
    if ahead == 0 {
        // Same-day never counts as "next"; roll a full week forward.
        ahead = 7;
    }
    now.date() + Duration::days(i64::from(ahead))
}

fn parse_weekday(name: &str) -> Option<Weekday> {
    match name {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}
