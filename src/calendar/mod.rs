//! Calendar date helpers shared by the scheduling engine.
//!
//! Everything here works on `chrono::NaiveDate`: the engine only ever reasons
//! about local calendar days, never instants. The one place an instant enters
//! is [`today_in`], which takes the timezone as an explicit argument.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed date '{0}', expected YYYY-MM-DD")]
    Malformed(String),
    #[error("'{0}' is not a valid Gregorian date")]
    OutOfRange(String),
    #[error("month {month} of year {year} is out of range")]
    InvalidMonth { year: i32, month: u32 },
}

/// Parse a strict `YYYY-MM-DD` string.
pub fn parse_iso(value: &str) -> Result<NaiveDate, ParseError> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(ParseError::Malformed(value.to_string()));
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !digits_ok {
        return Err(ParseError::Malformed(value.to_string()));
    }

    let year: i32 = value[0..4]
        .parse()
        .map_err(|_| ParseError::Malformed(value.to_string()))?;
    let month: u32 = value[5..7]
        .parse()
        .map_err(|_| ParseError::Malformed(value.to_string()))?;
    let day: u32 = value[8..10]
        .parse()
        .map_err(|_| ParseError::Malformed(value.to_string()))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| ParseError::OutOfRange(value.to_string()))
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as i64;
    add_days(date, -offset)
}

/// Signed number of whole days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Whole weeks from `anchor` to `week_start`, truncated. Never negative.
pub fn weeks_between(anchor: NaiveDate, week_start: NaiveDate) -> u32 {
    let days = days_between(anchor, week_start);
    if days <= 0 {
        return 0;
    }
    u32::try_from(days / 7).unwrap_or(u32::MAX)
}

/// `date + days`, saturating at the ends of the representable range.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Every date from `start` through `end`, inclusive. Empty when `start > end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// `year * 12 + month0`, the month counter used for cadence arithmetic.
pub fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), ParseError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(ParseError::InvalidMonth { year, month })?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or(ParseError::InvalidMonth { year, month })?;
    Ok((first, add_days(next, -1)))
}

/// The local calendar day of `now`.
///
/// With `utc_offset_minutes` set, the day is taken at that fixed offset;
/// otherwise the host's local timezone decides. Offsets outside ±24h fall
/// back to UTC.
pub fn today_in(now: DateTime<Utc>, utc_offset_minutes: Option<i32>) -> NaiveDate {
    match utc_offset_minutes {
        Some(minutes) => FixedOffset::east_opt(minutes.saturating_mul(60))
            .map(|tz| now.with_timezone(&tz).date_naive())
            .unwrap_or_else(|| now.date_naive()),
        None => now.with_timezone(&Local).date_naive(),
    }
}

/// Seven consecutive days, Monday through Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekWindow {
    start: NaiveDate,
}

impl WeekWindow {
    pub fn containing(date: NaiveDate) -> Self {
        WeekWindow { start: week_start(date) }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        add_days(self.start, 6)
    }

    pub fn days(&self) -> [NaiveDate; 7] {
        let mut days = [self.start; 7];
        for (i, day) in days.iter_mut().enumerate() {
            *day = add_days(self.start, i as i64);
        }
        days
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }

    /// The date in this window that falls on `weekday`.
    pub fn date_for(&self, weekday: Weekday) -> NaiveDate {
        add_days(self.start, weekday.num_days_from_monday() as i64)
    }

    pub fn next(&self) -> Self {
        WeekWindow { start: add_days(self.start, 7) }
    }
}
