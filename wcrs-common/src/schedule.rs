//! Weekly recurrence math for show timeslots
//!
//! A show occupies a fixed (day-of-week, local start time) pair in the
//! station's IANA zone. These functions turn that pair plus a reference
//! instant into the next concrete air date. "now" is always an explicit
//! parameter so boundary behavior is testable; nothing here reads a clock.

use crate::error::{Error, Result};
use chrono::{
    DateTime, Datelike, Days, Duration, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;

/// Parse a weekday symbol from the closed seven-value set.
///
/// Only full lowercase English day names are schedule data; anything else
/// is malformed input, not a spelling to be guessed at.
pub fn parse_weekday(symbol: &str) -> Result<Weekday> {
    match symbol {
        "monday" => Ok(Weekday::Mon),
        "tuesday" => Ok(Weekday::Tue),
        "wednesday" => Ok(Weekday::Wed),
        "thursday" => Ok(Weekday::Thu),
        "friday" => Ok(Weekday::Fri),
        "saturday" => Ok(Weekday::Sat),
        "sunday" => Ok(Weekday::Sun),
        other => Err(Error::Validation(format!(
            "'{}' is not a day of the week",
            other
        ))),
    }
}

/// Canonical stored form of a weekday
pub fn weekday_symbol(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Parse a local wall-clock start time in `HH:MM` form
pub fn parse_start_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| Error::Validation(format!("'{}' is not a valid HH:MM start time", value)))
}

/// Resolve a local wall-clock instant to UTC in the station zone.
///
/// Fall-back ambiguity resolves to the earlier offset; a spring-forward
/// gap has no answer and returns None.
pub fn resolve_local(tz: Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Compute the next occurrence of a weekly timeslot at or after `now`.
///
/// The result falls on `day` at `start_time` in zone `tz`, and is strictly
/// more than `lead_time` after `now`. Same-day scheduling is permitted
/// when enough lead time remains; a same-day candidate already inside the
/// lead-time window rolls forward seven days. A candidate that lands in a
/// DST gap (the local time does not exist that day) also rolls forward.
pub fn next_occurrence(
    day: Weekday,
    start_time: NaiveTime,
    tz: Tz,
    now: DateTime<Utc>,
    lead_time: Duration,
) -> Result<DateTime<Utc>> {
    let local_now = now.with_timezone(&tz);
    let offset = (day.num_days_from_monday() as i64
        - local_now.weekday().num_days_from_monday() as i64)
        .rem_euclid(7) as u64;

    let mut date = local_now
        .date_naive()
        .checked_add_days(Days::new(offset))
        .ok_or_else(|| Error::Internal("date overflow computing occurrence".to_string()))?;

    // At most three passes: the first candidate, a lead-time roll, and a
    // DST-gap roll can each consume one.
    for _ in 0..3 {
        if let Some(candidate) = resolve_local(tz, date.and_time(start_time)) {
            if candidate - now > lead_time {
                return Ok(candidate);
            }
        }
        date = date
            .checked_add_days(Days::new(7))
            .ok_or_else(|| Error::Internal("date overflow computing occurrence".to_string()))?;
    }

    Err(Error::Internal(format!(
        "no valid occurrence for {} {} in {}",
        weekday_symbol(day),
        start_time,
        tz
    )))
}
