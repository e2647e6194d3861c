//! Weekly availability patterns.
//!
//! Doctors publish the weekdays they see patients as a comma separated list of
//! three letter abbreviations (`"Mon, Wed, Fri"`). Matching is exact and
//! case-sensitive after trimming; anything else is dropped.

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::warn;

use crate::models::WeekdaySet;

/// Indexed by `Weekday::num_days_from_sunday`.
pub const WEEKDAY_ABBREVIATIONS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub const WEEKDAYS_FROM_SUNDAY: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

pub fn weekday_abbreviation_of(day: Weekday) -> &'static str {
    WEEKDAY_ABBREVIATIONS[day.num_days_from_sunday() as usize]
}

/// Locale independent abbreviation of the date's weekday.
pub fn weekday_abbreviation(date: NaiveDate) -> &'static str {
    weekday_abbreviation_of(date.weekday())
}

pub fn weekday_from_abbreviation(token: &str) -> Option<Weekday> {
    WEEKDAY_ABBREVIATIONS
        .iter()
        .position(|abbr| *abbr == token)
        .map(|index| WEEKDAYS_FROM_SUNDAY[index])
}

pub fn parse_available_days(pattern: &str) -> WeekdaySet {
    let mut days = WeekdaySet::new();

    for token in pattern.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match weekday_from_abbreviation(token) {
            Some(day) => days.insert(day),
            None => warn!("Ignoring unrecognized weekday token '{}' in availability pattern", token),
        }
    }

    days
}

pub fn is_doctor_available_on(available_days: &WeekdaySet, date: NaiveDate) -> bool {
    available_days.contains(date.weekday())
}
