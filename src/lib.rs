mod config;
mod consts;
mod events;
mod format;
mod parse;
mod picker;
mod prelude;
mod range;
mod rules;
mod selection;
#[cfg(test)]
mod test_utils;
mod types;
mod view;

pub use config::{
    CalendarConfig, ConfigError, DisabledConfig, InputConfig, MultipleConfig, PickerConfig,
    TimePickerConfig, TimezoneConfig,
};
pub use consts::*;
pub use events::{DayView, EventBus, ListenerId, PickerEvent};
pub use format::Pattern;
pub use parse::{
    has_time_token, parse, recognize, DateFormatPreference, ManualInput, ManualInputFormat,
};
pub use picker::{DatePicker, InputOutcome};
pub use range::{DateRange, RangeError};
pub use rules::{DateRule, DisableConfig, DisableReason, PastDatesPolicy, YearRule};
pub use selection::{
    Rejection, SelectOutcome, SelectionMode, SelectionOptions, SelectionStore, SelectionValue,
};
pub use types::{Day, Month, WeekdayNumber, Year};
pub use view::{CalendarView, Tab};

use crate::prelude::*;
use chrono::{DateTime, Datelike, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use std::cmp::Ordering;

/// Errors produced while turning calendar fields or text into a [`CalendarDate`].
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ParseError {
    #[display(fmt = "Invalid date format: {_0}")]
    InvalidFormat(String),
    #[display(fmt = "Invalid year: {} (must be 1-{})", "_0", MAX_YEAR)]
    InvalidYear(i32),
    #[display(fmt = "Invalid month: {} (must be 1-{})", "_0", MAX_MONTH)]
    InvalidMonth(u8),
    #[display(fmt = "Invalid day {day} for month {year}-{month:02}")]
    InvalidDay { month: u8, day: u8, year: u16 },
    #[display(fmt = "Invalid weekday: {} (must be 0-{})", "_0", MAX_WEEKDAY)]
    InvalidWeekday(u8),
    #[display(fmt = "Invalid time {hour:02}:{minute:02}:{second:02}")]
    InvalidTime { hour: u32, minute: u32, second: u32 },
    #[display(fmt = "Local time {_0} does not exist in the selected timezone")]
    NonexistentLocalTime(NaiveDateTime),
}

impl std::error::Error for ParseError {}

/// Precision used when comparing two [`CalendarDate`] values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// Compare the exact instants.
    #[default]
    Instant,
    /// Compare local calendar days, ignoring the time of day.
    Day,
}

/// A date and time anchored in a named timezone.
///
/// Every value is a legal calendar date: constructors validate their fields
/// and return [`ParseError`] instead of rolling over (there is no month 13 and
/// no February 30th).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(fmt = "{}", "_0.to_rfc3339()")]
pub struct CalendarDate(DateTime<Tz>);

impl CalendarDate {
    /// Builds a date at local midnight from validated calendar fields.
    ///
    /// # Errors
    /// Returns the matching `ParseError` variant for an out-of-range year,
    /// month or day.
    pub fn from_ymd(tz: Tz, year: i32, month: u8, day: u8) -> Result<Self, ParseError> {
        Self::from_calendar(tz, year, month, day, NaiveTime::MIN)
    }

    /// Builds a date from validated calendar fields and a time of day.
    ///
    /// # Errors
    /// Returns `ParseError` for invalid fields or when the local time falls
    /// in a daylight-saving gap.
    pub fn from_calendar(
        tz: Tz,
        year: i32,
        month: u8,
        day: u8,
        time: NaiveTime,
    ) -> Result<Self, ParseError> {
        let date = naive_date(year, month, day)?;
        Self::from_local(tz, date.and_time(time))
    }

    /// Resolves a wall-clock date-time in `tz`.
    ///
    /// Ambiguous times (clocks turned back) resolve to the earlier instant.
    ///
    /// # Errors
    /// Returns `ParseError::NonexistentLocalTime` for times skipped by a
    /// daylight-saving transition.
    pub fn from_local(tz: Tz, naive: NaiveDateTime) -> Result<Self, ParseError> {
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(Self(dt)),
            LocalResult::None => Err(ParseError::NonexistentLocalTime(naive)),
        }
    }

    /// The current instant in `tz`.
    pub fn now(tz: Tz) -> Self {
        Self(Utc::now().with_timezone(&tz))
    }

    /// Today's calendar day in `tz`.
    pub fn today(tz: Tz) -> NaiveDate {
        Self::now(tz).date_naive()
    }

    /// Validates an hour/minute/second triple.
    ///
    /// # Errors
    /// Returns `ParseError::InvalidTime` when any component is out of range.
    pub fn time_of_day(hour: u32, minute: u32, second: u32) -> Result<NaiveTime, ParseError> {
        if hour >= HOURS_PER_DAY || minute >= MINUTES_PER_HOUR || second >= MINUTES_PER_HOUR {
            return Err(ParseError::InvalidTime {
                hour,
                minute,
                second,
            });
        }
        NaiveTime::from_hms_opt(hour, minute, second).ok_or(ParseError::InvalidTime {
            hour,
            minute,
            second,
        })
    }

    /// Returns the same calendar day with a different time of day.
    ///
    /// # Errors
    /// Returns `ParseError::NonexistentLocalTime` when the new time does not
    /// exist on that day.
    pub fn with_time(&self, time: NaiveTime) -> Result<Self, ParseError> {
        Self::from_local(self.timezone(), self.date_naive().and_time(time))
    }

    pub fn instant(&self) -> DateTime<Tz> {
        self.0
    }

    pub fn timezone(&self) -> Tz {
        self.0.timezone()
    }

    /// The local calendar day.
    pub fn date_naive(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// The local time of day.
    pub fn time(&self) -> NaiveTime {
        self.0.time()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// The real (1-indexed) month.
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day of the month.
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn second(&self) -> u32 {
        self.0.second()
    }

    /// Day of the week, Sunday = 0.
    #[allow(clippy::cast_possible_truncation)]
    pub fn weekday(&self) -> u8 {
        self.0.weekday().num_days_from_sunday() as u8
    }

    pub fn is_today(&self) -> bool {
        self.date_naive() == Self::today(self.timezone())
    }

    /// Canonical `YYYY-MM-DD` form of the local day.
    pub fn to_date_string(&self) -> String {
        self.date_naive().format("%Y-%m-%d").to_string()
    }

    /// Formats with a moment-style pattern such as `YYYY-MM-DD HH:mm`.
    pub fn format(&self, pattern: &str) -> String {
        Pattern::compile(pattern).format(self)
    }

    /// Compares at the given granularity. Day comparisons read `other` in
    /// this value's timezone.
    pub fn compare(&self, other: &Self, granularity: Granularity) -> Ordering {
        match granularity {
            Granularity::Instant => self.0.cmp(&other.0),
            Granularity::Day => self
                .date_naive()
                .cmp(&other.0.with_timezone(&self.timezone()).date_naive()),
        }
    }

    pub fn is_same(&self, other: &Self, granularity: Granularity) -> bool {
        self.compare(other, granularity) == Ordering::Equal
    }

    pub fn is_before(&self, other: &Self, granularity: Granularity) -> bool {
        self.compare(other, granularity) == Ordering::Less
    }

    pub fn is_after(&self, other: &Self, granularity: Granularity) -> bool {
        self.compare(other, granularity) == Ordering::Greater
    }

    pub fn is_same_or_before(&self, other: &Self, granularity: Granularity) -> bool {
        self.compare(other, granularity) != Ordering::Greater
    }

    /// Inclusive on both ends.
    pub fn is_between(&self, start: &Self, end: &Self, granularity: Granularity) -> bool {
        self.compare(start, granularity) != Ordering::Less
            && self.compare(end, granularity) != Ordering::Greater
    }

    /// Day equality against a timezone-free calendar day.
    pub fn is_same_day(&self, date: NaiveDate) -> bool {
        self.date_naive() == date
    }
}

/// Validates calendar fields into a `NaiveDate`, reporting which field is wrong.
pub(crate) fn naive_date(year: i32, month: u8, day: u8) -> Result<NaiveDate, ParseError> {
    let year_typed = Year::new(year)?;
    let month_typed = Month::new(month)?;
    let day_typed = Day::new(day, year_typed, month_typed)?;

    NaiveDate::from_ymd_opt(
        year,
        u32::from(month_typed.get()),
        u32::from(day_typed.get()),
    )
    .ok_or(ParseError::InvalidDay {
        month,
        day,
        year: year_typed.get(),
    })
}
