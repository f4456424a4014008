//! Manual text entry.
//!
//! Typed text goes through three stages: a strict `YYYY-MM-DD` shortcut, the
//! configured parse pattern, then a fixed list of recognizers that build
//! calendar fields directly. Ambiguous two-number dates (`05/06/2024`) are
//! never handed to a generic parser; the [`DateFormatPreference`] decides
//! which slot is the month. Numeric shapes also take a two-digit year
//! (`12/11/24`), which pivots at [`TWO_DIGIT_YEAR_PIVOT`]. Every other path
//! requires all four year digits.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    consts::{CURRENT_CENTURY, MERIDIEM_HOUR, PREVIOUS_CENTURY, TIME_SEPARATOR, TWO_DIGIT_YEAR_PIVOT},
    format::spells_full_year,
    naive_date,
    prelude::*,
    CalendarDate, ParseError, Pattern,
};

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid ISO date regex"));

static SLASH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})(?:\s+(\d{1,2}):(\d{2})(?::(\d{2}))?)?$")
        .expect("valid slash date regex")
});

static DASH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})-(\d{1,2})-(\d{4}|\d{2})(?:\s+(\d{1,2}):(\d{2})(?::(\d{2}))?)?$")
        .expect("valid dash date regex")
});

static SLASH_MERIDIEM_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})(?:\s+(\d{1,2}):(\d{2})(?:\s?([AaPp][Mm]))?)?$")
        .expect("valid meridiem date regex")
});

/// Shapes accepted by the last-resort native fallback. Time of day is dropped.
const NATIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const NATIVE_DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
    "%a, %b %d, %Y",
];

/// Which slot of an ambiguous `N/N/YYYY` (or `N/N/YY`) date holds the month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DateFormatPreference {
    /// Day first: `25/12/2024`.
    #[default]
    International,
    /// Month first: `12/25/2024`.
    Us,
}

impl DateFormatPreference {
    /// Maps the two leading numbers to `(month, day)`.
    pub const fn month_day(self, first: u8, second: u8) -> (u8, u8) {
        match self {
            Self::International => (second, first),
            Self::Us => (first, second),
        }
    }
}

impl TryFrom<u8> for DateFormatPreference {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::International),
            1 => Ok(Self::Us),
            other => Err(ParseError::InvalidFormat(format!(
                "unknown date format preference {other} (expected 0 or 1)"
            ))),
        }
    }
}

impl From<DateFormatPreference> for u8 {
    fn from(preference: DateFormatPreference) -> Self {
        match preference {
            DateFormatPreference::International => 0,
            DateFormatPreference::Us => 1,
        }
    }
}

/// The recognizer that produced a parsed date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ManualInputFormat {
    #[display(fmt = "YYYY-MM-DD")]
    Iso,
    #[display(fmt = "configured pattern")]
    Configured,
    #[display(fmt = "slash-separated")]
    Slash,
    #[display(fmt = "dash-separated")]
    Dash,
    #[display(fmt = "slash-separated with meridiem")]
    SlashMeridiem,
    #[display(fmt = "native")]
    Native,
}

/// Result of reading a manual text entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualInput {
    /// Blank input: the caller should clear the selection.
    Clear,
    Date {
        date:   CalendarDate,
        format: ManualInputFormat,
    },
}

/// Parses typed text into a date in `tz`.
///
/// Blank text yields [`ManualInput::Clear`]. Once a recognizer matches the
/// shape of the text, invalid field values (month 25, February 30th, hour
/// 24) fail the whole parse rather than falling through to later
/// recognizers.
///
/// # Errors
/// Returns `ParseError` when nothing recognizes the text or when the
/// recognized fields do not form a real date and time.
pub fn parse(
    text: &str,
    tz: Tz,
    preference: DateFormatPreference,
    parse_format: &str,
) -> Result<ManualInput, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(ManualInput::Clear);
    }

    // Built from numeric fields so a UTC reading can never shift the day.
    if let Some(date) = recognize_iso(trimmed, tz) {
        return date.map(|date| ManualInput::Date {
            date,
            format: ManualInputFormat::Iso,
        });
    }

    match Pattern::compile(parse_format).parse(trimmed, tz) {
        Ok(date) => {
            return Ok(ManualInput::Date {
                date,
                format: ManualInputFormat::Configured,
            });
        },
        Err(err) => trace!(input = trimmed, %err, "configured pattern did not match"),
    }

    let (date, format) = recognize(trimmed, tz, preference)?;
    Ok(ManualInput::Date { date, format })
}

/// Runs the fixed recognizer list in order: ISO, slash, dash, slash with
/// meridiem, then native fallback.
///
/// # Errors
/// Returns `ParseError` when no recognizer accepts the text or the first
/// matching one finds invalid fields.
pub fn recognize(
    text: &str,
    tz: Tz,
    preference: DateFormatPreference,
) -> Result<(CalendarDate, ManualInputFormat), ParseError> {
    let recognizers: [(ManualInputFormat, Option<Result<CalendarDate, ParseError>>); 4] = [
        (ManualInputFormat::Iso, recognize_iso(text, tz)),
        (
            ManualInputFormat::Slash,
            recognize_numeric(&SLASH_DATE, text, tz, preference),
        ),
        (
            ManualInputFormat::Dash,
            recognize_numeric(&DASH_DATE, text, tz, preference),
        ),
        (
            ManualInputFormat::SlashMeridiem,
            recognize_meridiem(text, tz, preference),
        ),
    ];

    for (format, outcome) in recognizers {
        if let Some(result) = outcome {
            trace!(input = text, %format, "recognized manual input shape");
            return result.map(|date| (date, format));
        }
    }

    recognize_native(text, tz).map(|date| (date, ManualInputFormat::Native))
}

/// The documented heuristic for "the user typed a time": any `:` in the text.
///
/// Best effort only. A colon inside some other pasted token also counts.
pub fn has_time_token(text: &str) -> bool {
    text.trim().contains(TIME_SEPARATOR)
}

/// Parses a strict `YYYY-MM-DD` day with field-level errors.
pub(crate) fn iso_day(text: &str) -> Result<NaiveDate, ParseError> {
    let caps = ISO_DATE
        .captures(text)
        .ok_or_else(|| ParseError::InvalidFormat(format!("expected YYYY-MM-DD, got {text:?}")))?;

    naive_date(number(&caps, 1)?, number(&caps, 2)?, number(&caps, 3)?)
}

fn recognize_iso(text: &str, tz: Tz) -> Option<Result<CalendarDate, ParseError>> {
    ISO_DATE.is_match(text).then(|| {
        let day = iso_day(text)?;
        CalendarDate::from_local(tz, day.and_time(NaiveTime::MIN))
    })
}

fn recognize_numeric(
    regex: &Regex,
    text: &str,
    tz: Tz,
    preference: DateFormatPreference,
) -> Option<Result<CalendarDate, ParseError>> {
    let caps = regex.captures(text)?;
    Some(build_numeric(&caps, tz, preference, None))
}

fn recognize_meridiem(
    text: &str,
    tz: Tz,
    preference: DateFormatPreference,
) -> Option<Result<CalendarDate, ParseError>> {
    let caps = SLASH_MERIDIEM_DATE.captures(text)?;
    let meridiem = caps.get(6).map(|m| Meridiem::from_marker(m.as_str()));
    Some(build_numeric(&caps, tz, preference, meridiem))
}

/// Captures 1-3 are the date slots and a two- or four-digit year; 4-6 the
/// optional hour, minute and (for 24-hour shapes) second.
fn build_numeric(
    caps: &Captures<'_>,
    tz: Tz,
    preference: DateFormatPreference,
    meridiem: Option<Meridiem>,
) -> Result<CalendarDate, ParseError> {
    let (month, day) = preference.month_day(number(caps, 1)?, number(caps, 2)?);
    let year = full_year(caps, 3)?;

    let time = if caps.get(4).is_some() {
        let hour: u32 = number(caps, 4)?;
        let minute: u32 = number(caps, 5)?;
        let second: u32 = if meridiem.is_some() { 0 } else { optional_number(caps, 6)? };
        let hour = meridiem.map_or(hour, |m| m.to_24_hour(hour));
        CalendarDate::time_of_day(hour, minute, second)?
    } else {
        NaiveTime::MIN
    };

    CalendarDate::from_calendar(tz, year, month, day, time)
}

fn recognize_native(text: &str, tz: Tz) -> Result<CalendarDate, ParseError> {
    let day = native_day(text, tz).ok_or_else(|| {
        ParseError::InvalidFormat(format!("unrecognized date input: {text:?}"))
    })?;
    CalendarDate::from_local(tz, day.and_time(NaiveTime::MIN))
}

fn native_day(text: &str, tz: Tz) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&tz).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&tz).date_naive());
    }

    // `%Y` takes one to four digits, so a short year must not slip through.
    let spelled = |day: &NaiveDate| spells_full_year(text, day.year());

    NATIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
        .filter(spelled)
        .or_else(|| {
            NATIVE_DATE_FORMATS
                .iter()
                .filter_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .find(spelled)
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    fn from_marker(marker: &str) -> Self {
        if marker.eq_ignore_ascii_case("pm") {
            Self::Pm
        } else {
            Self::Am
        }
    }

    /// 12 AM is midnight, 12 PM is noon, other PM hours move up by twelve.
    const fn to_24_hour(self, hour: u32) -> u32 {
        match (self, hour) {
            (Self::Am, MERIDIEM_HOUR) => 0,
            (Self::Am, h) | (Self::Pm, h @ MERIDIEM_HOUR) => h,
            (Self::Pm, h) => h + MERIDIEM_HOUR,
        }
    }
}

fn number<T: FromStr>(caps: &Captures<'_>, index: usize) -> Result<T, ParseError> {
    let raw = caps.get(index).map_or("", |m| m.as_str());
    raw.parse()
        .map_err(|_| ParseError::InvalidFormat(format!("expected a number, got {raw:?}")))
}

/// Reads a year capture. Two digits pivot at [`TWO_DIGIT_YEAR_PIVOT`]:
/// `24` is 2024 and `75` is 1975.
fn full_year(caps: &Captures<'_>, index: usize) -> Result<i32, ParseError> {
    let year: i32 = number(caps, index)?;
    let digits = caps.get(index).map_or(0, |m| m.len());

    Ok(match digits {
        2 if year < TWO_DIGIT_YEAR_PIVOT => CURRENT_CENTURY + year,
        2 => PREVIOUS_CENTURY + year,
        _ => year,
    })
}

fn optional_number<T: FromStr + Default>(caps: &Captures<'_>, index: usize) -> Result<T, ParseError> {
    if caps.get(index).is_some() {
        number(caps, index)
    } else {
        Ok(T::default())
    }
}
