//! Moment-style format patterns (`YYYY-MM-DD`, `DD/MM/YYYY HH:mm`, `h:mm A`)
//! compiled to chrono `strftime` strings.
//!
//! Text inside `[...]` is copied literally; characters that are not tokens
//! pass through unchanged.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;

use crate::{CalendarDate, ParseError};

/// Tokens ordered longest first so `YYYY` wins over `YY` and `MMMM` over `MM`.
const TOKENS: &[(&str, &str, TokenKind)] = &[
    ("YYYY", "%Y", TokenKind::Date),
    ("YY", "%y", TokenKind::Date),
    ("MMMM", "%B", TokenKind::Date),
    ("MMM", "%b", TokenKind::Date),
    ("MM", "%m", TokenKind::Date),
    ("M", "%-m", TokenKind::Date),
    ("DD", "%d", TokenKind::Date),
    ("D", "%-d", TokenKind::Date),
    ("dddd", "%A", TokenKind::Date),
    ("ddd", "%a", TokenKind::Date),
    ("HH", "%H", TokenKind::Time),
    ("H", "%-H", TokenKind::Time),
    ("hh", "%I", TokenKind::Time),
    ("h", "%-I", TokenKind::Time),
    ("mm", "%M", TokenKind::Time),
    ("m", "%-M", TokenKind::Time),
    ("ss", "%S", TokenKind::Time),
    ("s", "%-S", TokenKind::Time),
    ("A", "%p", TokenKind::Time),
    ("a", "%P", TokenKind::Time),
    ("ZZ", "%z", TokenKind::Offset),
    ("Z", "%:z", TokenKind::Offset),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Date,
    Time,
    Offset,
}

const FULL_YEAR_TOKEN: &str = "YYYY";

/// A compiled display/parse pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source:        String,
    strftime:      String,
    has_time:      bool,
    has_offset:    bool,
    has_full_year: bool,
}

impl Pattern {
    pub fn compile(source: &str) -> Self {
        let mut strftime = String::with_capacity(source.len() * 2);
        let mut has_time = false;
        let mut has_offset = false;
        let mut has_full_year = false;
        let mut rest = source;

        while let Some(ch) = rest.chars().next() {
            if ch == '[' {
                let body = &rest[1..];
                let (literal, remaining) = body.split_once(']').unwrap_or((body, ""));
                push_literal(&mut strftime, literal);
                rest = remaining;
                continue;
            }

            if let Some((token, spec, kind)) = TOKENS.iter().find(|(token, ..)| rest.starts_with(token)) {
                strftime.push_str(spec);
                match kind {
                    TokenKind::Date => has_full_year |= *token == FULL_YEAR_TOKEN,
                    TokenKind::Time => has_time = true,
                    TokenKind::Offset => has_offset = true,
                }
                rest = &rest[token.len()..];
                continue;
            }

            push_literal(&mut strftime, &rest[..ch.len_utf8()]);
            rest = &rest[ch.len_utf8()..];
        }

        Self {
            source: source.to_owned(),
            strftime,
            has_time,
            has_offset,
            has_full_year,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// The chrono `strftime` equivalent.
    pub fn strftime(&self) -> &str {
        &self.strftime
    }

    pub const fn has_time(&self) -> bool {
        self.has_time
    }

    pub fn format(&self, date: &CalendarDate) -> String {
        date.instant().format(&self.strftime).to_string()
    }

    /// Parses `text` as a wall-clock value in `tz`. Date-only patterns land at
    /// local midnight; patterns with an offset token are converted into `tz`.
    ///
    /// # Errors
    /// Returns `ParseError::InvalidFormat` when `text` does not match, or
    /// `ParseError::NonexistentLocalTime` for a time skipped by DST.
    pub fn parse(&self, text: &str, tz: Tz) -> Result<CalendarDate, ParseError> {
        let naive = self.parse_local(text, tz)?;

        if self.has_full_year && !spells_full_year(text, naive.year()) {
            return Err(ParseError::InvalidFormat(format!(
                "{text:?} does not spell out the four-digit year {} expects",
                self.source
            )));
        }

        CalendarDate::from_local(tz, naive)
    }

    /// Wall-clock reading of `text` in `tz`.
    fn parse_local(&self, text: &str, tz: Tz) -> Result<NaiveDateTime, ParseError> {
        let mismatch = |err: chrono::ParseError| {
            ParseError::InvalidFormat(format!("{text:?} does not match {}: {err}", self.source))
        };

        if self.has_offset {
            let parsed = DateTime::parse_from_str(text, &self.strftime).map_err(mismatch)?;
            return Ok(parsed.with_timezone(&tz).naive_local());
        }

        Ok(if self.has_time {
            NaiveDateTime::parse_from_str(text, &self.strftime).map_err(mismatch)?
        } else {
            NaiveDate::parse_from_str(text, &self.strftime)
                .map_err(mismatch)?
                .and_time(NaiveTime::MIN)
        })
    }
}

/// Whether `text` writes `year` with all four digits. chrono's `%Y` also
/// accepts one to three, reading `1-6-24` as year 1.
pub(crate) fn spells_full_year(text: &str, year: i32) -> bool {
    text.contains(&format!("{year:04}"))
}

fn push_literal(out: &mut String, literal: &str) {
    for ch in literal.chars() {
        if ch == '%' {
            out.push_str("%%");
        } else {
            out.push(ch);
        }
    }
}
