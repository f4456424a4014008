//! Shared fixtures for unit tests.

use crate::CalendarDate;
use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing_subscriber::EnvFilter;

pub fn utc() -> Tz {
    chrono_tz::UTC
}

pub fn berlin() -> Tz {
    chrono_tz::Europe::Berlin
}

/// Midnight UTC on the given day.
pub fn date(year: i32, month: u8, day: u8) -> CalendarDate {
    CalendarDate::from_ymd(utc(), year, month, day).expect("valid test date")
}

pub fn datetime(year: i32, month: u8, day: u8, hour: u32, minute: u32, second: u32) -> CalendarDate {
    let time = CalendarDate::time_of_day(hour, minute, second).expect("valid test time");
    CalendarDate::from_calendar(utc(), year, month, day, time).expect("valid test datetime")
}

pub fn naive(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid naive test date")
}

/// Sends `tracing` output to the test harness. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("datepick=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
