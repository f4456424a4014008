//! Which month the calendar shows and which tab is open.
//!
//! The view-state follows accepted selections but never feeds back into
//! disabling.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    consts::{MAX_YEAR, MIN_YEAR, MONTHS_PER_YEAR},
    prelude::*,
    CalendarDate, Month,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    #[default]
    #[display(fmt = "calendar")]
    Calendar,
    #[display(fmt = "month")]
    Month,
    #[display(fmt = "year")]
    Year,
    #[display(fmt = "time-picker")]
    TimePicker,
}

/// The displayed year always stays within `MIN_YEAR..=MAX_YEAR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarView {
    year:  i32,
    /// Real (1-indexed) month.
    month: Month,
    tab:   Tab,
}

impl CalendarView {
    pub fn new(year: i32, month: Month) -> Self {
        Self {
            year: clamp_year(year),
            month,
            tab: Tab::Calendar,
        }
    }

    /// Starts on the month containing `today`.
    pub fn starting_at(today: NaiveDate) -> Self {
        let mut view = Self::new(today.year(), Month::JANUARY);
        view.go_today(today);
        view
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    pub const fn month(&self) -> Month {
        self.month
    }

    pub const fn tab(&self) -> Tab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    /// Opens `tab`, or goes back to the calendar when it is already open.
    pub fn toggle_tab(&mut self, tab: Tab) {
        self.tab = if self.tab == tab { Tab::Calendar } else { tab };
    }

    /// Moves by `delta` months, rolling the year over in either direction.
    /// Stops at January of the first year and December of the last.
    pub fn navigate(&mut self, delta: i32) {
        let months = i64::from(MONTHS_PER_YEAR);
        let first = i64::from(MIN_YEAR) * months;
        let last = i64::from(MAX_YEAR) * months + months - 1;
        let index = (i64::from(self.year) * months + i64::from(self.month.get() - 1) + i64::from(delta))
            .clamp(first, last);

        // clamped above, so the quotient is a valid year and the remainder a month index
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            self.year = index.div_euclid(months) as i32;
            self.month = Month::from_index(index.rem_euclid(months) as u8);
        }
    }

    pub fn select_month(&mut self, month: Month) {
        self.month = month;
        self.tab = Tab::Calendar;
    }

    pub fn select_year(&mut self, year: i32) {
        self.year = clamp_year(year);
        self.tab = Tab::Calendar;
    }

    pub fn go_today(&mut self, today: NaiveDate) {
        self.move_to(today);
        self.tab = Tab::Calendar;
    }

    /// Follows a date that was just selected. The open tab is left as is.
    pub fn show(&mut self, date: &CalendarDate) {
        self.move_to(date.date_naive());
    }

    #[allow(clippy::cast_possible_truncation)]
    fn move_to(&mut self, day: NaiveDate) {
        self.year = clamp_year(day.year());
        self.month = Month::from_index(day.month0() as u8);
    }

    /// Whether `date` falls in the displayed month.
    pub fn is_displayed_month(&self, date: &CalendarDate) -> bool {
        date.year() == self.year && date.month() == u32::from(self.month.get())
    }
}

fn clamp_year(year: i32) -> i32 {
    year.clamp(i32::from(MIN_YEAR), i32::from(MAX_YEAR))
}
