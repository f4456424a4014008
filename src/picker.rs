//! The picker facade: one entry point per user interaction.
//!
//! [`DatePicker`] owns the configuration, the selection store and the view
//! state, and keeps them consistent. Hosts render from the read-only
//! accessors and the events delivered to subscribers.

use std::collections::BTreeSet;

use chrono::NaiveTime;
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::{
    config::{ConfigError, PickerConfig},
    events::{DayView, ListenerId, PickerEvent},
    parse::{self, has_time_token, DateFormatPreference, ManualInput},
    selection::{Rejection, SelectOutcome, SelectionMode, SelectionStore, SelectionValue},
    view::{CalendarView, Tab},
    CalendarDate, Month, Pattern,
};

/// What a manual text entry did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Cleared,
    Selected(CalendarDate),
    /// Already selected, or the multiple-selection maximum was reached.
    Unchanged,
}

#[derive(Debug)]
pub struct DatePicker {
    config:   PickerConfig,
    timezone: Tz,
    store:    SelectionStore,
    view:     CalendarView,
}

impl DatePicker {
    /// # Errors
    /// Returns `ConfigError` when the configuration does not validate.
    pub fn new(config: PickerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let timezone = config.timezone()?;
        let store = SelectionStore::new(config.selection_options(), config.disable_config());
        let view = CalendarView::starting_at(CalendarDate::today(timezone));

        debug!(timezone = timezone.name(), mode = ?store.mode(), "created date picker");
        Ok(Self {
            config,
            timezone,
            store,
            view,
        })
    }

    /// # Errors
    /// Returns `ConfigError` for malformed or invalid JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::new(PickerConfig::from_json(json)?)
    }

    pub const fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub const fn timezone(&self) -> Tz {
        self.timezone
    }

    pub const fn value(&self) -> &SelectionValue {
        self.store.value()
    }

    pub const fn view(&self) -> &CalendarView {
        &self.view
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&PickerEvent) + 'static) -> ListenerId {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Builds a date at local midnight in the picker's timezone.
    ///
    /// # Errors
    /// Returns `Rejection::Unparseable` for fields that do not form a date.
    pub fn date(&self, year: i32, month: u8, day: u8) -> Result<CalendarDate, Rejection> {
        Ok(CalendarDate::from_ymd(self.timezone, year, month, day)?)
    }

    pub fn is_disabled(&self, date: &CalendarDate) -> bool {
        self.store.rules().is_disabled(date)
    }

    pub fn is_selected(&self, date: &CalendarDate) -> bool {
        self.store.value().contains_day(date)
    }

    /// Projects `date` as a calendar cell of the displayed month.
    pub fn day_view(&self, date: &CalendarDate) -> DayView {
        DayView {
            date:              date.to_date_string(),
            year:              date.year(),
            month:             date.month(),
            number:            date.day(),
            is_disabled:       self.is_disabled(date),
            is_today:          date.is_today(),
            is_selected:       self.is_selected(date),
            is_selected_month: self.view.is_displayed_month(date),
        }
    }

    /// A calendar cell was clicked.
    ///
    /// # Errors
    /// Returns [`Rejection::Disabled`] for a disabled day.
    pub fn select_day(&mut self, date: CalendarDate) -> Result<SelectOutcome, Rejection> {
        let outcome = self.store.select_day(date)?;

        if self.store.mode() == SelectionMode::Single {
            self.view.show(&date);
        }
        if outcome == SelectOutcome::AwaitingTime {
            self.view.set_tab(Tab::TimePicker);
        }

        Ok(outcome)
    }

    /// # Errors
    /// Returns [`Rejection::Disabled`] when adding a disabled day.
    pub fn toggle_day(&mut self, date: CalendarDate) -> Result<SelectOutcome, Rejection> {
        self.store.toggle_day(date)
    }

    /// Sets the time of day on the single selection and returns to the calendar.
    ///
    /// # Errors
    /// Returns [`Rejection::NoSelection`] when nothing is selected.
    pub fn select_time(&mut self, time: NaiveTime) -> Result<CalendarDate, Rejection> {
        let date = self.store.select_time(time)?;
        self.view.set_tab(Tab::Calendar);
        Ok(date)
    }

    /// Removes a chip from a multiple selection.
    ///
    /// # Panics
    /// Panics when `index` is out of bounds or the picker is in single mode.
    pub fn remove_selected_date(&mut self, index: usize) -> CalendarDate {
        self.store.remove_at(index)
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub fn cancel(&mut self) {
        self.store.notify(&PickerEvent::Cancel);
    }

    pub fn previous(&mut self) {
        self.view.navigate(-1);
        self.store.notify(&PickerEvent::Previous);
    }

    pub fn next(&mut self) {
        self.view.navigate(1);
        self.store.notify(&PickerEvent::Next);
    }

    pub fn toggle_tab(&mut self, tab: Tab) {
        self.view.toggle_tab(tab);
    }

    pub fn select_month(&mut self, month: Month) {
        self.view.select_month(month);
        self.notify_month();
    }

    pub fn select_year(&mut self, year: i32) {
        self.view.select_year(year);
        self.store.notify(&PickerEvent::SelectedYear(self.view.year()));
    }

    pub fn go_today(&mut self) {
        self.view.go_today(CalendarDate::today(self.timezone));
        self.notify_month();
    }

    /// Applies text typed into the input.
    ///
    /// Blank text clears. In single mode the previous time of day survives
    /// unless the text itself contains a time.
    ///
    /// # Errors
    /// Returns [`Rejection::Unparseable`] when the text is not a date and
    /// [`Rejection::Disabled`] for a disabled one. The selection is left
    /// untouched in both cases.
    pub fn handle_manual_input(&mut self, text: &str) -> Result<InputOutcome, Rejection> {
        let parsed = parse::parse(
            text,
            self.timezone,
            self.config.date_format_preference,
            self.config.date_format(),
        );

        let (date, format) = match parsed {
            Ok(ManualInput::Clear) => {
                self.clear();
                return Ok(InputOutcome::Cleared);
            },
            Ok(ManualInput::Date { date, format }) => (date, format),
            Err(err) => {
                warn!(input = text, %err, "invalid date entered");
                return Err(err.into());
            },
        };
        debug!(input = text, %format, %date, "parsed manual input");

        match self.store.mode() {
            SelectionMode::Multiple { .. } => match self.store.add_typed(date)? {
                SelectOutcome::Added => Ok(InputOutcome::Selected(date)),
                _ => Ok(InputOutcome::Unchanged),
            },
            SelectionMode::Single => {
                let selected = self.store.select_typed(date, has_time_token(text))?;
                self.view.show(&selected);
                Ok(InputOutcome::Selected(selected))
            },
        }
    }

    /// The storage pattern. See [`PickerConfig::date_format`].
    pub fn date_format(&self) -> &str {
        self.config.date_format()
    }

    /// The value as the host stores it: a formatted date, or a JSON array of
    /// formatted dates in multiple mode.
    pub fn selected_raw_value(&self) -> String {
        let pattern = Pattern::compile(self.date_format());

        match self.store.value() {
            SelectionValue::None => String::new(),
            SelectionValue::Single(date) => pattern.format(date),
            SelectionValue::Multiple(dates) => {
                let formatted: Vec<String> = dates.iter().map(|date| pattern.format(date)).collect();
                serde_json::Value::from(formatted).to_string()
            },
        }
    }

    /// Text for the read-only input.
    ///
    /// In multiple mode the dates render as chips, so the input only needs to
    /// be non-blank while something is selected.
    pub fn display(&self) -> Option<String> {
        match self.store.value() {
            SelectionValue::None => None,
            SelectionValue::Multiple(dates) => (!dates.is_empty()).then(|| " ".to_owned()),
            SelectionValue::Single(date) => {
                let pattern = match self.config.input.display_format.as_deref() {
                    Some(format) if !format.is_empty() => format.to_owned(),
                    _ => self.default_display_format(),
                };
                Some(date.format(&pattern))
            },
        }
    }

    /// Chip labels for a multiple selection. Day numbers only, widened with
    /// the month and year when the selection spans several of them.
    pub fn selected_dates_display(&self) -> Vec<String> {
        let dates = match self.store.value() {
            SelectionValue::Multiple(dates) => dates.as_slice(),
            SelectionValue::None | SelectionValue::Single(_) => return Vec::new(),
        };

        let years: BTreeSet<i32> = dates.iter().map(CalendarDate::year).collect();
        let months: BTreeSet<(i32, u32)> = dates.iter().map(|d| (d.year(), d.month())).collect();

        let pattern = if years.len() > 1 {
            self.numeric_date_format()
        } else if months.len() > 1 {
            match self.config.date_format_preference {
                DateFormatPreference::International => "D/M",
                DateFormatPreference::Us => "M/D",
            }
            .to_owned()
        } else {
            "D".to_owned()
        };

        let pattern = Pattern::compile(&pattern);
        dates.iter().map(|date| pattern.format(date)).collect()
    }

    /// Weekday labels rotated so the configured first day leads.
    pub fn week_days(&self) -> Vec<String> {
        let mut days = self.config.calendar.week_days.clone();
        if !days.is_empty() {
            let start = usize::from(self.config.calendar.start_of_week.get()) % days.len();
            days.rotate_left(start);
        }
        days
    }

    pub fn is_max_multiple_reached(&self) -> bool {
        self.store.is_max_reached()
    }

    /// Whether the confirm/clear footer is shown.
    pub const fn should_show_footer(&self) -> bool {
        self.config.requires_confirmation || self.config.calendar.multiple.enabled
    }

    fn notify_month(&mut self) {
        let event = PickerEvent::SelectedMonth {
            year:  self.view.year(),
            month: self.view.month().get(),
        };
        self.store.notify(&event);
    }

    fn numeric_date_format(&self) -> String {
        match self.config.date_format_preference {
            DateFormatPreference::International => "D/M/YYYY",
            DateFormatPreference::Us => "M/D/YYYY",
        }
        .to_owned()
    }

    fn default_display_format(&self) -> String {
        let date = self.numeric_date_format();
        match (self.config.time_picker.enabled, self.config.time_picker.is_12h) {
            (false, _) => date,
            (true, false) => format!("{date}, HH:mm"),
            (true, true) => format!("{date}, h:mm A"),
        }
    }
}
