//! The selection state machine.
//!
//! [`SelectionStore`] is the only owner of the selected value. Every accepted
//! change is checked against the disable rules first and then reported to
//! subscribers; rejected changes leave the value untouched.

use chrono::NaiveTime;
use tracing::{debug, warn};

use crate::{
    events::{DayView, EventBus, ListenerId, PickerEvent},
    rules::{DisableConfig, DisableReason},
    CalendarDate, Granularity, ParseError,
};

/// Single or multiple selection. `max == 0` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Single,
    Multiple { max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionOptions {
    pub mode:                  SelectionMode,
    pub time_enabled:          bool,
    pub requires_confirmation: bool,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            mode:                  SelectionMode::Single,
            time_enabled:          false,
            requires_confirmation: false,
        }
    }
}

/// The selected value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SelectionValue {
    #[default]
    None,
    Single(CalendarDate),
    /// Insertion-ordered, no two entries on the same day.
    Multiple(Vec<CalendarDate>),
}

impl SelectionValue {
    pub const fn single(&self) -> Option<&CalendarDate> {
        match self {
            Self::Single(date) => Some(date),
            Self::None | Self::Multiple(_) => None,
        }
    }

    /// All selected dates; a single selection is a one-element slice.
    pub fn dates(&self) -> &[CalendarDate] {
        match self {
            Self::None => &[],
            Self::Single(date) => std::slice::from_ref(date),
            Self::Multiple(dates) => dates,
        }
    }

    pub fn contains_day(&self, candidate: &CalendarDate) -> bool {
        self.dates()
            .iter()
            .any(|date| date.is_same(candidate, Granularity::Day))
    }

    pub fn is_empty(&self) -> bool {
        self.dates().is_empty()
    }

    fn position_of_day(&self, candidate: &CalendarDate) -> Option<usize> {
        self.dates()
            .iter()
            .position(|date| date.is_same(candidate, Granularity::Day))
    }
}

/// What an accepted operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Single selection done; the host may close the picker.
    Completed,
    /// Single selection done; the time of day is chosen next.
    AwaitingTime,
    /// Single selection done; the host waits for explicit confirmation.
    AwaitingConfirmation,
    Added,
    Removed,
    /// Nothing changed (already present, or the maximum was reached).
    Unchanged,
}

/// Why a change was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Unparseable date input: {0}")]
    Unparseable(#[from] ParseError),

    #[error("Date {} is disabled: {reason}", .date.to_date_string())]
    Disabled {
        date:   CalendarDate,
        reason: DisableReason,
    },

    #[error("No date is selected")]
    NoSelection,
}

#[derive(Debug)]
pub struct SelectionStore {
    options: SelectionOptions,
    rules:   DisableConfig,
    value:   SelectionValue,
    events:  EventBus,
}

impl SelectionStore {
    pub fn new(options: SelectionOptions, rules: DisableConfig) -> Self {
        let value = match options.mode {
            SelectionMode::Single => SelectionValue::None,
            SelectionMode::Multiple { .. } => SelectionValue::Multiple(Vec::new()),
        };

        Self {
            options,
            rules,
            value,
            events: EventBus::new(),
        }
    }

    pub const fn value(&self) -> &SelectionValue {
        &self.value
    }

    pub const fn options(&self) -> &SelectionOptions {
        &self.options
    }

    pub const fn mode(&self) -> SelectionMode {
        self.options.mode
    }

    pub const fn rules(&self) -> &DisableConfig {
        &self.rules
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&PickerEvent) + 'static) -> ListenerId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Forwards an event to subscribers.
    pub fn notify(&mut self, event: &PickerEvent) {
        self.events.dispatch(event);
    }

    pub fn is_max_reached(&self) -> bool {
        match (self.options.mode, &self.value) {
            (SelectionMode::Multiple { max }, SelectionValue::Multiple(dates)) => {
                max > 0 && dates.len() >= max
            },
            _ => false,
        }
    }

    /// Fails with [`Rejection::Disabled`] when a rule disables `candidate`.
    ///
    /// # Errors
    /// See above.
    pub fn check(&self, candidate: &CalendarDate) -> Result<(), Rejection> {
        let today = CalendarDate::today(candidate.timezone());
        match self.rules.evaluate(candidate, today) {
            None => Ok(()),
            Some(reason) => {
                warn!(date = %candidate.to_date_string(), %reason, "date is disabled");
                Err(Rejection::Disabled {
                    date: *candidate,
                    reason,
                })
            },
        }
    }

    /// A day was picked on the calendar. In multiple mode this toggles.
    ///
    /// In single mode the previous time of day is carried over when the
    /// time picker is enabled.
    ///
    /// # Errors
    /// Returns [`Rejection::Disabled`] for a disabled day.
    pub fn select_day(&mut self, candidate: CalendarDate) -> Result<SelectOutcome, Rejection> {
        if matches!(self.options.mode, SelectionMode::Multiple { .. }) {
            return self.toggle_day(candidate);
        }

        self.check(&candidate)?;
        self.replace_single(candidate, true)?;

        Ok(if self.options.time_enabled {
            SelectOutcome::AwaitingTime
        } else if self.options.requires_confirmation {
            SelectOutcome::AwaitingConfirmation
        } else {
            SelectOutcome::Completed
        })
    }

    /// Adds or removes a day in multiple mode.
    ///
    /// Removing is always allowed. Adding a disabled day is rejected; adding
    /// at the maximum is silently ignored.
    ///
    /// # Panics
    /// Panics when the store is in single mode.
    ///
    /// # Errors
    /// Returns [`Rejection::Disabled`] when adding a disabled day.
    pub fn toggle_day(&mut self, candidate: CalendarDate) -> Result<SelectOutcome, Rejection> {
        assert!(
            matches!(self.options.mode, SelectionMode::Multiple { .. }),
            "toggle_day requires multiple selection mode"
        );

        if let Some(index) = self.value.position_of_day(&candidate) {
            let removed = self.take_at(index);
            debug!(date = %removed.to_date_string(), "deselected day");
            self.notify(&PickerEvent::SelectedDay(DayView::for_selection(&candidate, false)));
            return Ok(SelectOutcome::Removed);
        }

        self.add(candidate)
    }

    /// Typed entry in multiple mode: adds when absent, never removes.
    ///
    /// # Errors
    /// Returns [`Rejection::Disabled`] for a disabled day.
    ///
    /// # Panics
    /// Panics when the store is in single mode.
    pub fn add_typed(&mut self, candidate: CalendarDate) -> Result<SelectOutcome, Rejection> {
        assert!(
            matches!(self.options.mode, SelectionMode::Multiple { .. }),
            "add_typed requires multiple selection mode"
        );

        if self.value.contains_day(&candidate) {
            self.check(&candidate)?;
            self.notify(&PickerEvent::SelectedDay(DayView::for_selection(&candidate, true)));
            return Ok(SelectOutcome::Unchanged);
        }

        self.add(candidate)
    }

    /// Typed entry in single mode. The previous time of day is kept only when
    /// the time picker is enabled and the text carried no time (`typed_time`
    /// is false).
    ///
    /// # Errors
    /// Returns [`Rejection::Disabled`] for a disabled day.
    ///
    /// # Panics
    /// Panics when the store is in multiple mode.
    pub fn select_typed(&mut self, candidate: CalendarDate, typed_time: bool) -> Result<CalendarDate, Rejection> {
        assert!(
            self.options.mode == SelectionMode::Single,
            "select_typed requires single selection mode"
        );

        self.check(&candidate)?;
        self.replace_single(candidate, !typed_time)
    }

    /// Sets the time of day on the single selection.
    ///
    /// # Errors
    /// Returns [`Rejection::NoSelection`] without a single selection, or
    /// [`Rejection::Unparseable`] when the time does not exist on that day.
    pub fn select_time(&mut self, time: NaiveTime) -> Result<CalendarDate, Rejection> {
        let current = *self.value.single().ok_or(Rejection::NoSelection)?;
        let updated = current.with_time(time)?;

        self.value = SelectionValue::Single(updated);
        debug!(date = %updated, "selected time");
        self.notify(&PickerEvent::SelectedDay(DayView::for_selection(&updated, true)));
        Ok(updated)
    }

    /// Removes the entry at `index` and returns it.
    ///
    /// # Panics
    /// Panics when `index` is out of bounds or the store is in single mode.
    pub fn remove_at(&mut self, index: usize) -> CalendarDate {
        assert!(
            matches!(self.options.mode, SelectionMode::Multiple { .. }),
            "remove_at requires multiple selection mode"
        );

        let removed = self.take_at(index);
        debug!(index, date = %removed.to_date_string(), "removed selected date");
        self.notify(&PickerEvent::SelectedDay(DayView::for_selection(&removed, false)));
        removed
    }

    pub fn clear(&mut self) {
        self.value = match self.options.mode {
            SelectionMode::Single => SelectionValue::None,
            SelectionMode::Multiple { .. } => SelectionValue::Multiple(Vec::new()),
        };
        debug!("cleared selection");
        self.notify(&PickerEvent::Clear);
    }

    fn add(&mut self, candidate: CalendarDate) -> Result<SelectOutcome, Rejection> {
        self.check(&candidate)?;

        let outcome = if self.is_max_reached() {
            debug!(date = %candidate.to_date_string(), "maximum selection reached");
            SelectOutcome::Unchanged
        } else {
            self.dates_mut().push(candidate);
            debug!(date = %candidate.to_date_string(), "selected day");
            SelectOutcome::Added
        };

        let is_selected = outcome == SelectOutcome::Added;
        self.notify(&PickerEvent::SelectedDay(DayView::for_selection(&candidate, is_selected)));
        Ok(outcome)
    }

    fn replace_single(&mut self, candidate: CalendarDate, preserve_time: bool) -> Result<CalendarDate, Rejection> {
        let date = match self.value.single() {
            Some(previous) if preserve_time && self.options.time_enabled => {
                candidate.with_time(previous.time())?
            },
            _ => candidate,
        };

        self.value = SelectionValue::Single(date);
        debug!(%date, "selected day");
        self.notify(&PickerEvent::SelectedDay(DayView::for_selection(&date, true)));
        Ok(date)
    }

    fn dates_mut(&mut self) -> &mut Vec<CalendarDate> {
        match &mut self.value {
            SelectionValue::Multiple(dates) => dates,
            other => unreachable!("multiple mode always holds a date list, found {other:?}"),
        }
    }

    fn take_at(&mut self, index: usize) -> CalendarDate {
        let dates = self.dates_mut();
        assert!(
            index < dates.len(),
            "index {index} out of bounds for {} selected dates",
            dates.len()
        );
        dates.remove(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::DateRule;
    use crate::test_utils::{date, datetime, naive};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn single(time_enabled: bool) -> SelectionStore {
        SelectionStore::new(
            SelectionOptions {
                mode: SelectionMode::Single,
                time_enabled,
                requires_confirmation: false,
            },
            DisableConfig::default(),
        )
    }

    fn multiple(max: usize) -> SelectionStore {
        SelectionStore::new(
            SelectionOptions {
                mode: SelectionMode::Multiple { max },
                ..SelectionOptions::default()
            },
            DisableConfig::default(),
        )
    }

    fn days(store: &SelectionStore) -> Vec<String> {
        store
            .value()
            .dates()
            .iter()
            .map(CalendarDate::to_date_string)
            .collect()
    }

    fn recorder(store: &mut SelectionStore) -> Rc<RefCell<Vec<PickerEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        seen
    }

    #[test]
    fn test_select_day_single_completes() {
        let mut store = single(false);
        let outcome = store.select_day(date(2024, 6, 1)).unwrap();
        assert_eq!(outcome, SelectOutcome::Completed);
        assert_eq!(store.value(), &SelectionValue::Single(date(2024, 6, 1)));
    }

    #[test]
    fn test_select_day_outcomes_follow_options() {
        let mut timed = single(true);
        assert_eq!(
            timed.select_day(date(2024, 6, 1)).unwrap(),
            SelectOutcome::AwaitingTime
        );

        let mut confirmed = SelectionStore::new(
            SelectionOptions {
                requires_confirmation: true,
                ..SelectionOptions::default()
            },
            DisableConfig::default(),
        );
        assert_eq!(
            confirmed.select_day(date(2024, 6, 1)).unwrap(),
            SelectOutcome::AwaitingConfirmation
        );
    }

    #[test]
    fn test_select_day_preserves_previous_time() {
        let mut store = single(true);
        store.select_day(datetime(2024, 5, 20, 14, 30, 0)).unwrap();
        store.select_day(date(2024, 6, 1)).unwrap();

        let selected = store.value().single().unwrap();
        assert_eq!(selected.to_date_string(), "2024-06-01");
        assert_eq!((selected.hour(), selected.minute()), (14, 30));
    }

    #[test]
    fn test_select_day_without_time_picker_does_not_copy_time() {
        let mut store = single(false);
        store.select_day(datetime(2024, 5, 20, 14, 30, 0)).unwrap();
        store.select_day(date(2024, 6, 1)).unwrap();
        assert_eq!(store.value().single().unwrap().hour(), 0);
    }

    #[test]
    fn test_select_typed_time_heuristic() {
        let mut store = single(true);
        store.select_day(datetime(2024, 5, 20, 14, 30, 0)).unwrap();

        let kept = store.select_typed(date(2024, 6, 1), false).unwrap();
        assert_eq!((kept.hour(), kept.minute()), (14, 30));

        let typed = store.select_typed(datetime(2024, 6, 2, 9, 5, 0), true).unwrap();
        assert_eq!((typed.hour(), typed.minute()), (9, 5));
    }

    #[test]
    fn test_disabled_day_is_rejected_without_mutation() {
        let rules = DisableConfig {
            disabled_dates: vec![DateRule::Single(naive(2024, 6, 2))],
            ..DisableConfig::default()
        };
        let mut store = SelectionStore::new(SelectionOptions::default(), rules);
        store.select_day(date(2024, 6, 1)).unwrap();
        let seen = recorder(&mut store);

        let err = store.select_day(date(2024, 6, 2)).unwrap_err();
        assert!(matches!(
            err,
            Rejection::Disabled {
                reason: DisableReason::DisabledDate,
                ..
            }
        ));
        assert_eq!(err.to_string(), "Date 2024-06-02 is disabled: a disabled date");
        assert_eq!(store.value(), &SelectionValue::Single(date(2024, 6, 1)));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_toggle_twice_restores_previous_value() {
        let mut store = multiple(0);
        store.toggle_day(date(2024, 6, 1)).unwrap();
        store.toggle_day(date(2024, 6, 3)).unwrap();
        let before = store.value().clone();

        for candidate in [date(2024, 6, 2), datetime(2024, 6, 9, 8, 0, 0)] {
            assert_eq!(store.toggle_day(candidate).unwrap(), SelectOutcome::Added);
            assert_eq!(store.toggle_day(candidate).unwrap(), SelectOutcome::Removed);
            assert_eq!(store.value(), &before);
        }
    }

    #[test]
    fn test_toggle_matches_by_day_not_instant() {
        let mut store = multiple(0);
        store.toggle_day(datetime(2024, 6, 1, 8, 0, 0)).unwrap();
        assert_eq!(
            store.toggle_day(datetime(2024, 6, 1, 22, 0, 0)).unwrap(),
            SelectOutcome::Removed
        );
        assert!(store.value().is_empty());
    }

    #[test]
    fn test_toggle_keeps_insertion_order() {
        let mut store = multiple(0);
        for day in [5, 1, 3] {
            store.toggle_day(date(2024, 6, day)).unwrap();
        }
        assert_eq!(days(&store), vec!["2024-06-05", "2024-06-01", "2024-06-03"]);
    }

    #[test]
    fn test_max_is_never_exceeded() {
        let mut store = multiple(2);
        for day in 1..=5 {
            store.toggle_day(date(2024, 6, day)).unwrap();
            assert!(store.value().dates().len() <= 2);
        }
        assert_eq!(days(&store), vec!["2024-06-01", "2024-06-02"]);
        assert!(store.is_max_reached());
        assert_eq!(
            store.toggle_day(date(2024, 6, 9)).unwrap(),
            SelectOutcome::Unchanged
        );

        // removing frees a slot again
        store.toggle_day(date(2024, 6, 1)).unwrap();
        assert_eq!(store.toggle_day(date(2024, 6, 9)).unwrap(), SelectOutcome::Added);
        assert_eq!(days(&store), vec!["2024-06-02", "2024-06-09"]);
    }

    #[test]
    fn test_toggle_allows_removing_a_now_disabled_day() {
        let rules = DisableConfig {
            max_date: Some(naive(2024, 6, 10)),
            ..DisableConfig::default()
        };
        let mut store = SelectionStore::new(
            SelectionOptions {
                mode: SelectionMode::Multiple { max: 0 },
                ..SelectionOptions::default()
            },
            rules,
        );

        assert!(store.toggle_day(date(2024, 6, 11)).is_err());
        store.toggle_day(date(2024, 6, 10)).unwrap();
        assert_eq!(store.toggle_day(date(2024, 6, 10)).unwrap(), SelectOutcome::Removed);
    }

    #[test]
    fn test_select_day_in_multiple_mode_toggles() {
        let mut store = multiple(0);
        assert_eq!(store.select_day(date(2024, 6, 1)).unwrap(), SelectOutcome::Added);
        assert_eq!(store.select_day(date(2024, 6, 1)).unwrap(), SelectOutcome::Removed);
    }

    #[test]
    #[should_panic(expected = "toggle_day requires multiple selection mode")]
    fn test_toggle_in_single_mode_panics() {
        let mut store = single(false);
        let _ = store.toggle_day(date(2024, 6, 1));
    }

    #[test]
    #[should_panic(expected = "select_typed requires single selection mode")]
    fn test_select_typed_in_multiple_mode_panics() {
        let mut store = multiple(0);
        let _ = store.select_typed(date(2024, 6, 1), false);
    }

    #[test]
    fn test_add_typed_disabled_day_is_rejected_without_mutation() {
        let rules = DisableConfig {
            disabled_dates: vec![DateRule::Single(naive(2024, 6, 2))],
            ..DisableConfig::default()
        };
        let mut store = SelectionStore::new(
            SelectionOptions {
                mode: SelectionMode::Multiple { max: 0 },
                ..SelectionOptions::default()
            },
            rules,
        );
        store.add_typed(date(2024, 6, 1)).unwrap();
        let seen = recorder(&mut store);

        let err = store.add_typed(date(2024, 6, 2)).unwrap_err();
        assert!(matches!(
            err,
            Rejection::Disabled {
                reason: DisableReason::DisabledDate,
                ..
            }
        ));
        assert_eq!(days(&store), vec!["2024-06-01"]);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_add_typed_never_removes() {
        let mut store = multiple(0);
        assert_eq!(store.add_typed(date(2024, 6, 1)).unwrap(), SelectOutcome::Added);
        assert_eq!(store.add_typed(date(2024, 6, 1)).unwrap(), SelectOutcome::Unchanged);
        assert_eq!(days(&store), vec!["2024-06-01"]);
    }

    #[test]
    fn test_remove_at() {
        let mut store = multiple(0);
        for day in [1, 2, 3] {
            store.toggle_day(date(2024, 6, day)).unwrap();
        }
        let removed = store.remove_at(1);
        assert_eq!(removed.to_date_string(), "2024-06-02");
        assert_eq!(days(&store), vec!["2024-06-01", "2024-06-03"]);
    }

    #[test]
    #[should_panic(expected = "index 3 out of bounds for 1 selected dates")]
    fn test_remove_at_out_of_range_panics() {
        let mut store = multiple(0);
        store.toggle_day(date(2024, 6, 1)).unwrap();
        store.remove_at(3);
    }

    #[test]
    fn test_select_time() {
        let mut store = single(true);
        assert_eq!(
            store.select_time(NaiveTime::MIN).unwrap_err(),
            Rejection::NoSelection
        );

        store.select_day(date(2024, 6, 1)).unwrap();
        let time = CalendarDate::time_of_day(16, 45, 0).unwrap();
        let updated = store.select_time(time).unwrap();
        assert_eq!(updated, datetime(2024, 6, 1, 16, 45, 0));
        assert_eq!(store.value().single(), Some(&updated));
    }

    #[test]
    fn test_clear_resets_for_mode() {
        let mut single_store = single(false);
        single_store.select_day(date(2024, 6, 1)).unwrap();
        single_store.clear();
        assert_eq!(single_store.value(), &SelectionValue::None);

        let mut multiple_store = multiple(0);
        multiple_store.toggle_day(date(2024, 6, 1)).unwrap();
        multiple_store.clear();
        assert_eq!(multiple_store.value(), &SelectionValue::Multiple(Vec::new()));
    }

    #[test]
    fn test_mutations_notify_subscribers() {
        let mut store = multiple(1);
        let seen = recorder(&mut store);

        store.toggle_day(date(2024, 6, 1)).unwrap();
        store.toggle_day(date(2024, 6, 2)).unwrap();
        store.remove_at(0);
        store.clear();

        let seen = seen.borrow();
        let selected: Vec<(String, bool)> = seen
            .iter()
            .filter_map(|event| match event {
                PickerEvent::SelectedDay(day) => Some((day.date.clone(), day.is_selected)),
                _ => None,
            })
            .collect();
        assert_eq!(
            selected,
            vec![
                ("2024-06-01".to_owned(), true),
                ("2024-06-02".to_owned(), false),
                ("2024-06-01".to_owned(), false),
            ]
        );
        assert_eq!(seen.last(), Some(&PickerEvent::Clear));
    }
}
