//! Notifications emitted to the presentation layer.

use serde::Serialize;

use crate::{prelude::*, CalendarDate};

/// Projection of one calendar day as the view layer renders it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    /// Canonical `YYYY-MM-DD` day.
    pub date:              String,
    pub year:              i32,
    /// Real (1-indexed) month.
    pub month:             u32,
    /// Day of the month.
    pub number:            u32,
    pub is_disabled:       bool,
    pub is_today:          bool,
    pub is_selected:       bool,
    pub is_selected_month: bool,
}

impl DayView {
    /// View of a day that just went through an accepted selection change.
    pub fn for_selection(date: &CalendarDate, is_selected: bool) -> Self {
        Self {
            date: date.to_date_string(),
            year: date.year(),
            month: date.month(),
            number: date.day(),
            is_disabled: false,
            is_today: date.is_today(),
            is_selected,
            is_selected_month: true,
        }
    }
}

/// Everything the picker reports outward. `Display` gives the event name.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum PickerEvent {
    #[display(fmt = "selected::day")]
    SelectedDay(DayView),
    #[display(fmt = "selected::month")]
    SelectedMonth { year: i32, month: u8 },
    #[display(fmt = "selected::year")]
    SelectedYear(i32),
    #[display(fmt = "clear")]
    Clear,
    #[display(fmt = "cancel")]
    Cancel,
    #[display(fmt = "previous")]
    Previous,
    #[display(fmt = "next")]
    Next,
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&PickerEvent)>;

/// Synchronous observer registry. Listeners run inline, in subscription order.
#[derive(Default)]
pub struct EventBus {
    next_id:   u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&PickerEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether a listener was removed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn dispatch(&mut self, event: &PickerEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
