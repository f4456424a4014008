//! Picker configuration as the host page passes it (camelCase JSON).

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{
    parse::iso_day,
    rules::{DateRule, DisableConfig, PastDatesPolicy, YearRule},
    selection::{SelectionMode, SelectionOptions},
    DateFormatPreference, Month, RangeError, WeekdayNumber, DEFAULT_TIMEZONE, DEFAULT_WEEK_DAYS,
    ISO_DATETIME_FORMAT, ISO_DATE_FORMAT,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid picker configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Invalid date rule: {0}")]
    Range(#[from] RangeError),
}

/// Top-level picker configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PickerConfig {
    /// Keep the picker open after a single selection until confirmed.
    pub requires_confirmation:  bool,
    pub timezone:               TimezoneConfig,
    pub calendar:               CalendarConfig,
    pub time_picker:            TimePickerConfig,
    pub input:                  InputConfig,
    pub date_format_preference: DateFormatPreference,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimezoneConfig {
    /// IANA name, e.g. `Europe/Berlin`. Falls back to UTC.
    pub user: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarConfig {
    #[serde(default)]
    pub multiple:      MultipleConfig,
    #[serde(default = "default_week_days")]
    pub week_days:     Vec<String>,
    #[serde(default)]
    pub start_of_week: WeekdayNumber,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub min:           Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub max:           Option<NaiveDate>,
    #[serde(default)]
    pub allowed_dates: Vec<DateRule>,
    #[serde(default)]
    pub disabled:      DisabledConfig,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            multiple:      MultipleConfig::default(),
            week_days:     default_week_days(),
            start_of_week: WeekdayNumber::default(),
            min:           None,
            max:           None,
            allowed_dates: Vec::new(),
            disabled:      DisabledConfig::default(),
        }
    }
}

fn default_week_days() -> Vec<String> {
    DEFAULT_WEEK_DAYS.iter().map(ToString::to_string).collect()
}

/// `null`, `""` and whitespace all mean "no bound".
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(text) if !text.trim().is_empty() => {
            iso_day(text.trim()).map(Some).map_err(serde::de::Error::custom)
        },
        _ => Ok(None),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultipleConfig {
    pub enabled: bool,
    /// Upper bound on selected dates; 0 means unlimited.
    pub max:     usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisabledConfig {
    pub years:      Vec<YearRule>,
    pub months:     Vec<Month>,
    pub weekdays:   Vec<WeekdayNumber>,
    pub dates:      Vec<DateRule>,
    pub past_dates: PastDatesPolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimePickerConfig {
    pub enabled: bool,
    #[serde(rename = "is12H")]
    pub is_12h:  bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputConfig {
    /// Storage and typed-input pattern, e.g. `DD/MM/YYYY`.
    pub parse_format:   Option<String>,
    /// Pattern for the read-only display text.
    pub display_format: Option<String>,
}

impl PickerConfig {
    /// Deserializes and validates a configuration.
    ///
    /// # Errors
    /// Returns `ConfigError` for malformed JSON, an unknown timezone or an
    /// inverted range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns `ConfigError` for an unknown timezone or an inverted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timezone()?;
        self.disable_config().validate()?;
        Ok(())
    }

    /// The user's timezone, UTC when none is configured.
    ///
    /// # Errors
    /// Returns `ConfigError::UnknownTimezone` for a name missing from the
    /// IANA database.
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        let name = self
            .timezone
            .user
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_TIMEZONE);

        name.trim()
            .parse::<Tz>()
            .map_err(|_| ConfigError::UnknownTimezone(name.to_owned()))
    }

    pub fn disable_config(&self) -> DisableConfig {
        let calendar = &self.calendar;
        DisableConfig {
            allowed_dates:     calendar.allowed_dates.clone(),
            disabled_years:    calendar.disabled.years.clone(),
            disabled_months:   calendar.disabled.months.clone(),
            disabled_weekdays: calendar.disabled.weekdays.clone(),
            disabled_dates:    calendar.disabled.dates.clone(),
            past_dates:        calendar.disabled.past_dates,
            min_date:          calendar.min,
            max_date:          calendar.max,
        }
    }

    pub const fn selection_mode(&self) -> SelectionMode {
        if self.calendar.multiple.enabled {
            SelectionMode::Multiple {
                max: self.calendar.multiple.max,
            }
        } else {
            SelectionMode::Single
        }
    }

    pub const fn selection_options(&self) -> SelectionOptions {
        SelectionOptions {
            mode:                  self.selection_mode(),
            time_enabled:          self.time_picker.enabled,
            requires_confirmation: self.requires_confirmation,
        }
    }

    /// Pattern used to store the value and to read typed input.
    pub fn date_format(&self) -> &str {
        if let Some(format) = self.input.parse_format.as_deref().filter(|f| !f.is_empty()) {
            return format;
        }

        if self.calendar.multiple.enabled || !self.time_picker.enabled {
            ISO_DATE_FORMAT
        } else {
            ISO_DATETIME_FORMAT
        }
    }
}
