//! Disable rules for calendar days.
//!
//! Rule groups are mutually exclusive: the first populated group decides, in
//! the order allow-list, past dates, disabled dates, months, years,
//! weekdays, then the min/max window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{prelude::*, CalendarDate, DateRange, Month, ParseError, RangeError, WeekdayNumber};

/// A single calendar day or an inclusive range of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateRule {
    Single(NaiveDate),
    Range(DateRange),
}

impl DateRule {
    pub fn matches(&self, candidate: &CalendarDate) -> bool {
        match self {
            Self::Single(date) => candidate.is_same_day(*date),
            Self::Range(range) => range.contains_date(candidate),
        }
    }
}

impl From<NaiveDate> for DateRule {
    fn from(date: NaiveDate) -> Self {
        Self::Single(date)
    }
}

impl From<DateRange> for DateRule {
    fn from(range: DateRange) -> Self {
        Self::Range(range)
    }
}

/// A single year or an inclusive range of years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearRule {
    Single(i32),
    Range(i32, i32),
}

impl YearRule {
    pub const fn matches(&self, year: i32) -> bool {
        match *self {
            Self::Single(value) => year == value,
            Self::Range(start, end) => start <= year && year <= end,
        }
    }
}

/// How dates in the past are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PastDatesRepr", into = "PastDatesRepr")]
pub enum PastDatesPolicy {
    #[default]
    Off,
    /// Every day strictly before today.
    BeforeToday,
    /// Every day on or before the cutoff.
    OnOrBefore(NaiveDate),
}

/// Wire shape: `false`, `true`, a cutoff date string, or `""` for off.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum PastDatesRepr {
    Flag(bool),
    Cutoff(NaiveDate),
    Text(String),
}

impl TryFrom<PastDatesRepr> for PastDatesPolicy {
    type Error = ParseError;

    fn try_from(repr: PastDatesRepr) -> Result<Self, Self::Error> {
        match repr {
            PastDatesRepr::Flag(false) => Ok(Self::Off),
            PastDatesRepr::Flag(true) => Ok(Self::BeforeToday),
            PastDatesRepr::Cutoff(date) => Ok(Self::OnOrBefore(date)),
            PastDatesRepr::Text(text) if text.trim().is_empty() => Ok(Self::Off),
            PastDatesRepr::Text(text) => Err(ParseError::InvalidFormat(format!(
                "pastDates expects a boolean or a YYYY-MM-DD cutoff, got {text:?}"
            ))),
        }
    }
}

impl From<PastDatesPolicy> for PastDatesRepr {
    fn from(policy: PastDatesPolicy) -> Self {
        match policy {
            PastDatesPolicy::Off => Self::Flag(false),
            PastDatesPolicy::BeforeToday => Self::Flag(true),
            PastDatesPolicy::OnOrBefore(date) => Self::Cutoff(date),
        }
    }
}

/// Which rule disabled a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DisableReason {
    #[display(fmt = "not in the allowed dates")]
    NotAllowed,
    #[display(fmt = "in the past")]
    Past,
    #[display(fmt = "a disabled date")]
    DisabledDate,
    #[display(fmt = "in a disabled month")]
    DisabledMonth,
    #[display(fmt = "in a disabled year")]
    DisabledYear,
    #[display(fmt = "on a disabled weekday")]
    DisabledWeekday,
    #[display(fmt = "before the minimum date")]
    BeforeMin,
    #[display(fmt = "after the maximum date")]
    AfterMax,
}

/// The full set of disable rules for a picker. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisableConfig {
    pub allowed_dates:     Vec<DateRule>,
    pub disabled_years:    Vec<YearRule>,
    pub disabled_months:   Vec<Month>,
    pub disabled_weekdays: Vec<WeekdayNumber>,
    pub disabled_dates:    Vec<DateRule>,
    pub past_dates:        PastDatesPolicy,
    pub min_date:          Option<NaiveDate>,
    pub max_date:          Option<NaiveDate>,
}

impl DisableConfig {
    /// Checks invariants that the rule types cannot express on their own.
    ///
    /// # Errors
    /// Returns `RangeError` for an inverted year range or `min_date > max_date`.
    pub fn validate(&self) -> Result<(), RangeError> {
        for rule in &self.disabled_years {
            match *rule {
                YearRule::Range(start, end) if start > end => {
                    return Err(RangeError::InvalidYearRange { start, end });
                },
                _ => {},
            }
        }

        match (self.min_date, self.max_date) {
            (Some(start), Some(end)) if start > end => Err(RangeError::InvalidRange { start, end }),
            _ => Ok(()),
        }
    }

    /// Whether `candidate` is disabled, judged against today in its own timezone.
    pub fn is_disabled(&self, candidate: &CalendarDate) -> bool {
        self.is_disabled_on(candidate, CalendarDate::today(candidate.timezone()))
    }

    /// Whether `candidate` is disabled, with "today" supplied by the caller.
    pub fn is_disabled_on(&self, candidate: &CalendarDate, today: NaiveDate) -> bool {
        self.evaluate(candidate, today).is_some()
    }

    /// Returns the rule that disables `candidate`, if any.
    pub fn evaluate(&self, candidate: &CalendarDate, today: NaiveDate) -> Option<DisableReason> {
        let day = candidate.date_naive();

        if !self.allowed_dates.is_empty() {
            let allowed = self.allowed_dates.iter().any(|rule| rule.matches(candidate));
            return (!allowed).then_some(DisableReason::NotAllowed);
        }

        match self.past_dates {
            PastDatesPolicy::Off => {},
            PastDatesPolicy::BeforeToday => return (day < today).then_some(DisableReason::Past),
            PastDatesPolicy::OnOrBefore(cutoff) => {
                return (day <= cutoff).then_some(DisableReason::Past);
            },
        }

        if !self.disabled_dates.is_empty() {
            let hit = self.disabled_dates.iter().any(|rule| rule.matches(candidate));
            return hit.then_some(DisableReason::DisabledDate);
        }

        if !self.disabled_months.is_empty() {
            let hit = self
                .disabled_months
                .iter()
                .any(|month| u32::from(month.get()) == candidate.month());
            return hit.then_some(DisableReason::DisabledMonth);
        }

        if !self.disabled_years.is_empty() {
            let hit = self.disabled_years.iter().any(|rule| rule.matches(candidate.year()));
            return hit.then_some(DisableReason::DisabledYear);
        }

        if self
            .disabled_weekdays
            .iter()
            .any(|weekday| weekday.get() == candidate.weekday())
        {
            return Some(DisableReason::DisabledWeekday);
        }

        match (self.min_date, self.max_date) {
            (Some(min), _) if day < min => Some(DisableReason::BeforeMin),
            (_, Some(max)) if day > max => Some(DisableReason::AfterMax),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{date, datetime, naive};

    fn today() -> NaiveDate {
        naive(2024, 6, 15)
    }

    fn range(start: NaiveDate, end: NaiveDate) -> DateRule {
        DateRule::Range(DateRange::new(start, end).expect("valid test range"))
    }

    fn month(value: u8) -> Month {
        Month::new(value).expect("valid test month")
    }

    fn weekday(value: u8) -> WeekdayNumber {
        WeekdayNumber::new(value).expect("valid test weekday")
    }

    #[test]
    fn test_empty_config_enables_everything() {
        let config = DisableConfig::default();
        assert!(!config.is_disabled_on(&date(1900, 1, 1), today()));
        assert!(!config.is_disabled_on(&date(2999, 12, 31), today()));
    }

    #[test]
    fn test_allowed_dates_override_every_other_rule() {
        let config = DisableConfig {
            allowed_dates: vec![
                DateRule::Single(naive(2024, 6, 1)),
                range(naive(2024, 7, 1), naive(2024, 7, 5)),
            ],
            disabled_years: vec![YearRule::Single(2024)],
            disabled_months: vec![month(6), month(7)],
            disabled_weekdays: (0..=6).map(weekday).collect(),
            disabled_dates: vec![DateRule::Single(naive(2024, 6, 1))],
            past_dates: PastDatesPolicy::BeforeToday,
            min_date: Some(naive(2025, 1, 1)),
            max_date: Some(naive(2025, 12, 31)),
        };

        for allowed in [date(2024, 6, 1), date(2024, 7, 1), date(2024, 7, 3), date(2024, 7, 5)] {
            assert!(
                !config.is_disabled_on(&allowed, today()),
                "{} is allow-listed",
                allowed.to_date_string()
            );
        }
        assert!(!config.is_disabled_on(&datetime(2024, 6, 1, 18, 45, 0), today()));

        assert_eq!(
            config.evaluate(&date(2024, 6, 2), today()),
            Some(DisableReason::NotAllowed)
        );
        assert_eq!(
            config.evaluate(&date(2024, 7, 6), today()),
            Some(DisableReason::NotAllowed)
        );
    }

    #[test]
    fn test_past_dates_before_today() {
        let config = DisableConfig {
            past_dates: PastDatesPolicy::BeforeToday,
            ..DisableConfig::default()
        };

        for day in 1..15 {
            assert!(
                config.is_disabled_on(&date(2024, 6, day), today()),
                "2024-06-{day:02} is in the past"
            );
        }
        assert!(!config.is_disabled_on(&date(2024, 6, 15), today()), "today stays enabled");
        assert!(!config.is_disabled_on(&date(2024, 6, 16), today()));
    }

    #[test]
    fn test_past_dates_custom_cutoff_is_inclusive() {
        let config = DisableConfig {
            past_dates: PastDatesPolicy::OnOrBefore(naive(2024, 3, 10)),
            ..DisableConfig::default()
        };

        assert!(config.is_disabled_on(&date(2024, 3, 9), today()));
        assert!(config.is_disabled_on(&datetime(2024, 3, 10, 23, 0, 0), today()));
        assert!(!config.is_disabled_on(&date(2024, 3, 11), today()));
    }

    #[test]
    fn test_past_dates_shadow_later_rules() {
        let config = DisableConfig {
            past_dates: PastDatesPolicy::BeforeToday,
            disabled_dates: vec![DateRule::Single(naive(2024, 6, 20))],
            ..DisableConfig::default()
        };

        // disabled_dates is never consulted once the past-date policy is active
        assert!(!config.is_disabled_on(&date(2024, 6, 20), today()));
    }

    #[test]
    fn test_disabled_dates_singles_and_ranges() {
        let config = DisableConfig {
            disabled_dates: vec![
                DateRule::Single(naive(2024, 12, 25)),
                range(naive(2024, 8, 1), naive(2024, 8, 15)),
            ],
            disabled_months: vec![month(1)],
            ..DisableConfig::default()
        };

        assert_eq!(
            config.evaluate(&date(2024, 12, 25), today()),
            Some(DisableReason::DisabledDate)
        );
        assert!(config.is_disabled_on(&date(2024, 8, 15), today()));
        assert!(!config.is_disabled_on(&date(2024, 8, 16), today()));
        // months are shadowed by the populated disabled_dates group
        assert!(!config.is_disabled_on(&date(2025, 1, 10), today()));
    }

    #[test]
    fn test_disabled_months_use_real_month() {
        let config = DisableConfig {
            disabled_months: vec![month(1), month(12)],
            ..DisableConfig::default()
        };

        assert_eq!(
            config.evaluate(&date(2024, 1, 31), today()),
            Some(DisableReason::DisabledMonth)
        );
        assert!(config.is_disabled_on(&date(2024, 12, 1), today()));
        assert!(!config.is_disabled_on(&date(2024, 2, 1), today()));
        assert!(!config.is_disabled_on(&date(2024, 11, 30), today()));
    }

    #[test]
    fn test_disabled_years_singles_and_ranges() {
        let config = DisableConfig {
            disabled_years: vec![YearRule::Single(2020), YearRule::Range(2030, 2035)],
            ..DisableConfig::default()
        };

        assert_eq!(
            config.evaluate(&date(2020, 5, 5), today()),
            Some(DisableReason::DisabledYear)
        );
        assert!(config.is_disabled_on(&date(2030, 1, 1), today()));
        assert!(config.is_disabled_on(&date(2035, 12, 31), today()));
        assert!(!config.is_disabled_on(&date(2036, 1, 1), today()));
        assert!(!config.is_disabled_on(&date(2021, 1, 1), today()));
    }

    #[test]
    fn test_disabled_weekdays_fall_through_to_min_max() {
        let config = DisableConfig {
            disabled_weekdays: vec![weekday(0), weekday(6)],
            min_date: Some(naive(2024, 6, 10)),
            ..DisableConfig::default()
        };

        // 2024-06-08 and 2024-06-09 are a Saturday and a Sunday
        assert_eq!(
            config.evaluate(&date(2024, 6, 8), today()),
            Some(DisableReason::DisabledWeekday)
        );
        assert!(config.is_disabled_on(&date(2024, 6, 9), today()));
        // a weekday that is not listed still has to pass the min/max window
        assert_eq!(
            config.evaluate(&date(2024, 6, 7), today()),
            Some(DisableReason::BeforeMin)
        );
        assert!(!config.is_disabled_on(&date(2024, 6, 11), today()));
    }

    #[test]
    fn test_min_max_window() {
        struct TestCase {
            min:         Option<NaiveDate>,
            max:         Option<NaiveDate>,
            candidate:   CalendarDate,
            expected:    Option<DisableReason>,
            description: &'static str,
        }

        let min = Some(naive(2024, 6, 1));
        let max = Some(naive(2024, 6, 30));

        let cases = [
            TestCase {
                min,
                max,
                candidate: date(2024, 6, 1),
                expected: None,
                description: "lower bound is inclusive",
            },
            TestCase {
                min,
                max,
                candidate: datetime(2024, 6, 30, 23, 59, 0),
                expected: None,
                description: "upper bound is inclusive at day granularity",
            },
            TestCase {
                min,
                max,
                candidate: date(2024, 5, 31),
                expected: Some(DisableReason::BeforeMin),
                description: "before the window",
            },
            TestCase {
                min,
                max,
                candidate: date(2024, 7, 1),
                expected: Some(DisableReason::AfterMax),
                description: "after the window",
            },
            TestCase {
                min,
                max: None,
                candidate: date(2099, 1, 1),
                expected: None,
                description: "only min set, far future allowed",
            },
            TestCase {
                min: None,
                max,
                candidate: date(1999, 1, 1),
                expected: None,
                description: "only max set, far past allowed",
            },
            TestCase {
                min: None,
                max,
                candidate: date(2024, 7, 1),
                expected: Some(DisableReason::AfterMax),
                description: "only max set, after it",
            },
        ];

        for case in &cases {
            let config = DisableConfig {
                min_date: case.min,
                max_date: case.max,
                ..DisableConfig::default()
            };
            assert_eq!(
                config.evaluate(&case.candidate, today()),
                case.expected,
                "{}",
                case.description
            );
        }
    }

    #[test]
    fn test_validate() {
        let inverted_years = DisableConfig {
            disabled_years: vec![YearRule::Range(2030, 2020)],
            ..DisableConfig::default()
        };
        assert!(matches!(
            inverted_years.validate(),
            Err(RangeError::InvalidYearRange {
                start: 2030,
                end: 2020
            })
        ));

        let inverted_window = DisableConfig {
            min_date: Some(naive(2024, 2, 1)),
            max_date: Some(naive(2024, 1, 1)),
            ..DisableConfig::default()
        };
        assert!(inverted_window.validate().is_err());

        assert!(DisableConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rule_deserialization_shapes() {
        let rules: Vec<DateRule> =
            serde_json::from_str(r#"["2024-01-01", ["2024-02-01", "2024-02-10"]]"#).unwrap();
        assert_eq!(rules[0], DateRule::Single(naive(2024, 1, 1)));
        assert_eq!(rules[1], range(naive(2024, 2, 1), naive(2024, 2, 10)));

        let years: Vec<YearRule> = serde_json::from_str("[2020, [2030, 2035]]").unwrap();
        assert_eq!(years, vec![YearRule::Single(2020), YearRule::Range(2030, 2035)]);
    }

    #[test]
    fn test_past_dates_wire_shapes() {
        let off: PastDatesPolicy = serde_json::from_str("false").unwrap();
        let before: PastDatesPolicy = serde_json::from_str("true").unwrap();
        let cutoff: PastDatesPolicy = serde_json::from_str(r#""2024-03-10""#).unwrap();

        assert_eq!(off, PastDatesPolicy::Off);
        assert_eq!(before, PastDatesPolicy::BeforeToday);
        assert_eq!(cutoff, PastDatesPolicy::OnOrBefore(naive(2024, 3, 10)));
        assert_eq!(serde_json::to_string(&cutoff).unwrap(), r#""2024-03-10""#);

        let blank: PastDatesPolicy = serde_json::from_str(r#""""#).unwrap();
        assert_eq!(blank, PastDatesPolicy::Off);
        let spaces: PastDatesPolicy = serde_json::from_str(r#""  ""#).unwrap();
        assert_eq!(spaces, PastDatesPolicy::Off);

        for json in [r#""yesterday""#, r#""2024-02-30""#, "1"] {
            assert!(
                serde_json::from_str::<PastDatesPolicy>(json).is_err(),
                "{json} should be rejected"
            );
        }
    }
}
