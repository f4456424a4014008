/// Minimum valid year (inclusive)
pub const MIN_YEAR: u16 = 1;

/// Maximum valid year (inclusive)
pub const MAX_YEAR: u16 = 9999;

/// Two-digit years below this land in the 2000s, the rest in the 1900s
pub const TWO_DIGIT_YEAR_PIVOT: i32 = 50;
/// Century added to a two-digit year below the pivot
pub(crate) const CURRENT_CENTURY: i32 = 2000;
/// Century added to a two-digit year at or above the pivot
pub(crate) const PREVIOUS_CENTURY: i32 = 1900;

/// Maximum valid month (December)
pub const MAX_MONTH: u8 = 12;

/// Month number for February
pub const FEBRUARY: u8 = 2;

/// Days in February for leap years
pub const FEBRUARY_DAYS_LEAP: u8 = 29;

/// Maximum days in each month (index 0 is unused, months are 1-indexed)
/// February shows 28 days (non-leap year default)
pub const DAYS_IN_MONTH: [u8; 13] = [
    0,  // index 0 unused (months are 1-indexed)
    31, // January
    28, // February (non-leap, adjusted by is_leap_year check)
    31, // March
    30, // April
    31, // May
    30, // June
    31, // July
    31, // August
    30, // September
    31, // October
    30, // November
    31, // December
];

/// Months in a calendar year, used by month navigation
pub const MONTHS_PER_YEAR: i32 = 12;

/// Highest weekday number (Saturday, with Sunday = 0)
pub const MAX_WEEKDAY: u8 = 6;

/// Hours on a 24-hour clock
pub const HOURS_PER_DAY: u32 = 24;

/// Minutes per hour, also seconds per minute
pub const MINUTES_PER_HOUR: u32 = 60;

/// Hour that flips between AM and PM on a 12-hour clock
pub const MERIDIEM_HOUR: u32 = 12;

/// Leap year occurs every 4 years
pub(crate) const LEAP_YEAR_CYCLE: u16 = 4;
/// Century years are not leap years unless...
pub(crate) const CENTURY_CYCLE: u16 = 100;
/// ...they are divisible by 400 (Gregorian calendar correction)
pub(crate) const GREGORIAN_CYCLE: u16 = 400;

/// Range separator (ISO 8601 interval format)
pub const RANGE_SEPARATOR: char = '/';
/// Time component separator; its presence marks typed input as carrying a time
pub const TIME_SEPARATOR: char = ':';

/// Date-only format used for storage when no parse format is configured
pub const ISO_DATE_FORMAT: &str = "YYYY-MM-DD";
/// Date-time format used for storage when the time picker is enabled
pub const ISO_DATETIME_FORMAT: &str = "YYYY-MM-DDTHH:mm:ss";

/// Default weekday labels, Sunday first
pub const DEFAULT_WEEK_DAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Timezone used when the host supplies none
pub const DEFAULT_TIMEZONE: &str = "UTC";
