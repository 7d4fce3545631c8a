use chrono::{Local, NaiveDate};

/// Textual form used for every persisted or displayed calendar date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A simple clock abstraction for deterministic "today" in services and tests.
///
/// Scheduling only ever looks at calendar days, so the clock hands out
/// `NaiveDate` values in the user's local timezone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(NaiveDate),
}

impl Clock {
    /// Returns a clock that follows the local system date.
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    /// Returns a clock fixed at the given date.
    #[must_use]
    pub fn fixed(on: NaiveDate) -> Self {
        Self::Fixed(on)
    }

    /// Returns the current calendar date according to the clock.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::System => Local::now().date_naive(),
            Clock::Fixed(day) => *day,
        }
    }
}

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns the underlying `chrono` parse error for anything else.
pub fn parse_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
}

/// Formats a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Deterministic reference date for tests and examples (2024-01-02).
///
/// # Panics
///
/// Panics if the fixed date cannot be represented.
#[must_use]
pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).expect("fixed date should be valid")
}
