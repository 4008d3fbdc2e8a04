//! The month shown on the calendar page.

use time::{Date, Month, util::days_in_year_month};

/// A calendar month, parsed from and serialized to the `month` query
/// parameter in `YYYY-MM` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: Month,
}

impl CalendarMonth {
    /// The month containing `date`.
    pub fn containing(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse the `month` query parameter. Missing or malformed values fall
    /// back to the month containing `today`.
    pub fn from_query(raw: Option<&str>, today: Date) -> Self {
        let Some(raw) = raw else {
            return Self::containing(today);
        };

        let mut parts = raw.splitn(2, '-');
        let year = parts.next().and_then(|part| part.parse::<i32>().ok());
        let month = parts
            .next()
            .and_then(|part| part.parse::<u8>().ok())
            .and_then(|number| Month::try_from(number).ok());

        match (year, month) {
            (Some(year), Some(month)) => Self { year, month },
            _ => Self::containing(today),
        }
    }

    /// The value used in `month` query parameters, e.g. "2025-08".
    pub fn query_value(&self) -> String {
        format!("{}-{:02}", self.year, self.month as u8)
    }

    /// The heading shown above the grid, e.g. "August 2025".
    pub fn title(&self) -> String {
        format!("{} {}", self.month, self.year)
    }

    /// The previous calendar month.
    pub fn previous(&self) -> Self {
        if self.month == Month::January {
            Self {
                year: self.year - 1,
                month: Month::December,
            }
        } else {
            Self {
                year: self.year,
                month: self.month.previous(),
            }
        }
    }

    /// The next calendar month.
    pub fn next(&self) -> Self {
        if self.month == Month::December {
            Self {
                year: self.year + 1,
                month: Month::January,
            }
        } else {
            Self {
                year: self.year,
                month: self.month.next(),
            }
        }
    }

    /// The number of days in the month.
    pub fn day_count(&self) -> u8 {
        days_in_year_month(self.year, self.month)
    }

    /// The date of the given day of the month.
    ///
    /// Returns `None` when the day is out of range for the month.
    pub fn date_of(&self, day: u8) -> Option<Date> {
        Date::from_calendar_date(self.year, self.month, day).ok()
    }

    /// The number of leading blank cells in a grid whose weeks start on
    /// Sunday.
    pub fn leading_blank_days(&self) -> u8 {
        match self.date_of(1) {
            Some(first) => first.weekday().number_days_from_sunday(),
            None => 0,
        }
    }
}
