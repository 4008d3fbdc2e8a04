//! The reporting periods selectable on the analytics page.

use time::{Date, Duration, Month, util::days_in_year_month};

/// How far back the analytics page looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// The last seven days.
    Week,
    /// The last calendar month.
    Month,
    /// The last calendar year.
    Year,
}

impl Period {
    /// All periods in display order.
    pub const ALL: [Period; 3] = [Period::Week, Period::Month, Period::Year];

    /// The identifier used in the `period` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    /// The tab label shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Period::Week => "Week",
            Period::Month => "Month",
            Period::Year => "Year",
        }
    }

    /// Parse the `period` query parameter. Missing or unknown values fall
    /// back to [Period::Month].
    pub fn from_query(raw: Option<&str>) -> Period {
        match raw {
            Some("week") => Period::Week,
            Some("year") => Period::Year,
            _ => Period::Month,
        }
    }

    /// The first day included in the period ending at `today`.
    pub fn start_date(&self, today: Date) -> Date {
        match self {
            Period::Week => today - Duration::days(7),
            Period::Month => {
                let (year, month) = if today.month() == Month::January {
                    (today.year() - 1, Month::December)
                } else {
                    (today.year(), today.month().previous())
                };
                let day = today.day().min(days_in_year_month(year, month));

                Date::from_calendar_date(year, month, day).unwrap_or(today)
            }
            // Fall back a day for February 29th.
            Period::Year => today
                .replace_year(today.year() - 1)
                .unwrap_or(today - Duration::days(366)),
        }
    }
}
