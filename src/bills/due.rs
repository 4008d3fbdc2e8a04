//! Due date arithmetic and urgency labels for upcoming bills.

use time::Date;

/// The number of whole days between `today` and `due_date`.
///
/// Negative when the due date has already passed.
pub fn days_until_due(due_date: Date, today: Date) -> i64 {
    (due_date - today).whole_days()
}

/// How urgently a bill needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    /// The due date has passed.
    Overdue,
    /// Due on the current day.
    DueToday,
    /// Due within the next three days.
    DueSoon,
    /// Due in more than three days.
    Upcoming,
}

impl DueStatus {
    /// Classify a bill by how many days remain until it is due.
    pub fn from_days(days: i64) -> Self {
        match days {
            days if days < 0 => DueStatus::Overdue,
            0 => DueStatus::DueToday,
            1..=3 => DueStatus::DueSoon,
            _ => DueStatus::Upcoming,
        }
    }

    /// The badge classes used to render the status.
    pub fn badge_class(&self) -> &'static str {
        match self {
            DueStatus::Overdue => {
                "inline-flex items-center px-2.5 py-0.5 text-xs font-semibold \
                text-red-800 bg-red-100 rounded-full dark:bg-red-900 dark:text-red-300"
            }
            DueStatus::DueToday => {
                "inline-flex items-center px-2.5 py-0.5 text-xs font-semibold \
                text-orange-800 bg-orange-100 rounded-full dark:bg-orange-900 dark:text-orange-300"
            }
            DueStatus::DueSoon => {
                "inline-flex items-center px-2.5 py-0.5 text-xs font-semibold \
                text-yellow-800 bg-yellow-100 rounded-full dark:bg-yellow-900 dark:text-yellow-300"
            }
            DueStatus::Upcoming => {
                "inline-flex items-center px-2.5 py-0.5 text-xs font-semibold \
                text-gray-800 bg-gray-100 rounded-full dark:bg-gray-700 dark:text-gray-300"
            }
        }
    }
}

/// The text shown next to a bill, e.g. "Due in 2 days".
///
/// Overdue bills always use the plural "days", even for a single day.
pub fn due_label(days: i64) -> String {
    if days < 0 {
        format!("Overdue by {} days", -days)
    } else if days == 0 {
        "Due today".to_string()
    } else {
        format!("Due in {days} days")
    }
}
