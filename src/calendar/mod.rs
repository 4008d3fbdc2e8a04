//! A monthly calendar of transactions with per-day net amounts.

mod month;
mod page;

pub use month::CalendarMonth;
pub use page::{CalendarPageState, get_calendar_page};
