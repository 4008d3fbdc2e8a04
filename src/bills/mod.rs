//! The bills page, combining subscriptions and debts with due date labels.

mod due;
mod page;

pub use due::{DueStatus, days_until_due, due_label};
pub use page::{BillsPageState, get_bills_page};
