//! Spending analytics with period tabs, per-type totals and charts.

mod aggregation;
mod charts;
mod page;
mod period;

pub use aggregation::{DailyTotals, daily_trend, expenses_by_category};
pub use page::{AnalyticsPageState, get_analytics_page};
pub use period::Period;
