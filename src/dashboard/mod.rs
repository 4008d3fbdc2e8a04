//! The dashboard page, summarising recent activity across the app.

mod page;

pub use page::{DashboardPageState, get_dashboard_page};
