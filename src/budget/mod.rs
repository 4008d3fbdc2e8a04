//! Spending budgets with per-timeframe limits and a running spent total.

mod create;
mod db;
mod delete;
mod domain;
mod list;
mod spend;

pub use create::{create_budget_endpoint, get_new_budget_page};
pub use db::{
    add_budget_expense, create_budget, create_budget_table, delete_budget, get_budget, get_budgets,
    update_budget_spent,
};
pub use delete::delete_budget_endpoint;
pub use domain::{Budget, NewBudget, Timeframe, budget_progress};
pub use list::get_budgets_page;
pub use spend::add_budget_expense_endpoint;
