//! Outstanding debts such as credit card balances, loans and EMIs.

mod create;
mod db;
mod delete;
mod domain;
mod update;

pub use create::{create_debt_endpoint, get_new_debt_page};
pub use db::{create_debt, create_debt_table, delete_debt, get_debt, get_debts};
pub use delete::delete_debt_endpoint;
pub use domain::{Debt, DebtType, NewDebt, payment_progress};
pub use update::update_debt_endpoint;
