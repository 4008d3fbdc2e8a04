//! Recording and browsing the money a user earns, spends, invests and saves.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::{create_transaction_endpoint, get_new_transaction_page};
pub use db::{
    create_transaction, create_transaction_table, delete_transaction, get_transaction,
    get_transactions, update_transaction,
};
pub use delete::delete_transaction_endpoint;
pub use domain::{
    NewTransaction, Transaction, TransactionType, TypeTotals, sort_by_recency, totals_by_type,
};
pub use edit::{get_edit_transaction_page, update_transaction_endpoint};
pub use list::get_transactions_page;
