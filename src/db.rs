//! Database initialization for the application.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    budget::create_budget_table,
    category::{create_category_table, seed_default_categories},
    debt::create_debt_table,
    profile::create_profile_table,
    subscription::create_subscription_table,
    transaction::create_transaction_table,
    user::create_user_table,
};

/// Create the application tables and seed the default categories.
///
/// All statements run in a single exclusive transaction, so a fresh database
/// is either fully initialized or left untouched.
///
/// # Errors
///
/// Returns an [Error::SqlError] if any statement fails.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_subscription_table(&transaction)?;
    create_debt_table(&transaction)?;
    create_profile_table(&transaction)?;
    seed_default_categories(&transaction)?;

    transaction.commit()?;

    Ok(())
}
