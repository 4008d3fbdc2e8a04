//! Database persistence for transactions.

use rusqlite::{Connection, Row, types::Type};
use uuid::Uuid;

use crate::{
    Error,
    database_id::TransactionId,
    user::UserID,
};

use super::domain::{NewTransaction, Transaction};

/// Insert a new transaction and return it with its generated UUID.
///
/// # Errors
///
/// Returns:
/// - [Error::InvalidAmount] if the amount is zero or negative,
/// - [Error::EmptyField] if the category is blank,
/// - [Error::SqlError] if the insert fails.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if new_transaction.amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    if new_transaction.category.trim().is_empty() {
        return Err(Error::EmptyField("category"));
    }

    let id = Uuid::new_v4().to_string();

    connection.execute(
        "INSERT INTO transactions (id, user_id, amount, type, category, description, date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        (
            &id,
            new_transaction.user_id.as_i64(),
            new_transaction.amount,
            new_transaction.transaction_type.as_str(),
            &new_transaction.category,
            &new_transaction.description,
            &new_transaction.date,
        ),
    )?;

    Ok(Transaction {
        id,
        user_id: new_transaction.user_id,
        amount: new_transaction.amount,
        transaction_type: new_transaction.transaction_type,
        category: new_transaction.category,
        description: new_transaction.description,
        date: new_transaction.date,
    })
}

/// Retrieve the transaction with the given ID if it belongs to `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such transaction or it belongs to
/// another user.
pub fn get_transaction(
    id: &TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, user_id, amount, type, category, description, date FROM transactions
            WHERE id = ?1 AND user_id = ?2;",
        )?
        .query_row((id, user_id.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Retrieve all of the transactions of `user_id`, newest first. Transactions
/// on the same date are ordered by descending ID so the order is stable
/// across requests.
pub fn get_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, amount, type, category, description, date FROM transactions
            WHERE user_id = :user_id
            ORDER BY date DESC, id DESC;",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Overwrite the fields of the transaction with `transaction.id`, scoped to
/// its owner.
///
/// # Errors
///
/// Returns:
/// - [Error::InvalidAmount] if the amount is zero or negative,
/// - [Error::EmptyField] if the category is blank,
/// - [Error::UpdateMissingTransaction] if no matching transaction exists for
///   the owner.
pub fn update_transaction(transaction: &Transaction, connection: &Connection) -> Result<(), Error> {
    if transaction.amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    if transaction.category.trim().is_empty() {
        return Err(Error::EmptyField("category"));
    }

    let rows_affected = connection.execute(
        "UPDATE transactions
        SET amount = ?1, type = ?2, category = ?3, description = ?4, date = ?5
        WHERE id = ?6 AND user_id = ?7;",
        (
            transaction.amount,
            transaction.transaction_type.as_str(),
            &transaction.category,
            &transaction.description,
            &transaction.date,
            &transaction.id,
            transaction.user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        Err(Error::UpdateMissingTransaction)
    } else {
        Ok(())
    }
}

/// Delete the transaction with the given ID if it belongs to `user_id`.
///
/// # Errors
///
/// Returns [Error::DeleteMissingTransaction] if no matching transaction
/// exists for the owner.
pub fn delete_transaction(
    id: &TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM transactions WHERE id = ?1 AND user_id = ?2;",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        Err(Error::DeleteMissingTransaction)
    } else {
        Ok(())
    }
}

/// Initialize the transactions table and indexes.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS transactions (
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            type TEXT NOT NULL,
            category TEXT NOT NULL,
            description TEXT NOT NULL,
            date TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_type: String = row.get(3)?;
    let transaction_type = raw_type.parse().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(error))
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        amount: row.get(2)?,
        transaction_type,
        category: row.get(4)?,
        description: row.get(5)?,
        date: row.get(6)?,
    })
}
