//! Database persistence for budgets.

use rusqlite::{Connection, Row, types::Type};

use crate::{Error, database_id::DatabaseId, user::UserID};

use super::domain::{Budget, NewBudget};

/// Insert a new budget with nothing spent and return it with its generated ID.
///
/// # Errors
///
/// Returns:
/// - [Error::EmptyField] if the category is blank,
/// - [Error::InvalidBudgetLimit] if the limit is zero or negative,
/// - [Error::SqlError] if the insert fails.
pub fn create_budget(new_budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    if new_budget.category.trim().is_empty() {
        return Err(Error::EmptyField("budget category"));
    }

    if new_budget.limit <= 0.0 {
        return Err(Error::InvalidBudgetLimit);
    }

    connection.execute(
        "INSERT INTO budget (user_id, category, limit_amount, spent, timeframe)
        VALUES (?1, ?2, ?3, 0, ?4);",
        (
            new_budget.user_id.as_i64(),
            &new_budget.category,
            new_budget.limit,
            new_budget.timeframe.as_str(),
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Budget {
        id,
        user_id: new_budget.user_id,
        category: new_budget.category,
        limit: new_budget.limit,
        spent: 0.0,
        timeframe: new_budget.timeframe,
    })
}

/// Retrieve the budget with the given ID if it belongs to `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such budget or it belongs to
/// another user.
pub fn get_budget(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category, limit_amount, spent, timeframe FROM budget
            WHERE id = ?1 AND user_id = ?2;",
        )?
        .query_row((id, user_id.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Retrieve all of the budgets of `user_id`, ordered by category name.
pub fn get_budgets(user_id: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category, limit_amount, spent, timeframe FROM budget
            WHERE user_id = :user_id
            ORDER BY category ASC;",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Overwrite the spent amount of a budget. The category, limit and timeframe
/// of an existing budget never change.
///
/// # Errors
///
/// Returns [Error::UpdateMissingBudget] if no matching budget exists for the
/// owner.
pub fn update_budget_spent(
    id: DatabaseId,
    user_id: UserID,
    spent: f64,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE budget SET spent = ?1 WHERE id = ?2 AND user_id = ?3;",
        (spent, id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        Err(Error::UpdateMissingBudget)
    } else {
        Ok(())
    }
}

/// Add a positive expense amount to a budget's spent total and return the
/// updated budget.
///
/// # Errors
///
/// Returns:
/// - [Error::InvalidAmount] if `amount` is zero or negative,
/// - [Error::UpdateMissingBudget] if no matching budget exists for the owner.
pub fn add_budget_expense(
    id: DatabaseId,
    user_id: UserID,
    amount: f64,
    connection: &Connection,
) -> Result<Budget, Error> {
    if amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    let rows_affected = connection.execute(
        "UPDATE budget SET spent = spent + ?1 WHERE id = ?2 AND user_id = ?3;",
        (amount, id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBudget);
    }

    get_budget(id, user_id, connection)
}

/// Delete the budget with the given ID if it belongs to `user_id`.
///
/// # Errors
///
/// Returns [Error::DeleteMissingBudget] if no matching budget exists for the
/// owner.
pub fn delete_budget(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2;",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        Err(Error::DeleteMissingBudget)
    } else {
        Ok(())
    }
}

/// Initialize the budget table and indexes.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category TEXT NOT NULL,
            limit_amount REAL NOT NULL,
            spent REAL NOT NULL DEFAULT 0,
            timeframe TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_budget_user_id ON budget(user_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let raw_timeframe: String = row.get(5)?;
    let timeframe = raw_timeframe.parse().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(error))
    })?;

    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category: row.get(2)?,
        limit: row.get(3)?,
        spent: row.get(4)?,
        timeframe,
    })
}
