//! Database persistence for subscriptions.

use rusqlite::{Connection, Row, types::Type};

use crate::{Error, database_id::DatabaseId, user::UserID};

use super::domain::{NewSubscription, Subscription};

/// Insert a new active subscription and return it with its generated ID.
///
/// # Errors
///
/// Returns:
/// - [Error::EmptyField] if the name is blank,
/// - [Error::InvalidAmount] if the amount is zero or negative,
/// - [Error::SqlError] if the insert fails.
pub fn create_subscription(
    new_subscription: NewSubscription,
    connection: &Connection,
) -> Result<Subscription, Error> {
    if new_subscription.name.trim().is_empty() {
        return Err(Error::EmptyField("subscription name"));
    }

    if new_subscription.amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    connection.execute(
        "INSERT INTO subscription (user_id, name, amount, frequency, next_billing_date, category, active)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1);",
        (
            new_subscription.user_id.as_i64(),
            &new_subscription.name,
            new_subscription.amount,
            new_subscription.frequency.as_str(),
            &new_subscription.next_billing_date,
            &new_subscription.category,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Subscription {
        id,
        user_id: new_subscription.user_id,
        name: new_subscription.name,
        amount: new_subscription.amount,
        frequency: new_subscription.frequency,
        next_billing_date: new_subscription.next_billing_date,
        category: new_subscription.category,
        active: true,
    })
}

/// Retrieve the subscription with the given ID if it belongs to `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such subscription or it belongs
/// to another user.
pub fn get_subscription(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Subscription, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, amount, frequency, next_billing_date, category, active
            FROM subscription
            WHERE id = ?1 AND user_id = ?2;",
        )?
        .query_row((id, user_id.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Retrieve all of the subscriptions of `user_id`, soonest billing first.
pub fn get_subscriptions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Subscription>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, amount, frequency, next_billing_date, category, active
            FROM subscription
            WHERE user_id = :user_id
            ORDER BY next_billing_date ASC, id ASC;",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_subscription| maybe_subscription.map_err(|error| error.into()))
        .collect()
}

/// Delete the subscription with the given ID if it belongs to `user_id`.
///
/// # Errors
///
/// Returns [Error::DeleteMissingSubscription] if no matching subscription
/// exists for the owner.
pub fn delete_subscription(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM subscription WHERE id = ?1 AND user_id = ?2;",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        Err(Error::DeleteMissingSubscription)
    } else {
        Ok(())
    }
}

/// Initialize the subscription table and indexes.
pub fn create_subscription_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS subscription (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            amount REAL NOT NULL,
            frequency TEXT NOT NULL,
            next_billing_date TEXT NOT NULL,
            category TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_subscription_user_id ON subscription(user_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Subscription, rusqlite::Error> {
    let raw_frequency: String = row.get(4)?;
    let frequency = raw_frequency.parse().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(error))
    })?;

    Ok(Subscription {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: row.get(2)?,
        amount: row.get(3)?,
        frequency,
        next_billing_date: row.get(5)?,
        category: row.get(6)?,
        active: row.get(7)?,
    })
}
