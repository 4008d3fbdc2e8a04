//! Database persistence for debts.

use rusqlite::{Connection, Row, types::Type};

use crate::{Error, database_id::DatabaseId, user::UserID};

use super::domain::{Debt, NewDebt};

/// Insert a new active debt and return it with its generated ID.
///
/// # Errors
///
/// Returns:
/// - [Error::EmptyField] if the name is blank,
/// - [Error::InvalidAmount] if the total is zero or negative or the remaining
///   amount is negative,
/// - [Error::SqlError] if the insert fails.
pub fn create_debt(new_debt: NewDebt, connection: &Connection) -> Result<Debt, Error> {
    if new_debt.name.trim().is_empty() {
        return Err(Error::EmptyField("debt name"));
    }

    if new_debt.total <= 0.0 || new_debt.remaining < 0.0 {
        return Err(Error::InvalidAmount);
    }

    connection.execute(
        "INSERT INTO debt (user_id, name, debt_type, total, remaining, interest_rate, minimum_payment, due_date, category, active)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1);",
        (
            new_debt.user_id.as_i64(),
            &new_debt.name,
            new_debt.debt_type.as_str(),
            new_debt.total,
            new_debt.remaining,
            new_debt.interest_rate,
            new_debt.minimum_payment,
            &new_debt.due_date,
            &new_debt.category,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Debt {
        id,
        user_id: new_debt.user_id,
        name: new_debt.name,
        debt_type: new_debt.debt_type,
        total: new_debt.total,
        remaining: new_debt.remaining,
        interest_rate: new_debt.interest_rate,
        minimum_payment: new_debt.minimum_payment,
        due_date: new_debt.due_date,
        category: new_debt.category,
        active: true,
    })
}

/// Retrieve the debt with the given ID if it belongs to `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such debt or it belongs to
/// another user.
pub fn get_debt(id: DatabaseId, user_id: UserID, connection: &Connection) -> Result<Debt, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, debt_type, total, remaining, interest_rate, minimum_payment, due_date, category, active
            FROM debt
            WHERE id = ?1 AND user_id = ?2;",
        )?
        .query_row((id, user_id.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Retrieve all of the debts of `user_id`, soonest due date first.
pub fn get_debts(user_id: UserID, connection: &Connection) -> Result<Vec<Debt>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, debt_type, total, remaining, interest_rate, minimum_payment, due_date, category, active
            FROM debt
            WHERE user_id = :user_id
            ORDER BY due_date ASC, id ASC;",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_debt| maybe_debt.map_err(|error| error.into()))
        .collect()
}

/// Delete the debt with the given ID if it belongs to `user_id`.
///
/// # Errors
///
/// Returns [Error::DeleteMissingDebt] if no matching debt exists for the
/// owner.
pub fn delete_debt(id: DatabaseId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM debt WHERE id = ?1 AND user_id = ?2;",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        Err(Error::DeleteMissingDebt)
    } else {
        Ok(())
    }
}

/// Initialize the debt table and indexes.
pub fn create_debt_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS debt (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            debt_type TEXT NOT NULL,
            total REAL NOT NULL,
            remaining REAL NOT NULL,
            interest_rate REAL NOT NULL DEFAULT 0,
            minimum_payment REAL NOT NULL DEFAULT 0,
            due_date TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'Debt',
            active INTEGER NOT NULL DEFAULT 1,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_debt_user_id ON debt(user_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Debt, rusqlite::Error> {
    let raw_debt_type: String = row.get(3)?;
    let debt_type = raw_debt_type.parse().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(error))
    })?;

    Ok(Debt {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: row.get(2)?,
        debt_type,
        total: row.get(4)?,
        remaining: row.get(5)?,
        interest_rate: row.get(6)?,
        minimum_payment: row.get(7)?,
        due_date: row.get(8)?,
        category: row.get(9)?,
        active: row.get(10)?,
    })
}

#[cfg(test)]
mod debt_db_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, PasswordHash,
        debt::domain::{DebtType, NewDebt},
        user::{UserID, create_user, create_user_table},
    };

    use super::{create_debt, create_debt_table, delete_debt, get_debt, get_debts};

    fn get_test_db_connection() -> (Connection, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        create_user_table(&connection).expect("Could not create user table");
        create_debt_table(&connection).expect("Could not create debt table");

        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .expect("Could not create test user");

        (connection, user.id)
    }

    fn new_debt(user_id: UserID, name: &str, due_date: time::Date) -> NewDebt {
        NewDebt {
            user_id,
            name: name.to_string(),
            debt_type: DebtType::Loan,
            total: 500_000.0,
            remaining: 320_000.0,
            interest_rate: 9.5,
            minimum_payment: 12_000.0,
            due_date,
            category: "Debt".to_string(),
        }
    }

    #[test]
    fn create_debt_starts_active() {
        let (connection, user_id) = get_test_db_connection();

        let debt = create_debt(new_debt(user_id, "Car loan", date!(2025 - 09 - 05)), &connection)
            .expect("Could not create debt");

        assert!(debt.id > 0);
        assert!(debt.active);
        assert_eq!(get_debt(debt.id, user_id, &connection), Ok(debt));
    }

    #[test]
    fn create_debt_rejects_non_positive_total() {
        let (connection, user_id) = get_test_db_connection();
        let mut debt = new_debt(user_id, "Car loan", date!(2025 - 09 - 05));
        debt.total = 0.0;

        assert_eq!(create_debt(debt, &connection), Err(Error::InvalidAmount));
    }

    #[test]
    fn get_debts_orders_by_due_date_and_hides_other_users() {
        let (connection, user_id) = get_test_db_connection();
        let later =
            create_debt(new_debt(user_id, "Car loan", date!(2025 - 09 - 20)), &connection).unwrap();
        let sooner = create_debt(
            new_debt(user_id, "Credit card", date!(2025 - 09 - 05)),
            &connection,
        )
        .unwrap();

        let other_user = create_user(
            "other@example.com",
            PasswordHash::new_unchecked("hunter3"),
            &connection,
        )
        .unwrap();
        create_debt(
            new_debt(other_user.id, "Bike loan", date!(2025 - 09 - 10)),
            &connection,
        )
        .unwrap();

        let debts = get_debts(user_id, &connection).unwrap();

        assert_eq!(debts, vec![sooner, later]);
    }

    #[test]
    fn delete_debt_succeeds() {
        let (connection, user_id) = get_test_db_connection();
        let debt =
            create_debt(new_debt(user_id, "Car loan", date!(2025 - 09 - 05)), &connection).unwrap();

        delete_debt(debt.id, user_id, &connection).expect("Could not delete debt");

        assert_eq!(get_debt(debt.id, user_id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_debt_fails_for_other_users_debt() {
        let (connection, user_id) = get_test_db_connection();
        let debt =
            create_debt(new_debt(user_id, "Car loan", date!(2025 - 09 - 05)), &connection).unwrap();

        let other_user = create_user(
            "other@example.com",
            PasswordHash::new_unchecked("hunter3"),
            &connection,
        )
        .unwrap();

        assert_eq!(
            delete_debt(debt.id, other_user.id, &connection),
            Err(Error::DeleteMissingDebt)
        );
    }
}
