//! Database persistence for profiles.

use rusqlite::{Connection, Row};

use crate::{Error, user::UserID};

use super::domain::{Profile, Theme};

/// Retrieve the profile of `user_id`, inserting a default profile first if
/// the user has never saved one.
pub fn get_or_create_profile(user_id: UserID, connection: &Connection) -> Result<Profile, Error> {
    let existing = connection
        .prepare(
            "SELECT user_id, name, avatar, theme, currency, email_notifications, budget_reminders
            FROM profile
            WHERE user_id = ?1;",
        )?
        .query_row([user_id.as_i64()], map_row);

    match existing {
        Ok(profile) => Ok(profile),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            let profile = Profile::default_for(user_id);
            insert_profile(&profile, connection)?;

            Ok(profile)
        }
        Err(error) => Err(error.into()),
    }
}

/// Overwrite the stored profile of `profile.user_id`.
///
/// # Errors
///
/// Returns [Error::UpdateMissingProfile] if the user has no stored profile,
/// e.g. because the user was deleted.
pub fn update_profile(profile: &Profile, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE profile
        SET name = ?2, avatar = ?3, theme = ?4, currency = ?5,
            email_notifications = ?6, budget_reminders = ?7
        WHERE user_id = ?1;",
        (
            profile.user_id.as_i64(),
            &profile.name,
            &profile.avatar,
            profile.theme.as_str(),
            &profile.currency,
            profile.email_notifications,
            profile.budget_reminders,
        ),
    )?;

    if rows_affected == 0 {
        Err(Error::UpdateMissingProfile)
    } else {
        Ok(())
    }
}

fn insert_profile(profile: &Profile, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO profile (user_id, name, avatar, theme, currency, email_notifications, budget_reminders)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        (
            profile.user_id.as_i64(),
            &profile.name,
            &profile.avatar,
            profile.theme.as_str(),
            &profile.currency,
            profile.email_notifications,
            profile.budget_reminders,
        ),
    )?;

    Ok(())
}

/// Initialize the profile table.
pub fn create_profile_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS profile (
            user_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL DEFAULT '',
            avatar TEXT NOT NULL DEFAULT '',
            theme TEXT NOT NULL DEFAULT 'system',
            currency TEXT NOT NULL DEFAULT 'INR',
            email_notifications INTEGER NOT NULL DEFAULT 1,
            budget_reminders INTEGER NOT NULL DEFAULT 1,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Profile, rusqlite::Error> {
    let raw_theme: String = row.get(3)?;

    Ok(Profile {
        user_id: UserID::new(row.get(0)?),
        name: row.get(1)?,
        avatar: row.get(2)?,
        theme: Theme::parse_or_default(&raw_theme),
        currency: row.get(4)?,
        email_notifications: row.get(5)?,
        budget_reminders: row.get(6)?,
    })
}

#[cfg(test)]
mod profile_db_tests {
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash,
        profile::domain::{Profile, Theme},
        user::{UserID, create_user, create_user_table},
    };

    use super::{create_profile_table, get_or_create_profile, update_profile};

    fn get_test_db_connection() -> (Connection, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        create_user_table(&connection).expect("Could not create user table");
        create_profile_table(&connection).expect("Could not create profile table");

        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .expect("Could not create test user");

        (connection, user.id)
    }

    #[test]
    fn first_access_creates_default_profile() {
        let (connection, user_id) = get_test_db_connection();

        let profile =
            get_or_create_profile(user_id, &connection).expect("Could not get profile");

        assert_eq!(profile, Profile::default_for(user_id));

        // The default profile is persisted, not recreated on each call.
        let row_count: i64 = connection
            .query_row("SELECT COUNT(user_id) FROM profile;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(row_count, 1);
    }

    #[test]
    fn update_profile_persists_changes() {
        let (connection, user_id) = get_test_db_connection();
        get_or_create_profile(user_id, &connection).unwrap();

        let updated = Profile {
            user_id,
            name: "Priya".to_string(),
            avatar: "🪷".to_string(),
            theme: Theme::Dark,
            currency: "INR".to_string(),
            email_notifications: false,
            budget_reminders: true,
        };
        update_profile(&updated, &connection).expect("Could not update profile");

        assert_eq!(get_or_create_profile(user_id, &connection), Ok(updated));
    }

    #[test]
    fn update_profile_fails_without_a_stored_profile() {
        let (connection, user_id) = get_test_db_connection();

        let profile = Profile::default_for(user_id);

        assert_eq!(
            update_profile(&profile, &connection),
            Err(Error::UpdateMissingProfile)
        );
    }
}
