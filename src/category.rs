//! Spending categories and the colors and icons used to render them.
//!
//! Categories are global (seeded at startup, no owner) or belong to a single
//! user. Transactions store the category as plain text, so a category row
//! only decorates the UI with a color swatch and an icon.

use rusqlite::{Connection, Row};

use crate::{Error, database_id::DatabaseId, user::UserID};

/// The color used for transactions whose category has no matching row.
pub const FALLBACK_CATEGORY_COLOR: &str = "#9CA3AF";

/// The icon used for transactions whose category has no matching row.
pub const FALLBACK_CATEGORY_ICON: &str = "🏷️";

/// The categories seeded into a fresh database, available to all users.
const DEFAULT_CATEGORIES: [(&str, &str, &str); 12] = [
    ("Bills & Utilities", "#EF4444", "🧾"),
    ("Education", "#06B6D4", "📚"),
    ("Entertainment", "#8B5CF6", "🎬"),
    ("Food & Dining", "#F59E0B", "🍽️"),
    ("Groceries", "#84CC16", "🛒"),
    ("Health", "#10B981", "💊"),
    ("Investments", "#14B8A6", "📈"),
    ("Rent", "#6366F1", "🏠"),
    ("Salary", "#22C55E", "💼"),
    ("Shopping", "#EC4899", "🛍️"),
    ("Transport", "#3B82F6", "🚌"),
    ("Travel", "#F97316", "✈️"),
];

/// A named spending category with a display color and icon.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: DatabaseId,
    pub name: String,
    /// A hex color code such as "#F59E0B".
    pub color: String,
    /// A short decoration shown next to the name, usually an emoji.
    pub icon: String,
    /// The owner, or `None` for the seeded global categories.
    pub user_id: Option<UserID>,
}

/// Create a category owned by `user_id` and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::EmptyField] if `name` is blank, or [Error::SqlError] if
/// the insert fails.
pub fn create_category(
    name: &str,
    color: &str,
    icon: &str,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyField("category name"));
    }

    connection.execute(
        "INSERT INTO category (name, color, icon, user_id) VALUES (?1, ?2, ?3, ?4);",
        (name, color, icon, user_id.as_i64()),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name: name.to_owned(),
        color: color.to_owned(),
        icon: icon.to_owned(),
        user_id: Some(user_id),
    })
}

/// Retrieve the global categories plus the ones owned by `user_id`, ordered
/// alphabetically by name.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, color, icon, user_id FROM category
            WHERE user_id IS NULL OR user_id = :user_id
            ORDER BY name ASC;",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Look up the display color for a category name, falling back to a neutral
/// gray for names without a matching category row.
pub fn category_color<'a>(categories: &'a [Category], name: &str) -> &'a str {
    categories
        .iter()
        .find(|category| category.name == name)
        .map(|category| category.color.as_str())
        .unwrap_or(FALLBACK_CATEGORY_COLOR)
}

/// Look up the display icon for a category name, falling back to a generic
/// label icon for names without a matching category row.
pub fn category_icon<'a>(categories: &'a [Category], name: &str) -> &'a str {
    categories
        .iter()
        .find(|category| category.name == name)
        .map(|category| category.icon.as_str())
        .unwrap_or(FALLBACK_CATEGORY_ICON)
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            icon TEXT NOT NULL,
            user_id INTEGER,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_id ON category(user_id);",
    )?;

    Ok(())
}

/// Insert the default global categories if the table has none.
pub fn seed_default_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let global_count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM category WHERE user_id IS NULL;",
        [],
        |row| row.get(0),
    )?;

    if global_count > 0 {
        return Ok(());
    }

    for (name, color, icon) in DEFAULT_CATEGORIES {
        connection.execute(
            "INSERT INTO category (name, color, icon, user_id) VALUES (?1, ?2, ?3, NULL);",
            (name, color, icon),
        )?;
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_user_id: Option<i64> = row.get(4)?;

    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        icon: row.get(3)?,
        user_id: raw_user_id.map(UserID::new),
    })
}
