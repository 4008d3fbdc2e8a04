//! Aliases for the ID types used in the database.

/// Alias for the integer row IDs used by budgets, subscriptions and debts.
pub type DatabaseId = i64;

/// Alias for transaction IDs, which are UUID strings.
pub type TransactionId = String;
