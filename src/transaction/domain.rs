//! Core transaction domain types and aggregation helpers.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::{Error, database_id::TransactionId, user::UserID};

/// The direction and purpose of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in, e.g. salary or interest.
    Income,
    /// Money going out on goods and services.
    Expense,
    /// Money put into assets such as stocks or mutual funds.
    Investment,
    /// Money set aside, e.g. into a savings account or emergency fund.
    Saving,
}

impl TransactionType {
    /// The lowercase identifier stored in the database and used in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Investment => "investment",
            Self::Saving => "saving",
        }
    }

    /// The capitalized label shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
            Self::Investment => "Investment",
            Self::Saving => "Saving",
        }
    }

    /// All transaction types in the order they appear in form selects.
    pub const ALL: [TransactionType; 4] = [
        Self::Income,
        Self::Expense,
        Self::Investment,
        Self::Saving,
    ];
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "investment" => Ok(Self::Investment),
            "saving" => Ok(Self::Saving),
            other => Err(Error::UnknownTransactionType(other.to_string())),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single movement of money belonging to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// A UUID string that identifies the transaction.
    pub id: TransactionId,
    /// The user who recorded the transaction.
    pub user_id: UserID,
    /// The amount of money moved. Always positive, the direction is given by
    /// the transaction type.
    pub amount: f64,
    pub transaction_type: TransactionType,
    /// A free-text category name, e.g. "Groceries".
    pub category: String,
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
}

/// The validated data needed to create or update a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub user_id: UserID,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub category: String,
    pub description: String,
    pub date: Date,
}

/// The raw strings submitted from the transaction create and edit forms.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionFormData {
    pub amount: String,
    pub transaction_type: String,
    pub category: String,
    pub description: String,
    pub date: String,
}

const DATE_INPUT_FORMAT: &[time::format_description::BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]");

impl TransactionFormData {
    /// Validate the form data into a [NewTransaction] owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [Error::InvalidAmount] if the amount is not a number greater than zero,
    /// - [Error::UnknownTransactionType] if the type is not one of the four known types,
    /// - [Error::EmptyField] if the category is blank,
    /// - [Error::InvalidDateFormat] if the date is not a valid YYYY-MM-DD date.
    pub fn to_new_transaction(&self, user_id: UserID) -> Result<NewTransaction, Error> {
        let amount: f64 = self.amount.trim().parse().map_err(|_| Error::InvalidAmount)?;

        if amount <= 0.0 {
            return Err(Error::InvalidAmount);
        }

        let transaction_type = self.transaction_type.parse()?;

        let category = self.category.trim().to_owned();
        if category.is_empty() {
            return Err(Error::EmptyField("category"));
        }

        let date = Date::parse(self.date.trim(), DATE_INPUT_FORMAT)
            .map_err(|_| Error::InvalidDateFormat(self.date.clone()))?;

        Ok(NewTransaction {
            user_id,
            amount,
            transaction_type,
            category,
            description: self.description.trim().to_owned(),
            date,
        })
    }
}

/// Sort transactions from newest to oldest, breaking date ties by comparing
/// IDs in descending lexicographic order so equal dates still sort the same
/// way on every request.
pub fn sort_by_recency(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
}

/// The sum of transaction amounts for each transaction type.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TypeTotals {
    pub income: f64,
    pub expense: f64,
    pub investment: f64,
    pub saving: f64,
}

impl TypeTotals {
    /// Income minus expenses.
    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}

/// Sum the amounts of `transactions` per transaction type.
pub fn totals_by_type(transactions: &[Transaction]) -> TypeTotals {
    let mut totals = TypeTotals::default();

    for transaction in transactions {
        match transaction.transaction_type {
            TransactionType::Income => totals.income += transaction.amount,
            TransactionType::Expense => totals.expense += transaction.amount,
            TransactionType::Investment => totals.investment += transaction.amount,
            TransactionType::Saving => totals.saving += transaction.amount,
        }
    }

    totals
}



#[cfg(test)]
mod aggregation_tests {
    use time::macros::date;

    use crate::user::UserID;

    use super::{Transaction, TransactionType, sort_by_recency, totals_by_type};

    fn transaction(
        id: &str,
        amount: f64,
        transaction_type: TransactionType,
        date: time::Date,
    ) -> Transaction {
        Transaction {
            id: id.to_string(),
            user_id: UserID::new(1),
            amount,
            transaction_type,
            category: "Misc".to_string(),
            description: String::new(),
            date,
        }
    }

    #[test]
    fn sorts_newest_first() {
        let mut transactions = vec![
            transaction("1", 10.0, TransactionType::Expense, date!(2025 - 08 - 01)),
            transaction("2", 10.0, TransactionType::Expense, date!(2025 - 08 - 20)),
            transaction("3", 10.0, TransactionType::Expense, date!(2025 - 08 - 10)),
        ];

        sort_by_recency(&mut transactions);

        let ids: Vec<&str> = transactions
            .iter()
            .map(|transaction| transaction.id.as_str())
            .collect();
        assert_eq!(ids, ["2", "3", "1"]);
    }

    #[test]
    fn breaks_date_ties_by_descending_id() {
        let same_day = date!(2025 - 08 - 14);
        let mut transactions = vec![
            transaction("a", 10.0, TransactionType::Expense, same_day),
            transaction("b", 10.0, TransactionType::Expense, same_day),
        ];

        sort_by_recency(&mut transactions);

        assert_eq!(transactions[0].id, "b");
        assert_eq!(transactions[1].id, "a");
    }

    #[test]
    fn totals_cover_all_four_types() {
        let day = date!(2025 - 08 - 14);
        let transactions = vec![
            transaction("1", 1000.25, TransactionType::Income, day),
            transaction("2", 250.5, TransactionType::Expense, day),
            transaction("3", 99.75, TransactionType::Expense, day),
            transaction("4", 500.0, TransactionType::Investment, day),
            transaction("5", 300.0, TransactionType::Saving, day),
        ];

        let totals = totals_by_type(&transactions);

        assert_eq!(totals.income, 1000.25);
        assert_eq!(totals.expense, 350.25);
        assert_eq!(totals.investment, 500.0);
        assert_eq!(totals.saving, 300.0);
        assert_eq!(totals.net(), 650.0);
    }

    #[test]
    fn totals_do_not_depend_on_order() {
        let day = date!(2025 - 08 - 14);
        let mut transactions = vec![
            transaction("1", 1000.25, TransactionType::Income, day),
            transaction("2", 250.5, TransactionType::Expense, day),
            transaction("3", 99.75, TransactionType::Expense, day),
            transaction("4", 500.0, TransactionType::Investment, day),
            transaction("5", 300.0, TransactionType::Saving, day),
        ];

        let totals = totals_by_type(&transactions);

        transactions.reverse();
        assert_eq!(totals, totals_by_type(&transactions));

        transactions.rotate_left(2);
        assert_eq!(totals, totals_by_type(&transactions));
    }
}
