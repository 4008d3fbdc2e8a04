//! Core debt domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::{Error, database_id::DatabaseId, user::UserID};

/// The kind of debt being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebtType {
    CreditCard,
    Loan,
    Emi,
    Other,
}

impl DebtType {
    /// All debt types in display order.
    pub const ALL: [DebtType; 4] = [
        DebtType::CreditCard,
        DebtType::Loan,
        DebtType::Emi,
        DebtType::Other,
    ];

    /// The identifier stored in the database and submitted by forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtType::CreditCard => "credit-card",
            DebtType::Loan => "loan",
            DebtType::Emi => "emi",
            DebtType::Other => "other",
        }
    }

    /// The human readable name shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            DebtType::CreditCard => "Credit Card",
            DebtType::Loan => "Loan",
            DebtType::Emi => "EMI",
            DebtType::Other => "Other",
        }
    }
}

impl FromStr for DebtType {
    type Err = Error;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string {
            "credit-card" => Ok(DebtType::CreditCard),
            "loan" => Ok(DebtType::Loan),
            "emi" => Ok(DebtType::Emi),
            "other" => Ok(DebtType::Other),
            _ => Err(Error::UnknownDebtType(string.to_owned())),
        }
    }
}

impl Display for DebtType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An outstanding debt such as a credit card balance or a loan.
#[derive(Debug, Clone, PartialEq)]
pub struct Debt {
    pub id: DatabaseId,
    pub user_id: UserID,
    pub name: String,
    pub debt_type: DebtType,
    /// The original amount borrowed. Always positive.
    pub total: f64,
    /// The amount still owed. Never negative.
    pub remaining: f64,
    /// Annual interest rate as a percentage, e.g. 12.5.
    pub interest_rate: f64,
    /// The minimum amount due each payment cycle.
    pub minimum_payment: f64,
    /// The date the next payment is due.
    pub due_date: Date,
    pub category: String,
    pub active: bool,
}

/// The validated data needed to create a debt.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDebt {
    pub user_id: UserID,
    pub name: String,
    pub debt_type: DebtType,
    pub total: f64,
    pub remaining: f64,
    pub interest_rate: f64,
    pub minimum_payment: f64,
    pub due_date: Date,
    pub category: String,
}

/// The raw strings submitted from the debt creation form.
#[derive(Debug, Serialize, Deserialize)]
pub struct DebtFormData {
    pub name: String,
    pub debt_type: String,
    pub total: String,
    pub remaining: String,
    pub interest_rate: String,
    pub minimum_payment: String,
    pub due_date: String,
    pub category: String,
}

const DATE_INPUT_FORMAT: &[time::format_description::BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]");

impl DebtFormData {
    /// Validate the form data into a [NewDebt] owned by `user_id`.
    ///
    /// A blank category defaults to "Debt". A blank interest rate defaults to
    /// zero.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [Error::EmptyField] if the name is blank,
    /// - [Error::UnknownDebtType] if the debt type is not one of the four known types,
    /// - [Error::InvalidAmount] if the total is not greater than zero, or the
    ///   remaining or minimum payment amounts are negative or not numbers,
    /// - [Error::InvalidDateFormat] if the due date is not a valid YYYY-MM-DD date.
    pub fn to_new_debt(&self, user_id: UserID) -> Result<NewDebt, Error> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(Error::EmptyField("debt name"));
        }

        let debt_type = self.debt_type.parse()?;

        let total: f64 = self.total.trim().parse().map_err(|_| Error::InvalidAmount)?;
        if total <= 0.0 {
            return Err(Error::InvalidAmount);
        }

        let remaining: f64 = self
            .remaining
            .trim()
            .parse()
            .map_err(|_| Error::InvalidAmount)?;
        if remaining < 0.0 {
            return Err(Error::InvalidAmount);
        }

        let interest_rate = if self.interest_rate.trim().is_empty() {
            0.0
        } else {
            self.interest_rate
                .trim()
                .parse()
                .map_err(|_| Error::InvalidAmount)?
        };

        let minimum_payment: f64 = self
            .minimum_payment
            .trim()
            .parse()
            .map_err(|_| Error::InvalidAmount)?;
        if minimum_payment < 0.0 {
            return Err(Error::InvalidAmount);
        }

        let due_date = Date::parse(self.due_date.trim(), DATE_INPUT_FORMAT)
            .map_err(|_| Error::InvalidDateFormat(self.due_date.clone()))?;

        let category = match self.category.trim() {
            "" => "Debt".to_owned(),
            category => category.to_owned(),
        };

        Ok(NewDebt {
            user_id,
            name,
            debt_type,
            total,
            remaining,
            interest_rate,
            minimum_payment,
            due_date,
            category,
        })
    }
}

/// The percentage of a debt that has been paid off, as a whole number
/// between zero and one hundred.
///
/// A debt with a non-positive total reports zero progress.
pub fn payment_progress(total: f64, remaining: f64) -> u8 {
    if total <= 0.0 {
        return 0;
    }

    ((total - remaining) / total * 100.0).round().clamp(0.0, 100.0) as u8
}
