//! Core budget domain types and the progress calculation.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, database_id::DatabaseId, user::UserID};

/// How often a budget resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Timeframe {
    /// The lowercase identifier stored in the database and used in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// The capitalized label shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Yearly => "Yearly",
        }
    }

    /// All timeframes in the order they appear in form selects.
    pub const ALL: [Timeframe; 4] = [Self::Daily, Self::Weekly, Self::Monthly, Self::Yearly];
}

impl FromStr for Timeframe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(Error::UnknownTimeframe(other.to_string())),
        }
    }
}

impl Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A spending limit for one category over a timeframe, with a running total
/// of the money spent against it.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: DatabaseId,
    pub user_id: UserID,
    /// The category name the budget applies to.
    pub category: String,
    /// The spending limit. Always greater than zero.
    pub limit: f64,
    /// The amount spent so far.
    pub spent: f64,
    pub timeframe: Timeframe,
}

/// The validated data needed to create a budget.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub user_id: UserID,
    pub category: String,
    pub limit: f64,
    pub timeframe: Timeframe,
}

/// The raw strings submitted from the budget creation form.
#[derive(Debug, Serialize, Deserialize)]
pub struct BudgetFormData {
    pub category: String,
    pub limit: String,
    pub timeframe: String,
}

impl BudgetFormData {
    /// Validate the form data into a [NewBudget] owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [Error::EmptyField] if the category is blank,
    /// - [Error::InvalidBudgetLimit] if the limit is not a number greater than zero,
    /// - [Error::UnknownTimeframe] if the timeframe is not one of the four known timeframes.
    pub fn to_new_budget(&self, user_id: UserID) -> Result<NewBudget, Error> {
        let category = self.category.trim().to_owned();
        if category.is_empty() {
            return Err(Error::EmptyField("budget category"));
        }

        let limit: f64 = self
            .limit
            .trim()
            .parse()
            .map_err(|_| Error::InvalidBudgetLimit)?;

        if limit <= 0.0 {
            return Err(Error::InvalidBudgetLimit);
        }

        let timeframe = self.timeframe.parse()?;

        Ok(NewBudget {
            user_id,
            category,
            limit,
            timeframe,
        })
    }
}

/// The percentage of a budget used, rounded to the nearest whole percent and
/// capped at 100.
///
/// # Errors
///
/// Returns [Error::InvalidBudgetLimit] if `limit` is zero or negative, since
/// the ratio of spent to limit is meaningless without a positive limit.
pub fn budget_progress(spent: f64, limit: f64) -> Result<u8, Error> {
    if limit <= 0.0 {
        return Err(Error::InvalidBudgetLimit);
    }

    Ok((spent / limit * 100.0).round().clamp(0.0, 100.0) as u8)
}
