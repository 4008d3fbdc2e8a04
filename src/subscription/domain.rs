//! Core subscription domain types.

use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::{Error, budget::Timeframe, database_id::DatabaseId, user::UserID};

/// A recurring payment such as a streaming service or a utility bill.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: DatabaseId,
    pub user_id: UserID,
    pub name: String,
    /// The amount charged each billing cycle. Always positive.
    pub amount: f64,
    /// How often the subscription bills.
    pub frequency: Timeframe,
    /// The next date the subscription will charge.
    pub next_billing_date: Date,
    /// A free-text category name, e.g. "Entertainment".
    pub category: String,
    /// Whether the subscription is still running.
    pub active: bool,
}

/// The validated data needed to create a subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    pub user_id: UserID,
    pub name: String,
    pub amount: f64,
    pub frequency: Timeframe,
    pub next_billing_date: Date,
    pub category: String,
}

/// The raw strings submitted from the subscription creation form.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionFormData {
    pub name: String,
    pub amount: String,
    pub frequency: String,
    pub next_billing_date: String,
    pub category: String,
}

const DATE_INPUT_FORMAT: &[time::format_description::BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]");

impl SubscriptionFormData {
    /// Validate the form data into a [NewSubscription] owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [Error::EmptyField] if the name or category is blank,
    /// - [Error::InvalidAmount] if the amount is not a number greater than zero,
    /// - [Error::UnknownTimeframe] if the frequency is not one of the four known timeframes,
    /// - [Error::InvalidDateFormat] if the next billing date is not a valid YYYY-MM-DD date.
    pub fn to_new_subscription(&self, user_id: UserID) -> Result<NewSubscription, Error> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(Error::EmptyField("subscription name"));
        }

        let amount: f64 = self.amount.trim().parse().map_err(|_| Error::InvalidAmount)?;
        if amount <= 0.0 {
            return Err(Error::InvalidAmount);
        }

        let frequency = self.frequency.parse()?;

        let next_billing_date = Date::parse(self.next_billing_date.trim(), DATE_INPUT_FORMAT)
            .map_err(|_| Error::InvalidDateFormat(self.next_billing_date.clone()))?;

        let category = self.category.trim().to_owned();
        if category.is_empty() {
            return Err(Error::EmptyField("category"));
        }

        Ok(NewSubscription {
            user_id,
            name,
            amount,
            frequency,
            next_billing_date,
            category,
        })
    }
}
