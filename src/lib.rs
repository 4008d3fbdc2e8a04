//! DhanJi is a web app for tracking personal finances in Indian Rupees:
//! transactions, budgets, subscriptions and debts.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod analytics;
mod app_state;
mod auth;
mod bills;
mod budget;
mod calendar;
mod category;
mod dashboard;
mod database_id;
mod db;
mod debt;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod profile;
mod routing;
mod subscription;
#[cfg(test)]
mod test_utils;
mod timezone;
mod transaction;
mod user;

pub use app_state::AppState;
pub use auth::{PasswordHash, ValidatedPassword};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use user::{User, UserID, create_user, get_user_by_email};

use crate::{
    alert::Alert,
    internal_server_error::{InternalServerError, render_internal_server_error},
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an incorrect email or password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The specified email address is already attached to another account.
    #[error("the email address is already in use")]
    EmailTaken,

    /// An empty or malformed string was used as an email address.
    #[error("the email address is invalid")]
    InvalidEmail,

    /// An empty string was used for a field that requires a value, e.g. a
    /// budget category or a subscription name.
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    /// A zero or negative amount was used where a positive amount is
    /// required, e.g. a transaction amount or a budget expense.
    #[error("the amount must be greater than zero")]
    InvalidAmount,

    /// A zero or negative limit was used to create a budget.
    ///
    /// Budget progress is the ratio of spent to limit, so a budget with a
    /// non-positive limit has no meaningful progress.
    #[error("the budget limit must be greater than zero")]
    InvalidBudgetLimit,

    /// A date string submitted via a form could not be parsed.
    #[error("could not parse date string \"{0}\"")]
    InvalidDateFormat(String),

    /// A transaction type string did not match any of the known types.
    #[error("\"{0}\" is not a valid transaction type")]
    UnknownTransactionType(String),

    /// A timeframe string did not match any of the known timeframes.
    #[error("\"{0}\" is not a valid timeframe")]
    UnknownTimeframe(String),

    /// A debt type string did not match any of the known debt types.
    #[error("\"{0}\" is not a valid debt type")]
    UnknownDebtType(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to update a budget that does not exist
    #[error("tried to update a budget that is not in the database")]
    UpdateMissingBudget,

    /// Tried to delete a budget that does not exist
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,

    /// Tried to delete a subscription that does not exist
    #[error("tried to delete a subscription that is not in the database")]
    DeleteMissingSubscription,

    /// Tried to delete a debt that does not exist
    #[error("tried to delete a debt that is not in the database")]
    DeleteMissingDebt,

    /// Tried to update a profile for a user that does not exist
    #[error("tried to update a profile that is not in the database")]
    UpdateMissingProfile,

    /// Tried to update the fields of an existing debt.
    ///
    /// Debts are immutable once created. The only supported changes are
    /// deleting the debt and creating a new one.
    #[error("editing debts is not supported")]
    DebtUpdateUnsupported,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::EmailTaken
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => {
                render_internal_server_error(InternalServerError {
                    description: "Invalid Timezone Settings",
                    fix: &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                })
            }
            Error::DatabaseLockError => render_internal_server_error(Default::default()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(Default::default())
            }
        }
    }
}

impl Error {
    pub(crate) fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Invalid Timezone Settings",
                    &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                ),
            )
                .into_response(),
            Error::InvalidAmount => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid amount",
                    "The amount must be greater than zero.",
                ),
            )
                .into_response(),
            Error::InvalidBudgetLimit => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid budget limit",
                    "The budget limit must be greater than zero.",
                ),
            )
                .into_response(),
            Error::InvalidDateFormat(date_string) => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid date",
                    &format!("Could not parse the date \"{date_string}\". Use the format YYYY-MM-DD."),
                ),
            )
                .into_response(),
            Error::UnknownTransactionType(type_string) => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid transaction type",
                    &format!(
                        "\"{type_string}\" is not a valid transaction type. \
                    Use income, expense, investment or saving."
                    ),
                ),
            )
                .into_response(),
            Error::UnknownTimeframe(timeframe_string) => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid timeframe",
                    &format!(
                        "\"{timeframe_string}\" is not a valid timeframe. \
                    Use daily, weekly, monthly or yearly."
                    ),
                ),
            )
                .into_response(),
            Error::UnknownDebtType(type_string) => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid debt type",
                    &format!(
                        "\"{type_string}\" is not a valid debt type. \
                    Use credit-card, loan, emi or other."
                    ),
                ),
            )
                .into_response(),
            Error::EmptyField(field) => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Missing field",
                    &format!("The {field} cannot be empty."),
                ),
            )
                .into_response(),
            Error::UpdateMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not update transaction",
                    "The transaction could not be found.",
                ),
            )
                .into_response(),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not delete transaction",
                    "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted.",
                ),
            )
                .into_response(),
            Error::UpdateMissingBudget => (
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not update budget",
                    "The budget could not be found.",
                ),
            )
                .into_response(),
            Error::DeleteMissingBudget => (
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not delete budget",
                    "The budget could not be found. \
                    Try refreshing the page to see if the budget has already been deleted.",
                ),
            )
                .into_response(),
            Error::DeleteMissingSubscription => (
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not delete subscription",
                    "The subscription could not be found. \
                    Try refreshing the page to see if the subscription has already been deleted.",
                ),
            )
                .into_response(),
            Error::DeleteMissingDebt => (
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not delete debt",
                    "The debt could not be found. \
                    Try refreshing the page to see if the debt has already been deleted.",
                ),
            )
                .into_response(),
            Error::UpdateMissingProfile => (
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not update profile",
                    "The profile could not be found.",
                ),
            )
                .into_response(),
            Error::DebtUpdateUnsupported => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::error(
                    "Debts cannot be edited",
                    "Editing an existing debt is not supported. \
                    Delete the debt and create a new one instead.",
                ),
            )
                .into_response(),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                ),
            )
                .into_response(),
        }
    }
}
