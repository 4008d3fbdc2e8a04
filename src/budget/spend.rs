//! Endpoint for recording an expense against a budget.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    budget::add_budget_expense,
    database_id::DatabaseId,
    endpoints,
    user::UserID,
};

/// The state needed for recording a budget expense.
#[derive(Debug, Clone)]
pub struct SpendBudgetEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SpendBudgetEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw amount submitted from an inline budget expense form.
#[derive(Debug, Deserialize)]
pub struct SpendFormData {
    pub amount: String,
}

/// Handle an inline expense form submission by bumping the budget's spent
/// total and redirecting back to the budgets page.
pub async fn add_budget_expense_endpoint(
    Path(budget_id): Path<DatabaseId>,
    State(state): State<SpendBudgetEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<SpendFormData>,
) -> Response {
    let amount: f64 = match form_data.amount.trim().parse() {
        Ok(amount) => amount,
        Err(_) => return Error::InvalidAmount.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match add_budget_expense(budget_id, user_id, amount, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::InvalidAmount | Error::UpdateMissingBudget)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while adding an expense to budget {budget_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
