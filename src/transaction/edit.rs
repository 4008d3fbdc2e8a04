//! Transaction editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{Category, get_categories},
    database_id::TransactionId,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, rupee_input_styles},
    navigation::NavBar,
    transaction::{
        create::{TransactionFormValues, transaction_form_fields},
        domain::{Transaction, TransactionFormData},
        get_transaction, update_transaction,
    },
    user::UserID,
};

/// The state needed for the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for updating a transaction.
#[derive(Debug, Clone)]
pub struct UpdateTransactionEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateTransactionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the transaction editing page.
pub async fn get_edit_transaction_page(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<EditTransactionPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, &transaction_id);
    let update_endpoint = endpoints::format_endpoint(endpoints::TRANSACTION, &transaction_id);

    match get_transaction(&transaction_id, user_id, &connection) {
        Ok(transaction) => {
            let amount = transaction.amount.to_string();
            let date = transaction.date.to_string();
            let values = TransactionFormValues {
                amount: &amount,
                transaction_type: transaction.transaction_type.as_str(),
                category: &transaction.category,
                description: &transaction.description,
                date: &date,
            };

            Ok(
                edit_transaction_view(&edit_endpoint, &update_endpoint, &values, &categories, "")
                    .into_response(),
            )
        }
        Err(error) => {
            let error_message = match error {
                Error::NotFound => "Transaction not found",
                _ => {
                    tracing::error!("Failed to retrieve transaction {transaction_id}: {error}");
                    "Failed to load transaction"
                }
            };

            let values = TransactionFormValues {
                amount: "",
                transaction_type: "",
                category: "",
                description: "",
                date: "",
            };

            Ok(edit_transaction_view(
                &edit_endpoint,
                &update_endpoint,
                &values,
                &categories,
                error_message,
            )
            .into_response())
        }
    }
}

/// Handle transaction update form submission.
pub async fn update_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<UpdateTransactionEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<TransactionFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let update_endpoint = endpoints::format_endpoint(endpoints::TRANSACTION, &transaction_id);

    let new_transaction = match form_data.to_new_transaction(user_id) {
        Ok(new_transaction) => new_transaction,
        Err(error) => {
            let categories = match get_categories(user_id, &connection) {
                Ok(categories) => categories,
                Err(error) => {
                    tracing::error!("Failed to retrieve categories: {error}");
                    return error.into_alert_response();
                }
            };
            let values = TransactionFormValues::from_form_data(&form_data);

            return edit_transaction_form_view(
                &update_endpoint,
                &values,
                &categories,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    let transaction = Transaction {
        id: transaction_id.clone(),
        user_id,
        amount: new_transaction.amount,
        transaction_type: new_transaction.transaction_type,
        category: new_transaction.category,
        description: new_transaction.description,
        date: new_transaction.date,
    };

    match update_transaction(&transaction, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingTransaction) => {
            Error::UpdateMissingTransaction.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating transaction {transaction_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_transaction_view(
    edit_endpoint: &str,
    update_endpoint: &str,
    values: &TransactionFormValues,
    categories: &[Category],
    error_message: &str,
) -> Markup {
    let nav_bar = NavBar::new(edit_endpoint).into_html();
    let form = edit_transaction_form_view(update_endpoint, values, categories, error_message);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Transaction", &[rupee_input_styles()], &content)
}

fn edit_transaction_form_view(
    update_endpoint: &str,
    values: &TransactionFormValues,
    categories: &[Category],
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-put=(update_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (transaction_form_fields(values, categories, error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Transaction" }
        }
    }
}
