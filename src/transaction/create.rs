//! Transaction creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    category::{Category, get_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        rupee_input_styles,
    },
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::{
        create_transaction,
        domain::{TransactionFormData, TransactionType},
    },
    user::UserID,
};

/// The state needed for the new transaction page.
#[derive(Debug, Clone)]
pub struct NewTransactionPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for NewTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The state needed for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw values used to pre-fill the transaction form.
pub(super) struct TransactionFormValues<'a> {
    pub amount: &'a str,
    pub transaction_type: &'a str,
    pub category: &'a str,
    pub description: &'a str,
    pub date: &'a str,
}

impl TransactionFormValues<'_> {
    pub(super) fn from_form_data(form_data: &TransactionFormData) -> TransactionFormValues<'_> {
        TransactionFormValues {
            amount: &form_data.amount,
            transaction_type: &form_data.transaction_type,
            category: &form_data.category,
            description: &form_data.description,
            date: &form_data.date,
        }
    }
}

/// The input fields shared by the create and edit transaction forms.
pub(super) fn transaction_form_fields(
    values: &TransactionFormValues,
    categories: &[Category],
    error_message: &str,
) -> Markup {
    html! {
        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            div class="input-wrapper w-full"
            {
                input
                    id="amount"
                    type="number"
                    name="amount"
                    min="0.01"
                    step="0.01"
                    placeholder="0.00"
                    value=(values.amount)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label for="transaction_type" class=(FORM_LABEL_STYLE) { "Type" }

            select
                id="transaction_type"
                name="transaction_type"
                required
                class=(FORM_TEXT_INPUT_STYLE)
            {
                @for transaction_type in TransactionType::ALL {
                    option
                        value=(transaction_type.as_str())
                        selected[transaction_type.as_str() == values.transaction_type]
                    {
                        (transaction_type.label())
                    }
                }
            }
        }

        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            input
                id="category"
                type="text"
                name="category"
                list="category-options"
                placeholder="Groceries"
                value=(values.category)
                required
                class=(FORM_TEXT_INPUT_STYLE);

            datalist id="category-options"
            {
                @for category in categories {
                    option value=(category.name) {}
                }
            }
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                id="description"
                type="text"
                name="description"
                placeholder="Weekly grocery shop"
                value=(values.description)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                id="date"
                type="date"
                name="date"
                value=(values.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        @if !error_message.is_empty() {
            p class="text-red-600 dark:text-red-400"
            {
                (error_message)
            }
        }
    }
}

/// Render the transaction creation page.
pub async fn get_new_transaction_page(
    State(state): State<NewTransactionPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let today = match get_local_offset(&state.local_timezone) {
        Some(offset) => OffsetDateTime::now_utc().to_offset(offset).date(),
        None => {
            return Err(Error::InvalidTimezoneError(state.local_timezone.clone()));
        }
    };

    let today_string = today.to_string();
    let values = TransactionFormValues {
        amount: "",
        transaction_type: TransactionType::Expense.as_str(),
        category: "",
        description: "",
        date: &today_string,
    };

    Ok(new_transaction_view(&values, &categories, "").into_response())
}

/// Handle transaction creation form submission.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionEndpointState>,
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

    let categories = match get_categories(user_id, &connection) {
        Ok(categories) => categories,
        Err(error) => {
            tracing::error!("Failed to retrieve categories: {error}");
            return error.into_alert_response();
        }
    };

    let new_transaction = match form_data.to_new_transaction(user_id) {
        Ok(new_transaction) => new_transaction,
        Err(error) => {
            let values = TransactionFormValues::from_form_data(&form_data);

            return new_transaction_form_view(&values, &categories, &format!("Error: {error}"))
                .into_response();
        }
    };

    match create_transaction(new_transaction, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a transaction: {error}");

            error.into_alert_response()
        }
    }
}

fn new_transaction_view(
    values: &TransactionFormValues,
    categories: &[Category],
    error_message: &str,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let form = new_transaction_form_view(values, categories, error_message);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("New Transaction", &[rupee_input_styles()], &content)
}

fn new_transaction_form_view(
    values: &TransactionFormValues,
    categories: &[Category],
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::TRANSACTIONS_API)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (transaction_form_fields(values, categories, error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Transaction" }
        }
    }
}

#[cfg(test)]
mod new_transaction_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        PasswordHash, endpoints,
        category::{create_category_table, seed_default_categories},
        test_utils::{
            assert_content_type, assert_form_input, assert_form_submit_button_with_text,
            assert_hx_endpoint, assert_valid_html, must_get_form, parse_html_document,
        },
        transaction::create_transaction_table,
        user::{UserID, create_user, create_user_table},
    };

    use super::{NewTransactionPageState, get_new_transaction_page};

    fn get_page_state() -> (NewTransactionPageState, UserID) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");
        create_category_table(&connection).expect("Could not create category table");
        create_transaction_table(&connection).expect("Could not create transaction table");
        seed_default_categories(&connection).expect("Could not seed categories");

        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .expect("Could not create test user");

        (
            NewTransactionPageState {
                db_connection: Arc::new(Mutex::new(connection)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn render_page() {
        let (state, user_id) = get_page_state();

        let response = get_new_transaction_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "category", "text");
        assert_form_input(&form, "date", "date");
        assert_form_submit_button_with_text(&form, "Add Transaction");
    }

    #[tokio::test]
    async fn page_lists_seeded_categories_in_datalist() {
        let (state, user_id) = get_page_state();

        let response = get_new_transaction_page(State(state), Extension(user_id))
            .await
            .unwrap();
        let html = parse_html_document(response).await;

        let options = scraper::Selector::parse("datalist#category-options option").unwrap();
        let names: Vec<&str> = html
            .select(&options)
            .filter_map(|option| option.value().attr("value"))
            .collect();

        assert!(
            names.contains(&"Groceries"),
            "want seeded category in datalist, got {names:?}"
        );
    }
}
