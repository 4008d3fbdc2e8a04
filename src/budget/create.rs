//! Budget creation page and endpoint.

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

use crate::{
    AppState, Error,
    budget::{
        create_budget,
        domain::{BudgetFormData, Timeframe},
    },
    category::{Category, get_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        rupee_input_styles,
    },
    navigation::NavBar,
    user::UserID,
};

/// The state needed for the new budget page.
#[derive(Debug, Clone)]
pub struct NewBudgetPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NewBudgetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for creating a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateBudgetEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the budget creation page.
pub async fn get_new_budget_page(
    State(state): State<NewBudgetPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let values = BudgetFormData {
        category: String::new(),
        limit: String::new(),
        timeframe: Timeframe::Monthly.as_str().to_owned(),
    };

    Ok(new_budget_view(&values, &categories, "").into_response())
}

/// Handle budget creation form submission.
pub async fn create_budget_endpoint(
    State(state): State<CreateBudgetEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<BudgetFormData>,
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

    let new_budget = match form_data.to_new_budget(user_id) {
        Ok(new_budget) => new_budget,
        Err(error) => {
            return new_budget_form_view(&form_data, &categories, &format!("Error: {error}"))
                .into_response();
        }
    };

    match create_budget(new_budget, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a budget: {error}");

            error.into_alert_response()
        }
    }
}

fn new_budget_view(
    values: &BudgetFormData,
    categories: &[Category],
    error_message: &str,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_BUDGET_VIEW).into_html();
    let form = new_budget_form_view(values, categories, error_message);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("New Budget", &[rupee_input_styles()], &content)
}

fn new_budget_form_view(
    values: &BudgetFormData,
    categories: &[Category],
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::BUDGETS_API)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
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
                    autofocus
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
                label for="limit" class=(FORM_LABEL_STYLE) { "Limit" }

                div class="input-wrapper w-full"
                {
                    input
                        id="limit"
                        type="number"
                        name="limit"
                        min="0.01"
                        step="0.01"
                        placeholder="10000"
                        value=(values.limit)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="timeframe" class=(FORM_LABEL_STYLE) { "Timeframe" }

                select
                    id="timeframe"
                    name="timeframe"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for timeframe in Timeframe::ALL {
                        option
                            value=(timeframe.as_str())
                            selected[timeframe.as_str() == values.timeframe]
                        {
                            (timeframe.label())
                        }
                    }
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Budget" }
        }
    }
}
