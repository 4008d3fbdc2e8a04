//! Debt creation page and endpoint.

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
    debt::{
        create_debt,
        domain::{DebtFormData, DebtType},
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        rupee_input_styles,
    },
    navigation::NavBar,
    user::UserID,
};

/// The state needed for creating a debt.
#[derive(Debug, Clone)]
pub struct CreateDebtEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateDebtEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the debt creation page.
pub async fn get_new_debt_page() -> Response {
    let values = DebtFormData {
        name: String::new(),
        debt_type: DebtType::CreditCard.as_str().to_owned(),
        total: String::new(),
        remaining: String::new(),
        interest_rate: String::new(),
        minimum_payment: String::new(),
        due_date: String::new(),
        category: String::new(),
    };

    new_debt_view(&values, "").into_response()
}

/// Handle debt creation form submission.
pub async fn create_debt_endpoint(
    State(state): State<CreateDebtEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<DebtFormData>,
) -> Response {
    let new_debt = match form_data.to_new_debt(user_id) {
        Ok(new_debt) => new_debt,
        Err(error) => {
            return new_debt_form_view(&form_data, &format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_debt(new_debt, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BILLS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a debt: {error}");

            error.into_alert_response()
        }
    }
}

fn new_debt_view(values: &DebtFormData, error_message: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_DEBT_VIEW).into_html();
    let form = new_debt_form_view(values, error_message);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("New Debt", &[rupee_input_styles()], &content)
}

fn new_debt_form_view(values: &DebtFormData, error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::DEBTS_API)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Car loan"
                    value=(values.name)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="debt_type" class=(FORM_LABEL_STYLE) { "Type" }

                select
                    id="debt_type"
                    name="debt_type"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for debt_type in DebtType::ALL {
                        option
                            value=(debt_type.as_str())
                            selected[debt_type.as_str() == values.debt_type]
                        {
                            (debt_type.label())
                        }
                    }
                }
            }

            div class="grid grid-cols-1 gap-4 md:grid-cols-2"
            {
                div
                {
                    label for="total" class=(FORM_LABEL_STYLE) { "Total Amount" }

                    div class="input-wrapper w-full"
                    {
                        input
                            id="total"
                            type="number"
                            name="total"
                            min="0.01"
                            step="0.01"
                            placeholder="500000"
                            value=(values.total)
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                div
                {
                    label for="remaining" class=(FORM_LABEL_STYLE) { "Remaining" }

                    div class="input-wrapper w-full"
                    {
                        input
                            id="remaining"
                            type="number"
                            name="remaining"
                            min="0"
                            step="0.01"
                            placeholder="320000"
                            value=(values.remaining)
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }
            }

            div class="grid grid-cols-1 gap-4 md:grid-cols-2"
            {
                div
                {
                    label for="interest_rate" class=(FORM_LABEL_STYLE) { "Interest Rate (%)" }

                    input
                        id="interest_rate"
                        type="number"
                        name="interest_rate"
                        min="0"
                        step="0.01"
                        placeholder="9.5"
                        value=(values.interest_rate)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="minimum_payment" class=(FORM_LABEL_STYLE) { "Minimum Payment" }

                    div class="input-wrapper w-full"
                    {
                        input
                            id="minimum_payment"
                            type="number"
                            name="minimum_payment"
                            min="0"
                            step="0.01"
                            placeholder="12000"
                            value=(values.minimum_payment)
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }
            }

            div
            {
                label for="due_date" class=(FORM_LABEL_STYLE) { "Next Due Date" }

                input
                    id="due_date"
                    type="date"
                    name="due_date"
                    value=(values.due_date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                input
                    id="category"
                    type="text"
                    name="category"
                    placeholder="Debt"
                    value=(values.category)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Debt" }
        }
    }
}
