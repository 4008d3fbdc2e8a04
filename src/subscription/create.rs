//! Subscription creation page and endpoint.

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
    budget::Timeframe,
    category::{Category, get_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        rupee_input_styles,
    },
    navigation::NavBar,
    subscription::{create_subscription, domain::SubscriptionFormData},
    user::UserID,
};

/// The state needed for the new subscription page.
#[derive(Debug, Clone)]
pub struct NewSubscriptionPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NewSubscriptionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for creating a subscription.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateSubscriptionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the subscription creation page.
pub async fn get_new_subscription_page(
    State(state): State<NewSubscriptionPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let values = SubscriptionFormData {
        name: String::new(),
        amount: String::new(),
        frequency: Timeframe::Monthly.as_str().to_owned(),
        next_billing_date: String::new(),
        category: String::new(),
    };

    Ok(new_subscription_view(&values, &categories, "").into_response())
}

/// Handle subscription creation form submission.
pub async fn create_subscription_endpoint(
    State(state): State<CreateSubscriptionEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<SubscriptionFormData>,
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

    let new_subscription = match form_data.to_new_subscription(user_id) {
        Ok(new_subscription) => new_subscription,
        Err(error) => {
            return new_subscription_form_view(&form_data, &categories, &format!("Error: {error}"))
                .into_response();
        }
    };

    match create_subscription(new_subscription, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BILLS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a subscription: {error}");

            error.into_alert_response()
        }
    }
}

fn new_subscription_view(
    values: &SubscriptionFormData,
    categories: &[Category],
    error_message: &str,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_SUBSCRIPTION_VIEW).into_html();
    let form = new_subscription_form_view(values, categories, error_message);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("New Subscription", &[rupee_input_styles()], &content)
}

fn new_subscription_form_view(
    values: &SubscriptionFormData,
    categories: &[Category],
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::SUBSCRIPTIONS_API)
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
                    placeholder="Hotstar"
                    value=(values.name)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

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
                        placeholder="299"
                        value=(values.amount)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="frequency" class=(FORM_LABEL_STYLE) { "Billing Frequency" }

                select
                    id="frequency"
                    name="frequency"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for timeframe in Timeframe::ALL {
                        option
                            value=(timeframe.as_str())
                            selected[timeframe.as_str() == values.frequency]
                        {
                            (timeframe.label())
                        }
                    }
                }
            }

            div
            {
                label for="next_billing_date" class=(FORM_LABEL_STYLE) { "Next Billing Date" }

                input
                    id="next_billing_date"
                    type="date"
                    name="next_billing_date"
                    value=(values.next_billing_date)
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
                    list="category-options"
                    placeholder="Entertainment"
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

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Subscription" }
        }
    }
}
