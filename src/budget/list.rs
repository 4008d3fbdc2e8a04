//! Budgets listing page with progress bars and inline expense forms.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    budget::{Budget, budget_progress, get_budgets},
    endpoints,
    html::{
        BADGE_STYLE, BUTTON_DELETE_STYLE, CARD_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, base, format_currency, progress_bar, rupee_input_styles,
    },
    navigation::NavBar,
    user::UserID,
};

/// The state needed for the budgets listing page.
#[derive(Debug, Clone)]
pub struct BudgetsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A budget with the strings needed to render its card.
#[derive(Debug, Clone)]
struct BudgetCard {
    category: String,
    timeframe_label: &'static str,
    spent_text: String,
    limit_text: String,
    percent: u8,
    spend_url: String,
    delete_url: String,
    confirm_message: String,
}

impl BudgetCard {
    fn new(budget: Budget) -> Self {
        // Stored budgets always have a positive limit.
        let percent = budget_progress(budget.spent, budget.limit).unwrap_or(0);

        Self {
            timeframe_label: budget.timeframe.label(),
            spent_text: format_currency(budget.spent),
            limit_text: format_currency(budget.limit),
            percent,
            spend_url: endpoints::format_endpoint(endpoints::BUDGET_SPEND, budget.id),
            delete_url: endpoints::format_endpoint(endpoints::DELETE_BUDGET, budget.id),
            confirm_message: format!(
                "Are you sure you want to delete the '{}' budget?",
                budget.category
            ),
            category: budget.category,
        }
    }
}

/// Render the budgets listing page.
pub async fn get_budgets_page(
    State(state): State<BudgetsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_budgets(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve budgets: {error}"))?;

    let cards = budgets.into_iter().map(BudgetCard::new).collect::<Vec<_>>();

    Ok(budgets_view(&cards).into_response())
}

fn budgets_view(cards: &[BudgetCard]) -> Markup {
    let new_budget_route = endpoints::NEW_BUDGET_VIEW;
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-2xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Budgets" }

                    a href=(new_budget_route) class=(LINK_STYLE)
                    {
                        "Create Budget"
                    }
                }

                ul class="space-y-4"
                {
                    @for card in cards {
                        li class=(CARD_STYLE) data-budget-card="true"
                        {
                            (budget_card_view(card))
                        }
                    }

                    @if cards.is_empty() {
                        li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                        {
                            "You haven't set up any budgets yet. "
                            a href=(new_budget_route) class=(LINK_STYLE)
                            {
                                "Create your first budget"
                            }
                        }
                    }
                }
            }
        }
    );

    base("Budgets", &[rupee_input_styles()], &content)
}

fn budget_card_view(card: &BudgetCard) -> Markup {
    html!(
        div class="flex items-start justify-between gap-3"
        {
            div
            {
                h2 class="text-base font-semibold text-gray-900 dark:text-white"
                {
                    (card.category)
                }

                span class=(BADGE_STYLE) { (card.timeframe_label) }
            }

            button
                type="button"
                class=(BUTTON_DELETE_STYLE)
                hx-delete=(card.delete_url)
                hx-confirm=(card.confirm_message)
                hx-target="closest [data-budget-card='true']"
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
            {
                "Delete"
            }
        }

        div class="mt-3 space-y-1"
        {
            (progress_bar(card.percent))

            div class="flex justify-between text-sm text-gray-500 dark:text-gray-400"
            {
                span class="tabular-nums"
                {
                    (card.spent_text) " of " (card.limit_text)
                }

                span class="tabular-nums" { (card.percent) "% used" }
            }
        }

        form
            hx-post=(card.spend_url)
            hx-target-error="#alert-container"
            class="mt-3 flex items-end gap-2"
        {
            div class="input-wrapper flex-1"
            {
                input
                    type="number"
                    name="amount"
                    min="0.01"
                    step="0.01"
                    placeholder="Add an expense"
                    required
                    aria-label={ "Add an expense to the " (card.category) " budget" }
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button
                type="submit"
                class="px-4 py-2.5 text-sm font-medium text-white bg-blue-500 dark:bg-blue-600 hover:bg-blue-600 hover:dark:bg-blue-700 rounded"
            {
                "Add"
            }
        }
    )
}
