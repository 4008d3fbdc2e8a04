//! The dashboard, a summary of the user's finances at a glance.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    bills::{DueStatus, days_until_due, due_label},
    budget::{Budget, budget_progress, get_budgets},
    debt::get_debts,
    endpoints,
    html::{
        CARD_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base,
        format_currency, format_currency_signed, progress_bar, rupee_input_styles,
    },
    navigation::NavBar,
    subscription::get_subscriptions,
    timezone::get_local_offset,
    transaction::{
        Transaction, TransactionType, TypeTotals, get_transactions, sort_by_recency,
        totals_by_type,
    },
    user::UserID,
};

/// The number of recent transactions shown on the dashboard.
const RECENT_TRANSACTION_COUNT: usize = 5;
/// The number of budgets shown on the dashboard.
const TOP_BUDGET_COUNT: usize = 3;
/// The number of upcoming bills shown on the dashboard.
const UPCOMING_BILL_COUNT: usize = 3;

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A recent transaction with the strings needed to render its row.
struct RecentTransaction {
    title: String,
    category: String,
    date_text: String,
    amount_text: String,
    amount_class: &'static str,
}

impl RecentTransaction {
    fn new(transaction: &Transaction) -> Self {
        let (amount_text, amount_class) = match transaction.transaction_type {
            TransactionType::Income => (
                format_currency_signed(transaction.amount, true),
                "text-green-600 dark:text-green-400",
            ),
            TransactionType::Expense => (
                format_currency(-transaction.amount),
                "text-red-600 dark:text-red-400",
            ),
            TransactionType::Investment | TransactionType::Saving => (
                format_currency(transaction.amount),
                "text-gray-900 dark:text-white",
            ),
        };

        let title = if transaction.description.is_empty() {
            transaction.category.clone()
        } else {
            transaction.description.clone()
        };

        Self {
            title,
            category: transaction.category.clone(),
            date_text: transaction.date.to_string(),
            amount_text,
            amount_class,
        }
    }
}

/// A budget with the strings needed to render its dashboard card.
struct BudgetSummary {
    category: String,
    percent: u8,
    spent_text: String,
    limit_text: String,
    spend_url: String,
}

impl BudgetSummary {
    fn new(budget: &Budget) -> Self {
        Self {
            category: budget.category.clone(),
            // Stored budgets always have a positive limit.
            percent: budget_progress(budget.spent, budget.limit).unwrap_or(0),
            spent_text: format_currency(budget.spent),
            limit_text: format_currency(budget.limit),
            spend_url: endpoints::format_endpoint(endpoints::BUDGET_SPEND, budget.id),
        }
    }
}

/// An upcoming subscription or debt payment on the dashboard.
struct UpcomingBill {
    name: String,
    amount_text: String,
    date: Date,
    due_text: String,
    due_badge_class: &'static str,
}

/// Render the dashboard page.
pub async fn get_dashboard_page(
    State(state): State<DashboardPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let mut transactions = get_transactions(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;
    let budgets = get_budgets(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve budgets: {error}"))?;
    let subscriptions = get_subscriptions(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve subscriptions: {error}"))?;
    let debts = get_debts(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve debts: {error}"))?;

    let today = match get_local_offset(&state.local_timezone) {
        Some(offset) => OffsetDateTime::now_utc().to_offset(offset).date(),
        None => {
            return Err(Error::InvalidTimezoneError(state.local_timezone.clone()));
        }
    };

    let totals = totals_by_type(&transactions);

    sort_by_recency(&mut transactions);
    let recent: Vec<RecentTransaction> = transactions
        .iter()
        .take(RECENT_TRANSACTION_COUNT)
        .map(RecentTransaction::new)
        .collect();

    let mut budgets_by_usage: Vec<&Budget> = budgets.iter().collect();
    budgets_by_usage.sort_by(|a, b| {
        let a_usage = budget_progress(a.spent, a.limit).unwrap_or(0);
        let b_usage = budget_progress(b.spent, b.limit).unwrap_or(0);

        b_usage.cmp(&a_usage).then_with(|| a.category.cmp(&b.category))
    });
    let top_budgets: Vec<BudgetSummary> = budgets_by_usage
        .iter()
        .take(TOP_BUDGET_COUNT)
        .map(|budget| BudgetSummary::new(budget))
        .collect();

    let mut upcoming: Vec<UpcomingBill> = subscriptions
        .iter()
        .map(|subscription| {
            let days = days_until_due(subscription.next_billing_date, today);

            UpcomingBill {
                name: subscription.name.clone(),
                amount_text: format_currency(subscription.amount),
                date: subscription.next_billing_date,
                due_text: due_label(days),
                due_badge_class: DueStatus::from_days(days).badge_class(),
            }
        })
        .chain(debts.iter().map(|debt| {
            let days = days_until_due(debt.due_date, today);

            UpcomingBill {
                name: debt.name.clone(),
                amount_text: format_currency(debt.minimum_payment),
                date: debt.due_date,
                due_text: due_label(days),
                due_badge_class: DueStatus::from_days(days).badge_class(),
            }
        }))
        .collect();
    upcoming.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));
    upcoming.truncate(UPCOMING_BILL_COUNT);

    Ok(dashboard_view(&totals, &recent, &top_budgets, &upcoming).into_response())
}

fn dashboard_view(
    totals: &TypeTotals,
    recent: &[RecentTransaction],
    top_budgets: &[BudgetSummary],
    upcoming: &[UpcomingBill],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="space-y-6 w-full max-w-4xl"
            {
                (totals_cards(totals))

                div class="grid grid-cols-1 gap-6 lg:grid-cols-2"
                {
                    (recent_transactions_card(recent))

                    div class="space-y-6"
                    {
                        (budgets_card(top_budgets))

                        (upcoming_bills_card(upcoming))
                    }
                }
            }
        }
    );

    base("Dashboard", &[rupee_input_styles()], &content)
}

fn totals_cards(totals: &TypeTotals) -> Markup {
    let cards = [
        ("Income", totals.income),
        ("Expenses", totals.expense),
        ("Investments", totals.investment),
        ("Savings", totals.saving),
    ];

    html!(
        section class="grid grid-cols-2 gap-4 lg:grid-cols-4"
        {
            @for (label, amount) in cards {
                div class=(CARD_STYLE)
                {
                    p class="text-sm text-gray-500 dark:text-gray-400" { (label) }

                    p class="text-lg font-semibold tabular-nums"
                    {
                        (format_currency(amount))
                    }
                }
            }
        }
    )
}

fn recent_transactions_card(recent: &[RecentTransaction]) -> Markup {
    html!(
        section class=(CARD_STYLE)
        {
            header class="flex justify-between items-end mb-2"
            {
                h2 class="text-base font-semibold" { "Recent Transactions" }

                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "View all" }
            }

            @if recent.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "You haven't added any transactions yet. "
                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Add your first transaction"
                    }
                }
            } @else {
                ul class="divide-y divide-gray-200 dark:divide-gray-700"
                {
                    @for transaction in recent {
                        li class="flex justify-between gap-3 py-2"
                        {
                            div
                            {
                                p class="text-sm font-medium text-gray-900 dark:text-white"
                                {
                                    (transaction.title)
                                }

                                p class="text-xs text-gray-500 dark:text-gray-400"
                                {
                                    (transaction.category) " · " (transaction.date_text)
                                }
                            }

                            span class={ "tabular-nums text-sm font-semibold " (transaction.amount_class) }
                            {
                                (transaction.amount_text)
                            }
                        }
                    }
                }
            }
        }
    )
}

fn budgets_card(top_budgets: &[BudgetSummary]) -> Markup {
    html!(
        section class=(CARD_STYLE)
        {
            header class="flex justify-between items-end mb-2"
            {
                h2 class="text-base font-semibold" { "Budgets" }

                a href=(endpoints::BUDGETS_VIEW) class=(LINK_STYLE) { "View all" }
            }

            @if top_budgets.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "You haven't set up any budgets yet. "
                    a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE)
                    {
                        "Create your first budget"
                    }
                }
            } @else {
                ul class="space-y-4"
                {
                    @for budget in top_budgets {
                        li
                        {
                            div class="flex justify-between text-sm mb-1"
                            {
                                span class="font-medium" { (budget.category) }

                                span class="tabular-nums text-gray-500 dark:text-gray-400"
                                {
                                    (budget.spent_text) " of " (budget.limit_text)
                                }
                            }

                            (progress_bar(budget.percent))

                            form
                                hx-post=(budget.spend_url)
                                hx-target-error="#alert-container"
                                class="mt-2 flex items-end gap-2"
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
                                        aria-label={ "Add an expense to the " (budget.category) " budget" }
                                        class=(FORM_TEXT_INPUT_STYLE);
                                }

                                button
                                    type="submit"
                                    class="px-4 py-2.5 text-sm font-medium text-white bg-blue-500 dark:bg-blue-600 hover:bg-blue-600 hover:dark:bg-blue-700 rounded"
                                {
                                    "Add"
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}

fn upcoming_bills_card(upcoming: &[UpcomingBill]) -> Markup {
    html!(
        section class=(CARD_STYLE)
        {
            header class="flex justify-between items-end mb-2"
            {
                h2 class="text-base font-semibold" { "Upcoming Bills" }

                a href=(endpoints::BILLS_VIEW) class=(LINK_STYLE) { "View all" }
            }

            @if upcoming.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "You haven't added any subscriptions or bills yet."
                }
            } @else {
                ul class="divide-y divide-gray-200 dark:divide-gray-700"
                {
                    @for bill in upcoming {
                        li class="flex justify-between items-center gap-3 py-2"
                        {
                            div
                            {
                                p class="text-sm font-medium text-gray-900 dark:text-white"
                                {
                                    (bill.name)
                                }

                                span class=(bill.due_badge_class) { (bill.due_text) }
                            }

                            span class="tabular-nums text-sm font-semibold"
                            {
                                (bill.amount_text)
                            }
                        }
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod dashboard_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::Selector;
    use time::{Duration, OffsetDateTime};

    use crate::{
        PasswordHash,
        budget::{NewBudget, Timeframe, create_budget, create_budget_table, update_budget_spent},
        debt::create_debt_table,
        subscription::{NewSubscription, create_subscription, create_subscription_table},
        test_utils::{assert_content_type, assert_valid_html, parse_html_document},
        transaction::{NewTransaction, TransactionType, create_transaction,
            create_transaction_table},
        user::{UserID, create_user, create_user_table},
    };

    use super::{DashboardPageState, get_dashboard_page};

    fn get_page_state() -> (DashboardPageState, UserID) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");
        create_transaction_table(&connection).expect("Could not create transaction table");
        create_budget_table(&connection).expect("Could not create budget table");
        create_subscription_table(&connection).expect("Could not create subscription table");
        create_debt_table(&connection).expect("Could not create debt table");

        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .expect("Could not create test user");

        (
            DashboardPageState {
                db_connection: Arc::new(Mutex::new(connection)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user.id,
        )
    }

    fn today() -> time::Date {
        OffsetDateTime::now_utc().date()
    }

    #[tokio::test]
    async fn render_page_with_totals_budgets_and_bills() {
        let (state, user_id) = get_page_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                NewTransaction {
                    user_id,
                    amount: 50_000.0,
                    transaction_type: TransactionType::Income,
                    category: "Salary".to_string(),
                    description: "August salary".to_string(),
                    date: today() - Duration::days(1),
                },
                &connection,
            )
            .unwrap();

            let budget = create_budget(
                NewBudget {
                    user_id,
                    category: "Groceries".to_string(),
                    limit: 10_000.0,
                    timeframe: Timeframe::Monthly,
                },
                &connection,
            )
            .unwrap();
            update_budget_spent(budget.id, user_id, 9_000.0, &connection).unwrap();

            create_subscription(
                NewSubscription {
                    user_id,
                    name: "Hotstar".to_string(),
                    amount: 299.0,
                    frequency: Timeframe::Monthly,
                    next_billing_date: today() + Duration::days(2),
                    category: "Entertainment".to_string(),
                },
                &connection,
            )
            .unwrap();
        }

        let response = get_dashboard_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let body_text = html.root_element().text().collect::<Vec<_>>().join("");
        assert!(
            body_text.contains("₹50,000"),
            "want income total, got {body_text}"
        );
        assert!(body_text.contains("August salary"));
        assert!(body_text.contains("₹9,000 of ₹10,000"));
        assert!(body_text.contains("Hotstar"));
        assert!(
            body_text.contains("Due in 2 days"),
            "want due badge, got {body_text}"
        );
    }

    #[tokio::test]
    async fn only_five_most_recent_transactions_are_listed() {
        let (state, user_id) = get_page_state();
        {
            let connection = state.db_connection.lock().unwrap();
            for days_ago in 0..7 {
                create_transaction(
                    NewTransaction {
                        user_id,
                        amount: 100.0 + f64::from(days_ago),
                        transaction_type: TransactionType::Expense,
                        category: "Misc".to_string(),
                        description: format!("Purchase {days_ago}"),
                        date: today() - Duration::days(i64::from(days_ago)),
                    },
                    &connection,
                )
                .unwrap();
            }
        }

        let response = get_dashboard_page(State(state), Extension(user_id))
            .await
            .unwrap();
        let html = parse_html_document(response).await;

        let body_text = html.root_element().text().collect::<Vec<_>>().join("");
        assert!(body_text.contains("Purchase 0"));
        assert!(body_text.contains("Purchase 4"));
        assert!(
            !body_text.contains("Purchase 5"),
            "want only the five most recent transactions, got {body_text}"
        );
    }

    #[tokio::test]
    async fn render_page_with_no_data_shows_empty_states() {
        let (state, user_id) = get_page_state();

        let response = get_dashboard_page(State(state), Extension(user_id))
            .await
            .unwrap();
        let html = parse_html_document(response).await;

        let body_text = html.root_element().text().collect::<Vec<_>>().join("");
        assert!(body_text.contains("You haven't added any transactions yet."));
        assert!(body_text.contains("You haven't set up any budgets yet."));
        assert!(body_text.contains("You haven't added any subscriptions or bills yet."));

        let forms = Selector::parse("main form").unwrap();
        assert_eq!(html.select(&forms).count(), 0);
    }
}
