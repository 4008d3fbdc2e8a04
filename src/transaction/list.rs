//! Transactions listing page.

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
    category::{Category, category_color, category_icon, get_categories},
    endpoints,
    html::{
        BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
    transaction::{Transaction, TransactionType, get_transactions},
    user::UserID,
};

/// The state needed for the transactions listing page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A transaction with the strings needed to render its table row.
#[derive(Debug, Clone)]
struct TransactionRow {
    date_text: String,
    description: String,
    category: String,
    category_color: String,
    category_icon: String,
    type_label: &'static str,
    amount_text: String,
    amount_class: &'static str,
    edit_url: String,
    delete_url: String,
    confirm_message: String,
}

impl TransactionRow {
    fn new(transaction: Transaction, categories: &[Category]) -> Self {
        let (amount_text, amount_class) = display_amount(&transaction);
        let confirm_message = format!(
            "Are you sure you want to delete this {} transaction of {}?",
            transaction.transaction_type.as_str(),
            format_currency(transaction.amount),
        );

        Self {
            date_text: transaction.date.to_string(),
            category_color: category_color(categories, &transaction.category).to_owned(),
            category_icon: category_icon(categories, &transaction.category).to_owned(),
            type_label: transaction.transaction_type.label(),
            amount_text,
            amount_class,
            edit_url: endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, &transaction.id),
            delete_url: endpoints::format_endpoint(endpoints::TRANSACTION, &transaction.id),
            confirm_message,
            description: transaction.description,
            category: transaction.category,
        }
    }
}

/// Format the amount with a sign and pick a text color for its direction.
///
/// Income is shown in green with a '+' prefix, expenses in red with a '-'
/// prefix, investments and savings in the regular text color.
fn display_amount(transaction: &Transaction) -> (String, &'static str) {
    match transaction.transaction_type {
        TransactionType::Income => (
            format!("+{}", format_currency(transaction.amount)),
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
    }
}

/// Render the transactions listing page, newest transactions first.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;

    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let rows = transactions
        .into_iter()
        .map(|transaction| TransactionRow::new(transaction, &categories))
        .collect::<Vec<_>>();

    Ok(transactions_view(&rows).into_response())
}

fn transactions_view(rows: &[TransactionRow]) -> Markup {
    let new_transaction_route = endpoints::NEW_TRANSACTION_VIEW;
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let table_row = |row: &TransactionRow| {
        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (row.date_text) }

                td class=(TABLE_CELL_STYLE) { (row.description) }

                td class=(TABLE_CELL_STYLE)
                {
                    span class=(BADGE_STYLE) style={ "background-color: " (row.category_color) "20; color: " (row.category_color) }
                    {
                        (row.category_icon) " " (row.category)
                    }
                }

                td class=(TABLE_CELL_STYLE) { (row.type_label) }

                td class={ (TABLE_CELL_STYLE) " tabular-nums " (row.amount_class) }
                {
                    (row.amount_text)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &row.edit_url,
                            &row.delete_url,
                            &row.confirm_message,
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(new_transaction_route) class=(LINK_STYLE)
                    {
                        "Add Transaction"
                    }
                }

                (transaction_cards_view(rows, new_transaction_route))

                section class="hidden lg:block dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                (table_row(row))
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "You haven't added any transactions yet. "
                                        a href=(new_transaction_route) class=(LINK_STYLE)
                                        {
                                            "Add your first transaction"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Transactions", &[], &content)
}

fn transaction_cards_view(rows: &[TransactionRow], new_transaction_route: &str) -> Markup {
    html!(
        ul class="lg:hidden space-y-4 w-full max-w-md"
        {
            @for row in rows {
                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-transaction-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        div class="min-w-0"
                        {
                            p class="truncate text-sm font-medium text-gray-900 dark:text-white"
                            {
                                (row.description)
                            }

                            p class="text-xs text-gray-500 dark:text-gray-400"
                            {
                                (row.date_text)
                            }
                        }

                        span class={ "text-sm tabular-nums " (row.amount_class) }
                        {
                            (row.amount_text)
                        }
                    }

                    div class="mt-2 flex items-center justify-between gap-4 text-sm"
                    {
                        span class=(BADGE_STYLE)
                            style={ "background-color: " (row.category_color) "20; color: " (row.category_color) }
                        {
                            (row.category_icon) " " (row.category)
                        }

                        div class="flex items-center gap-4"
                        {
                            (edit_delete_action_links(
                                &row.edit_url,
                                &row.delete_url,
                                &row.confirm_message,
                                "closest [data-transaction-card='true']",
                                "outerHTML",
                            ))
                        }
                    }
                }
            }

            @if rows.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "You haven't added any transactions yet. "
                    a href=(new_transaction_route) class=(LINK_STYLE)
                    {
                        "Add your first transaction"
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod transactions_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        PasswordHash,
        category::{create_category_table, seed_default_categories},
        test_utils::{assert_content_type, assert_valid_html, parse_html_document},
        transaction::{
            create_transaction, create_transaction_table,
            domain::{NewTransaction, TransactionType},
        },
        user::{UserID, create_user, create_user_table},
    };

    use super::{TransactionsPageState, get_transactions_page};

    fn get_page_state() -> (TransactionsPageState, UserID) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");
        create_category_table(&connection).expect("Could not create category table");
        create_transaction_table(&connection).expect("Could not create transaction table");

        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .expect("Could not create test user");

        (
            TransactionsPageState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    fn new_transaction(
        user_id: UserID,
        amount: f64,
        transaction_type: TransactionType,
        description: &str,
        date: time::Date,
    ) -> NewTransaction {
        NewTransaction {
            user_id,
            amount,
            transaction_type,
            category: "Groceries".to_string(),
            description: description.to_string(),
            date,
        }
    }

    #[tokio::test]
    async fn render_page_with_transactions_newest_first() {
        let (state, user_id) = get_page_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                new_transaction(
                    user_id,
                    100.0,
                    TransactionType::Expense,
                    "older",
                    date!(2025 - 08 - 01),
                ),
                &connection,
            )
            .unwrap();
            create_transaction(
                new_transaction(
                    user_id,
                    50_000.0,
                    TransactionType::Income,
                    "newer",
                    date!(2025 - 08 - 20),
                ),
                &connection,
            )
            .unwrap();
        }

        let response = get_transactions_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let cell = Selector::parse("tbody td").unwrap();
        let cell_text: Vec<String> = html
            .select(&cell)
            .map(|cell| cell.text().collect::<Vec<_>>().join("").trim().to_owned())
            .collect();

        let newer_position = cell_text
            .iter()
            .position(|text| text == "newer")
            .expect("newer transaction not rendered");
        let older_position = cell_text
            .iter()
            .position(|text| text == "older")
            .expect("older transaction not rendered");
        assert!(
            newer_position < older_position,
            "want newest transaction first, got {cell_text:?}"
        );

        assert!(
            cell_text.iter().any(|text| text == "+₹50,000"),
            "want income formatted with + prefix, got {cell_text:?}"
        );
        assert!(
            cell_text.iter().any(|text| text == "-₹100"),
            "want expense formatted with - prefix, got {cell_text:?}"
        );
    }

    #[tokio::test]
    async fn category_badge_shows_icon_and_name() {
        let (state, user_id) = get_page_state();
        {
            let connection = state.db_connection.lock().unwrap();
            seed_default_categories(&connection).expect("Could not seed categories");
            create_transaction(
                new_transaction(
                    user_id,
                    450.0,
                    TransactionType::Expense,
                    "weekly shop",
                    date!(2025 - 08 - 14),
                ),
                &connection,
            )
            .unwrap();
        }

        let response = get_transactions_page(State(state), Extension(user_id))
            .await
            .unwrap();
        let html = parse_html_document(response).await;

        let badge = Selector::parse("tbody td span").unwrap();
        let badge_text: Vec<String> = html
            .select(&badge)
            .map(|span| span.text().collect::<Vec<_>>().join("").trim().to_owned())
            .collect();
        assert!(
            badge_text.iter().any(|text| text == "🛒 Groceries"),
            "want category badge with seeded icon, got {badge_text:?}"
        );
    }

    #[tokio::test]
    async fn render_page_with_no_transactions_shows_empty_state() {
        let (state, user_id) = get_page_state();

        let response = get_transactions_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let body_text = html.root_element().text().collect::<Vec<_>>().join("");

        assert!(
            body_text.contains("You haven't added any transactions yet."),
            "want empty state message"
        );
    }

    #[tokio::test]
    async fn render_page_hides_other_users_transactions() {
        let (state, user_id) = get_page_state();
        let other_user_id = {
            let connection = state.db_connection.lock().unwrap();
            let other_user = create_user(
                "other@example.com",
                PasswordHash::new_unchecked("hunter3"),
                &connection,
            )
            .unwrap();
            create_transaction(
                new_transaction(
                    other_user.id,
                    42.0,
                    TransactionType::Expense,
                    "someone else's coffee",
                    date!(2025 - 08 - 14),
                ),
                &connection,
            )
            .unwrap();
            other_user.id
        };
        assert_ne!(user_id, other_user_id);

        let response = get_transactions_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let body_text = html.root_element().text().collect::<Vec<_>>().join("");

        assert!(
            !body_text.contains("someone else's coffee"),
            "other user's transactions should not be visible"
        );
    }
}
