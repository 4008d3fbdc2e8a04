//! The calendar page showing per-day net amounts for a month.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, OffsetDateTime, macros::format_description};

use crate::{
    AppState, Error,
    calendar::month::CalendarMonth,
    endpoints,
    html::{
        CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_currency,
        format_currency_signed,
    },
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::{Transaction, TransactionType, get_transactions},
    user::UserID,
};

/// The state needed for the calendar page.
#[derive(Debug, Clone)]
pub struct CalendarPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for CalendarPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters accepted by the calendar page.
#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    month: Option<String>,
    day: Option<String>,
}

const DAY_QUERY_FORMAT: &[time::format_description::BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]");

/// Render the calendar page for the selected month.
pub async fn get_calendar_page(
    State(state): State<CalendarPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<CalendarQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;

    let today = match get_local_offset(&state.local_timezone) {
        Some(offset) => OffsetDateTime::now_utc().to_offset(offset).date(),
        None => {
            return Err(Error::InvalidTimezoneError(state.local_timezone.clone()));
        }
    };

    let month = CalendarMonth::from_query(query.month.as_deref(), today);
    let selected_day = query
        .day
        .as_deref()
        .and_then(|raw| Date::parse(raw, DAY_QUERY_FORMAT).ok());

    let mut daily_net: BTreeMap<Date, f64> = BTreeMap::new();
    for transaction in &transactions {
        match transaction.transaction_type {
            TransactionType::Income => {
                *daily_net.entry(transaction.date).or_insert(0.0) += transaction.amount;
            }
            TransactionType::Expense => {
                *daily_net.entry(transaction.date).or_insert(0.0) -= transaction.amount;
            }
            TransactionType::Investment | TransactionType::Saving => {}
        }
    }

    let day_transactions: Vec<&Transaction> = match selected_day {
        Some(day) => transactions
            .iter()
            .filter(|transaction| transaction.date == day)
            .collect(),
        None => Vec::new(),
    };

    Ok(
        calendar_view(month, &daily_net, selected_day, &day_transactions)
            .into_response(),
    )
}

fn calendar_view(
    month: CalendarMonth,
    daily_net: &BTreeMap<Date, f64>,
    selected_day: Option<Date>,
    day_transactions: &[&Transaction],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::CALENDAR_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-3xl"
            {
                header class="flex justify-between items-center"
                {
                    a
                        href={ (endpoints::CALENDAR_VIEW) "?month=" (month.previous().query_value()) }
                        class=(LINK_STYLE)
                        aria-label="Previous month"
                    {
                        "Previous"
                    }

                    h1 class="text-xl font-bold" { (month.title()) }

                    a
                        href={ (endpoints::CALENDAR_VIEW) "?month=" (month.next().query_value()) }
                        class=(LINK_STYLE)
                        aria-label="Next month"
                    {
                        "Next"
                    }
                }

                (month_grid(month, daily_net))

                @if let Some(day) = selected_day {
                    (day_panel(day, day_transactions))
                }
            }
        }
    );

    base("Calendar", &[], &content)
}

fn month_grid(month: CalendarMonth, daily_net: &BTreeMap<Date, f64>) -> Markup {
    html!(
        div class="grid grid-cols-7 gap-1 text-center text-xs font-semibold text-gray-500 dark:text-gray-400"
        {
            @for weekday in ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"] {
                div class="py-1" { (weekday) }
            }
        }

        div class="grid grid-cols-7 gap-1"
        {
            @for _ in 0..month.leading_blank_days() {
                div {}
            }

            @for day in 1..=month.day_count() {
                (day_cell(month, day, daily_net))
            }
        }
    )
}

fn day_cell(month: CalendarMonth, day: u8, daily_net: &BTreeMap<Date, f64>) -> Markup {
    let net = month
        .date_of(day)
        .and_then(|date| daily_net.get(&date).copied());

    let net_view = match net {
        Some(net) if net > 0.0 => html!(
            span class="block text-xs tabular-nums text-green-600 dark:text-green-400"
            {
                (format_currency_signed(net, true))
            }
        ),
        Some(net) if net < 0.0 => html!(
            span class="block text-xs tabular-nums text-red-600 dark:text-red-400"
            {
                (format_currency(net))
            }
        ),
        Some(net) => html!(
            span class="block text-xs tabular-nums text-gray-500 dark:text-gray-400"
            {
                (format_currency(net))
            }
        ),
        None => html!(),
    };

    let day_url = html_day_url(month, day);

    html!(
        a
            href=(day_url)
            class="block min-h-16 rounded border border-gray-200 bg-white p-1 text-left \
            hover:border-blue-400 dark:border-gray-700 dark:bg-gray-800"
        {
            span class="block text-sm font-medium" { (day) }

            (net_view)
        }
    )
}

fn html_day_url(month: CalendarMonth, day: u8) -> String {
    format!(
        "{}?month={}&day={}-{:02}",
        endpoints::CALENDAR_VIEW,
        month.query_value(),
        month.query_value(),
        day
    )
}

fn day_panel(day: Date, day_transactions: &[&Transaction]) -> Markup {
    html!(
        section class=(CARD_STYLE)
        {
            h2 class="text-base font-semibold mb-2" { "Transactions on " (day) }

            @if day_transactions.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "No transactions on this day."
                }
            } @else {
                ul class="divide-y divide-gray-200 dark:divide-gray-700"
                {
                    @for transaction in day_transactions {
                        li class="flex justify-between gap-3 py-2"
                        {
                            div
                            {
                                p class="text-sm font-medium text-gray-900 dark:text-white"
                                {
                                    @if transaction.description.is_empty() {
                                        (transaction.category)
                                    } @else {
                                        (transaction.description)
                                    }
                                }

                                p class="text-xs text-gray-500 dark:text-gray-400"
                                {
                                    (transaction.category)
                                    " · "
                                    (transaction.transaction_type.label())
                                }
                            }

                            span class="tabular-nums text-sm font-semibold"
                            {
                                (format_currency(transaction.amount))
                            }
                        }
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod calendar_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        PasswordHash,
        test_utils::{assert_content_type, assert_valid_html, parse_html_document},
        transaction::{NewTransaction, TransactionType, create_transaction,
            create_transaction_table},
        user::{UserID, create_user, create_user_table},
    };

    use super::{CalendarPageState, CalendarQuery, get_calendar_page};

    fn get_page_state() -> (CalendarPageState, UserID) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");
        create_transaction_table(&connection).expect("Could not create transaction table");

        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .expect("Could not create test user");

        (
            CalendarPageState {
                db_connection: Arc::new(Mutex::new(connection)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user.id,
        )
    }

    fn seed_transaction(
        state: &CalendarPageState,
        user_id: UserID,
        transaction_type: TransactionType,
        amount: f64,
        date: time::Date,
    ) {
        create_transaction(
            NewTransaction {
                user_id,
                amount,
                transaction_type,
                category: "Misc".to_string(),
                description: "Seeded".to_string(),
                date,
            },
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test transaction");
    }

    #[tokio::test]
    async fn render_month_grid_with_net_amounts() {
        use time::macros::date;

        let (state, user_id) = get_page_state();
        seed_transaction(
            &state,
            user_id,
            TransactionType::Income,
            50_000.0,
            date!(2025 - 08 - 14),
        );
        seed_transaction(
            &state,
            user_id,
            TransactionType::Expense,
            1_200.0,
            date!(2025 - 08 - 20),
        );

        let response = get_calendar_page(
            State(state),
            Extension(user_id),
            Query(CalendarQuery {
                month: Some("2025-08".to_string()),
                day: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let body_text = html.root_element().text().collect::<Vec<_>>().join("");
        assert!(body_text.contains("August 2025"));
        assert!(
            body_text.contains("+₹50,000"),
            "want positive net in green cell, got {body_text}"
        );
        assert!(
            body_text.contains("-₹1,200"),
            "want negative net in red cell, got {body_text}"
        );
    }

    #[tokio::test]
    async fn previous_and_next_links_cross_year_boundary() {
        let (state, user_id) = get_page_state();

        let response = get_calendar_page(
            State(state),
            Extension(user_id),
            Query(CalendarQuery {
                month: Some("2025-01".to_string()),
                day: None,
            }),
        )
        .await
        .unwrap();
        let html = parse_html_document(response).await;

        let links = Selector::parse("main header a").unwrap();
        let hrefs: Vec<String> = html
            .select(&links)
            .filter_map(|element| element.value().attr("href").map(str::to_owned))
            .collect();

        assert!(
            hrefs.iter().any(|href| href.contains("month=2024-12")),
            "want previous month link, got {hrefs:?}"
        );
        assert!(
            hrefs.iter().any(|href| href.contains("month=2025-02")),
            "want next month link, got {hrefs:?}"
        );
    }

    #[tokio::test]
    async fn selected_day_lists_that_days_transactions() {
        use time::macros::date;

        let (state, user_id) = get_page_state();
        seed_transaction(
            &state,
            user_id,
            TransactionType::Expense,
            450.0,
            date!(2025 - 08 - 14),
        );
        seed_transaction(
            &state,
            user_id,
            TransactionType::Expense,
            999.0,
            date!(2025 - 08 - 15),
        );

        let response = get_calendar_page(
            State(state),
            Extension(user_id),
            Query(CalendarQuery {
                month: Some("2025-08".to_string()),
                day: Some("2025-08-14".to_string()),
            }),
        )
        .await
        .unwrap();
        let html = parse_html_document(response).await;

        let body_text = html.root_element().text().collect::<Vec<_>>().join("");
        assert!(body_text.contains("Transactions on 2025-08-14"));
        assert!(body_text.contains("₹450"));
        assert!(
            !body_text.contains("₹999"),
            "other days' transactions should not be listed, got {body_text}"
        );
    }

    #[tokio::test]
    async fn selected_day_without_transactions_shows_empty_message() {
        let (state, user_id) = get_page_state();

        let response = get_calendar_page(
            State(state),
            Extension(user_id),
            Query(CalendarQuery {
                month: Some("2025-08".to_string()),
                day: Some("2025-08-14".to_string()),
            }),
        )
        .await
        .unwrap();
        let html = parse_html_document(response).await;

        let body_text = html.root_element().text().collect::<Vec<_>>().join("");
        assert!(body_text.contains("No transactions on this day."));
    }
}
