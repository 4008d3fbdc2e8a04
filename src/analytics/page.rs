//! The analytics page with period tabs, totals and spending charts.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    analytics::{
        aggregation::{DailyTotals, daily_trend, expenses_by_category},
        charts::{
            AnalyticsChart, category_breakdown_chart, charts_script, charts_view,
            daily_trend_chart,
        },
        period::Period,
    },
    endpoints,
    html::{CARD_STYLE, HeadElement, PAGE_CONTAINER_STYLE, base, format_currency},
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::{TypeTotals, get_transactions, totals_by_type},
    user::UserID,
};

/// The state needed for the analytics page.
#[derive(Debug, Clone)]
pub struct AnalyticsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for AnalyticsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters accepted by the analytics page.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    period: Option<String>,
}

/// Render the analytics page for the selected period.
pub async fn get_analytics_page(
    State(state): State<AnalyticsPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<AnalyticsQuery>,
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

    let period = Period::from_query(query.period.as_deref());
    let start = period.start_date(today);

    let in_period: Vec<_> = transactions
        .into_iter()
        .filter(|transaction| transaction.date >= start && transaction.date <= today)
        .collect();

    let totals = totals_by_type(&in_period);
    let category_buckets = expenses_by_category(&in_period);
    let trend = daily_trend(&in_period);

    Ok(analytics_view(period, &totals, &category_buckets, &trend).into_response())
}

fn analytics_view(
    period: Period,
    totals: &TypeTotals,
    category_buckets: &[(String, f64)],
    trend: &[DailyTotals],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::ANALYTICS_VIEW).into_html();
    let has_data = !category_buckets.is_empty() || !trend.is_empty();

    let charts = [
        AnalyticsChart {
            id: "category-breakdown-chart",
            options: category_breakdown_chart(category_buckets).to_string(),
        },
        AnalyticsChart {
            id: "daily-trend-chart",
            options: daily_trend_chart(trend).to_string(),
        },
    ];

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-4xl"
            {
                header class="flex justify-between flex-wrap items-end gap-2"
                {
                    h1 class="text-xl font-bold" { "Analytics" }

                    (period_tabs(period))
                }

                (totals_row(totals))

                @if has_data {
                    (charts_view(&charts))
                } @else {
                    p class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                    {
                        "No income or expenses in this period yet."
                    }
                }
            }
        }
    );

    let head_elements: Vec<HeadElement> = if has_data {
        vec![
            HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
            charts_script(&charts),
        ]
    } else {
        Vec::new()
    };

    base("Analytics", &head_elements, &content)
}

fn period_tabs(active: Period) -> Markup {
    let tab_class = |is_active: bool| -> &'static str {
        if is_active {
            "px-3 py-1.5 text-sm font-semibold rounded bg-blue-500 text-white dark:bg-blue-600"
        } else {
            "px-3 py-1.5 text-sm font-semibold rounded text-gray-600 \
            hover:bg-gray-100 dark:text-gray-300 dark:hover:bg-gray-700"
        }
    };

    html!(
        nav class="flex gap-1 rounded border border-gray-200 bg-white p-1 dark:border-gray-700 dark:bg-gray-800"
            aria-label="Reporting period"
        {
            @for period in Period::ALL {
                a
                    href={ (endpoints::ANALYTICS_VIEW) "?period=" (period.as_str()) }
                    class=(tab_class(period == active))
                    aria-current=[(period == active).then_some("page")]
                {
                    (period.label())
                }
            }
        }
    )
}

fn totals_row(totals: &TypeTotals) -> Markup {
    let cards = [
        ("Income", totals.income),
        ("Expenses", totals.expense),
        ("Investments", totals.investment),
        ("Savings", totals.saving),
    ];

    html!(
        div class="grid grid-cols-2 gap-4 lg:grid-cols-4"
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

#[cfg(test)]
mod analytics_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        PasswordHash,
        test_utils::{assert_content_type, assert_valid_html, parse_html_document},
        transaction::{NewTransaction, TransactionType, create_transaction,
            create_transaction_table},
        user::{UserID, create_user, create_user_table},
    };

    use super::{AnalyticsPageState, AnalyticsQuery, get_analytics_page};

    fn get_page_state() -> (AnalyticsPageState, UserID) {
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
            AnalyticsPageState {
                db_connection: Arc::new(Mutex::new(connection)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user.id,
        )
    }

    fn seed_transaction(
        state: &AnalyticsPageState,
        user_id: UserID,
        transaction_type: TransactionType,
        category: &str,
        amount: f64,
        days_ago: i64,
    ) {
        create_transaction(
            NewTransaction {
                user_id,
                amount,
                transaction_type,
                category: category.to_string(),
                description: String::new(),
                date: OffsetDateTime::now_utc().date() - Duration::days(days_ago),
            },
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test transaction");
    }

    #[tokio::test]
    async fn render_page_with_totals_and_tabs() {
        let (state, user_id) = get_page_state();
        seed_transaction(&state, user_id, TransactionType::Income, "Salary", 50_000.0, 2);
        seed_transaction(&state, user_id, TransactionType::Expense, "Food", 1_200.0, 1);

        let response = get_analytics_page(
            State(state),
            Extension(user_id),
            Query(AnalyticsQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let body_text = html.root_element().text().collect::<Vec<_>>().join("");
        assert!(body_text.contains("Analytics"));
        assert!(
            body_text.contains("₹50,000"),
            "want income total, got {body_text}"
        );
        assert!(
            body_text.contains("₹1,200"),
            "want expense total, got {body_text}"
        );

        for tab in ["Week", "Month", "Year"] {
            assert!(body_text.contains(tab), "want period tab {tab}");
        }
    }

    #[tokio::test]
    async fn week_period_excludes_older_transactions() {
        let (state, user_id) = get_page_state();
        seed_transaction(&state, user_id, TransactionType::Income, "Salary", 50_000.0, 2);
        seed_transaction(&state, user_id, TransactionType::Income, "Bonus", 7_777.0, 20);

        let response = get_analytics_page(
            State(state),
            Extension(user_id),
            Query(AnalyticsQuery {
                period: Some("week".to_string()),
            }),
        )
        .await
        .unwrap();
        let html = parse_html_document(response).await;

        let body_text = html.root_element().text().collect::<Vec<_>>().join("");
        assert!(
            body_text.contains("₹50,000"),
            "want recent income included, got {body_text}"
        );
        assert!(
            !body_text.contains("₹57,777"),
            "older income should not count towards the total, got {body_text}"
        );
    }

    #[tokio::test]
    async fn render_page_with_no_transactions_shows_empty_state() {
        let (state, user_id) = get_page_state();

        let response = get_analytics_page(
            State(state),
            Extension(user_id),
            Query(AnalyticsQuery::default()),
        )
        .await
        .unwrap();
        let html = parse_html_document(response).await;

        let body_text = html.root_element().text().collect::<Vec<_>>().join("");
        assert!(
            body_text.contains("No income or expenses in this period yet."),
            "want empty state, got {body_text}"
        );
    }
}
