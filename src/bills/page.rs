//! Bills page combining upcoming subscriptions, upcoming debt payments and a
//! debt overview.

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
    bills::due::{DueStatus, days_until_due, due_label},
    debt::{Debt, get_debts, payment_progress},
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, progress_bar,
    },
    navigation::NavBar,
    subscription::{Subscription, get_subscriptions},
    timezone::get_local_offset,
    user::UserID,
};

/// The state needed for the bills page.
#[derive(Debug, Clone)]
pub struct BillsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for BillsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A subscription or debt payment with the strings needed to render its row
/// in the upcoming list.
#[derive(Debug, Clone)]
struct UpcomingBill {
    name: String,
    kind_label: &'static str,
    amount_text: String,
    date: Date,
    date_text: String,
    due_text: String,
    due_badge_class: &'static str,
    delete_url: String,
    confirm_message: String,
}

impl UpcomingBill {
    fn from_subscription(subscription: &Subscription, today: Date) -> Self {
        let days = days_until_due(subscription.next_billing_date, today);

        Self {
            name: subscription.name.clone(),
            kind_label: subscription.frequency.label(),
            amount_text: format_currency(subscription.amount),
            date: subscription.next_billing_date,
            date_text: subscription.next_billing_date.to_string(),
            due_text: due_label(days),
            due_badge_class: DueStatus::from_days(days).badge_class(),
            delete_url: endpoints::format_endpoint(
                endpoints::DELETE_SUBSCRIPTION,
                subscription.id,
            ),
            confirm_message: format!(
                "Are you sure you want to delete the subscription '{}'?",
                subscription.name
            ),
        }
    }

    fn from_debt(debt: &Debt, today: Date) -> Self {
        let days = days_until_due(debt.due_date, today);

        Self {
            name: debt.name.clone(),
            kind_label: debt.debt_type.label(),
            amount_text: format_currency(debt.minimum_payment),
            date: debt.due_date,
            date_text: debt.due_date.to_string(),
            due_text: due_label(days),
            due_badge_class: DueStatus::from_days(days).badge_class(),
            delete_url: endpoints::format_endpoint(endpoints::DEBT, debt.id),
            confirm_message: format!("Are you sure you want to delete the debt '{}'?", debt.name),
        }
    }
}

/// A debt with the strings needed to render its row in the overview table.
#[derive(Debug, Clone)]
struct DebtRow {
    name: String,
    type_label: &'static str,
    remaining_text: String,
    percent: u8,
    paid_text: String,
    total_text: String,
    due_date_text: String,
    delete_url: String,
    confirm_message: String,
}

impl DebtRow {
    fn new(debt: &Debt) -> Self {
        Self {
            name: debt.name.clone(),
            type_label: debt.debt_type.label(),
            remaining_text: format_currency(debt.remaining),
            percent: payment_progress(debt.total, debt.remaining),
            paid_text: format_currency(debt.total - debt.remaining),
            total_text: format_currency(debt.total),
            due_date_text: debt.due_date.to_string(),
            delete_url: endpoints::format_endpoint(endpoints::DEBT, debt.id),
            confirm_message: format!("Are you sure you want to delete the debt '{}'?", debt.name),
        }
    }
}

/// Render the bills page.
pub async fn get_bills_page(
    State(state): State<BillsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

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

    let mut upcoming: Vec<UpcomingBill> = subscriptions
        .iter()
        .map(|subscription| UpcomingBill::from_subscription(subscription, today))
        .chain(debts.iter().map(|debt| UpcomingBill::from_debt(debt, today)))
        .collect();
    upcoming.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));

    let total_outstanding = debts.iter().map(|debt| debt.remaining).sum::<f64>();
    let debt_rows = debts.iter().map(DebtRow::new).collect::<Vec<_>>();

    Ok(bills_view(&upcoming, &debt_rows, total_outstanding).into_response())
}

fn bills_view(upcoming: &[UpcomingBill], debt_rows: &[DebtRow], total_outstanding: f64) -> Markup {
    let nav_bar = NavBar::new(endpoints::BILLS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-3xl"
            {
                header class="flex justify-between flex-wrap items-end gap-2"
                {
                    h1 class="text-xl font-bold" { "Upcoming Bills" }

                    div class="flex gap-4"
                    {
                        a href=(endpoints::NEW_SUBSCRIPTION_VIEW) class=(LINK_STYLE)
                        {
                            "Add Subscription"
                        }

                        a href=(endpoints::NEW_DEBT_VIEW) class=(LINK_STYLE)
                        {
                            "Add Debt"
                        }
                    }
                }

                ul class="space-y-3"
                {
                    @for bill in upcoming {
                        li class=(CARD_STYLE) data-bill-row="true"
                        {
                            (upcoming_bill_view(bill))
                        }
                    }

                    @if upcoming.is_empty() {
                        li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                        {
                            "You haven't added any subscriptions or bills yet."
                        }
                    }
                }
            }

            section class="mt-8 space-y-4 w-full max-w-3xl"
            {
                header class="flex justify-between flex-wrap items-end gap-2"
                {
                    h2 class="text-xl font-bold" { "Debt Overview" }

                    @if !debt_rows.is_empty() {
                        p class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            "Total outstanding: "
                            span class="font-semibold tabular-nums"
                            {
                                (format_currency(total_outstanding))
                            }
                        }
                    }
                }

                @if debt_rows.is_empty() {
                    p class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                    {
                        "You haven't added any debts yet."
                    }
                } @else {
                    div class="relative overflow-x-auto rounded shadow-md"
                    {
                        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                        {
                            thead class=(TABLE_HEADER_STYLE)
                            {
                                tr
                                {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Remaining" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Progress" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Due Date" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                }
                            }

                            tbody
                            {
                                @for row in debt_rows {
                                    tr class=(TABLE_ROW_STYLE) data-debt-row="true"
                                    {
                                        (debt_row_view(row))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Bills", &[], &content)
}

fn upcoming_bill_view(bill: &UpcomingBill) -> Markup {
    html!(
        div class="flex items-start justify-between gap-3"
        {
            div
            {
                h2 class="text-base font-semibold text-gray-900 dark:text-white"
                {
                    (bill.name)
                }

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    (bill.kind_label) " · " (bill.date_text)
                }
            }

            div class="flex flex-col items-end gap-2"
            {
                span class="font-semibold tabular-nums text-gray-900 dark:text-white"
                {
                    (bill.amount_text)
                }

                span class=(bill.due_badge_class) { (bill.due_text) }

                button
                    type="button"
                    class=(BUTTON_DELETE_STYLE)
                    hx-delete=(bill.delete_url)
                    hx-confirm=(bill.confirm_message)
                    hx-target="closest [data-bill-row='true']"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                {
                    "Delete"
                }
            }
        }
    )
}

fn debt_row_view(row: &DebtRow) -> Markup {
    html!(
        td class=(TABLE_CELL_STYLE)
        {
            span class="font-medium text-gray-900 dark:text-white" { (row.name) }
        }

        td class=(TABLE_CELL_STYLE) { (row.type_label) }

        td class={ (TABLE_CELL_STYLE) " tabular-nums" } { (row.remaining_text) }

        td class=(TABLE_CELL_STYLE)
        {
            div class="min-w-32 space-y-1"
            {
                (progress_bar(row.percent))

                span class="text-xs tabular-nums"
                {
                    (row.paid_text) " paid of " (row.total_text)
                }
            }
        }

        td class=(TABLE_CELL_STYLE) { (row.due_date_text) }

        td class=(TABLE_CELL_STYLE)
        {
            button
                type="button"
                class=(BUTTON_DELETE_STYLE)
                hx-delete=(row.delete_url)
                hx-confirm=(row.confirm_message)
                hx-target="closest [data-debt-row='true']"
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
            {
                "Delete"
            }
        }
    )
}
