//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/users/:user_id', use [format_endpoint].

use std::fmt::Display;

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying a user's transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page for listing a user's budgets.
pub const BUDGETS_VIEW: &str = "/budgets";
/// The page for creating a new budget.
pub const NEW_BUDGET_VIEW: &str = "/budgets/new";
/// The page for listing subscriptions and debts.
pub const BILLS_VIEW: &str = "/bills";
/// The page for creating a new subscription.
pub const NEW_SUBSCRIPTION_VIEW: &str = "/bills/subscriptions/new";
/// The page for creating a new debt.
pub const NEW_DEBT_VIEW: &str = "/bills/debts/new";
/// The page for spending charts and summaries.
pub const ANALYTICS_VIEW: &str = "/analytics";
/// The page showing transactions on a monthly calendar.
pub const CALENDAR_VIEW: &str = "/calendar";
/// The page for the user's profile and settings.
pub const PROFILE_VIEW: &str = "/profile";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route for instructions for resetting the user's password.
pub const FORGOT_PASSWORD_VIEW: &str = "/forgot_password";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register a user.
pub const USERS: &str = "/api/users";
/// The route to create a transaction.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to create a budget.
pub const BUDGETS_API: &str = "/api/budgets";
/// The route to delete a budget.
pub const DELETE_BUDGET: &str = "/api/budgets/{budget_id}";
/// The route to record an expense against a budget.
pub const BUDGET_SPEND: &str = "/api/budgets/{budget_id}/spend";
/// The route to create a subscription.
pub const SUBSCRIPTIONS_API: &str = "/api/subscriptions";
/// The route to delete a subscription.
pub const DELETE_SUBSCRIPTION: &str = "/api/subscriptions/{subscription_id}";
/// The route to create a debt.
pub const DEBTS_API: &str = "/api/debts";
/// The route to update (unsupported) or delete a debt.
pub const DEBT: &str = "/api/debts/{debt_id}";
/// The route to update the user's profile.
pub const PROFILE_API: &str = "/api/profile";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl Display) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::DASHBOARD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_TRANSACTION_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_TRANSACTION_VIEW);
        assert_endpoint_is_valid_uri(endpoints::BUDGETS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_BUDGET_VIEW);
        assert_endpoint_is_valid_uri(endpoints::BILLS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_SUBSCRIPTION_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_DEBT_VIEW);
        assert_endpoint_is_valid_uri(endpoints::ANALYTICS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::CALENDAR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::PROFILE_VIEW);
        assert_endpoint_is_valid_uri(endpoints::REGISTER_VIEW);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::FORGOT_PASSWORD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(endpoints::COFFEE);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_API);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::USERS);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_API);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::BUDGETS_API);
        assert_endpoint_is_valid_uri(endpoints::DELETE_BUDGET);
        assert_endpoint_is_valid_uri(endpoints::BUDGET_SPEND);
        assert_endpoint_is_valid_uri(endpoints::SUBSCRIPTIONS_API);
        assert_endpoint_is_valid_uri(endpoints::DELETE_SUBSCRIPTION);
        assert_endpoint_is_valid_uri(endpoints::DEBTS_API);
        assert_endpoint_is_valid_uri(endpoints::DEBT);
        assert_endpoint_is_valid_uri(endpoints::PROFILE_API);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn accepts_string_ids() {
        let formatted_path = format_endpoint("/transactions/{transaction_id}/edit", "abc-123");

        assert_eq!(formatted_path, "/transactions/abc-123/edit");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
