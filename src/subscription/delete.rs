//! Subscription deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    database_id::DatabaseId,
    subscription::delete_subscription,
    user::UserID,
};

/// The state needed for deleting a subscription.
#[derive(Debug, Clone)]
pub struct DeleteSubscriptionEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteSubscriptionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle subscription deletion. Returns a success alert or an error.
pub async fn delete_subscription_endpoint(
    Path(subscription_id): Path<DatabaseId>,
    State(state): State<DeleteSubscriptionEndpointState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_subscription(subscription_id, user_id, &connection) {
        Ok(_) => Alert::SuccessSimple {
            message: "Subscription deleted successfully".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingSubscription) => {
            Error::DeleteMissingSubscription.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting subscription {subscription_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
