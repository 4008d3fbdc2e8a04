//! Debt deletion endpoint.

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
    debt::delete_debt,
    user::UserID,
};

/// The state needed for deleting a debt.
#[derive(Debug, Clone)]
pub struct DeleteDebtEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteDebtEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle debt deletion. Returns a success alert or an error.
pub async fn delete_debt_endpoint(
    Path(debt_id): Path<DatabaseId>,
    State(state): State<DeleteDebtEndpointState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_debt(debt_id, user_id, &connection) {
        Ok(_) => Alert::SuccessSimple {
            message: "Debt deleted successfully".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingDebt) => Error::DeleteMissingDebt.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting debt {debt_id}: {error}");
            error.into_alert_response()
        }
    }
}
