//! Debt update endpoint. Debts cannot be edited once created.

use axum::{extract::Path, response::Response};

use crate::{Error, database_id::DatabaseId};

/// Reject debt edits. Debts are immutable once created, so this always
/// responds with an error alert telling the user to delete and recreate
/// the debt instead.
pub async fn update_debt_endpoint(Path(debt_id): Path<DatabaseId>) -> Response {
    tracing::debug!("rejected attempt to edit debt {debt_id}");

    Error::DebtUpdateUnsupported.into_alert_response()
}
