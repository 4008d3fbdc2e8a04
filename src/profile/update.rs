//! Profile update endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    endpoints,
    profile::{
        db::{get_or_create_profile, update_profile},
        domain::ProfileFormData,
    },
    user::UserID,
};

/// The state needed for updating a profile.
#[derive(Debug, Clone)]
pub struct UpdateProfileEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateProfileEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle profile settings form submission.
pub async fn update_profile_endpoint(
    State(state): State<UpdateProfileEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<ProfileFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    // Users who have never saved settings get a default row first, so the
    // update below only fails when the user no longer exists.
    if let Err(error) = get_or_create_profile(user_id, &connection) {
        tracing::error!("Failed to retrieve profile: {error}");
        return error.into_alert_response();
    }

    let profile = form_data.to_profile(user_id);

    match update_profile(&profile, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::PROFILE_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingProfile) => Error::UpdateMissingProfile.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating a profile: {error}");
            error.into_alert_response()
        }
    }
}
