//! The 500 Internal Server Error page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::Markup;

use crate::{endpoints, html::error_view};

/// The description and suggested fix shown on the 500 page.
pub struct InternalServerError<'a> {
    /// A short description of what went wrong.
    pub description: &'a str,
    /// A hint for how the user might resolve the error.
    pub fix: &'a str,
}

impl Default for InternalServerError<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs.",
        }
    }
}

impl InternalServerError<'_> {
    fn into_html(self) -> Markup {
        error_view("Internal Server Error", "500", self.description, self.fix)
    }
}

/// Render the 500 Internal Server Error page as a response.
pub fn render_internal_server_error(error: InternalServerError) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, error.into_html()).into_response()
}

/// The route handler for the internal server error page.
pub async fn get_internal_server_error_page() -> Response {
    render_internal_server_error(InternalServerError::default())
}

/// Create a response that redirects the client to the internal server error page via htmx.
pub fn get_internal_server_error_redirect() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
        (),
    )
        .into_response()
}
