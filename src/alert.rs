//! Alert fragments that htmx swaps into the alert container at the top of
//! every page.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// A dismissable alert message shown in the `#alert-container` element.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// An alert indicating an action succeeded, with extra details.
    Success {
        /// The headline of the alert.
        message: String,
        /// Extra detail displayed under the headline.
        details: String,
    },
    /// An alert indicating an action succeeded.
    SuccessSimple {
        /// The headline of the alert.
        message: String,
    },
    /// An alert indicating an action failed, with extra details.
    Error {
        /// The headline of the alert.
        message: String,
        /// Extra detail displayed under the headline.
        details: String,
    },
}

impl Alert {
    /// Create an error alert from string slices.
    pub fn error(message: &str, details: &str) -> Self {
        Alert::Error {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    fn into_html(self) -> Markup {
        let (message, details, color_styles) = match self {
            Alert::Success { message, details } => (
                message,
                Some(details),
                "bg-green-50 border-green-400 text-green-800",
            ),
            Alert::SuccessSimple { message } => {
                (message, None, "bg-green-50 border-green-400 text-green-800")
            }
            Alert::Error { message, details } => (
                message,
                Some(details),
                "bg-red-50 border-red-400 text-red-800",
            ),
        };

        html! {
            div role="alert"
                class={ "mb-2 w-80 rounded-lg border p-4 shadow-lg " (color_styles) } {
                div class="flex items-start justify-between gap-2" {
                    p class="font-semibold" { (message) }
                    button type="button" class="font-bold"
                        onclick="this.closest('[role=alert]').remove()" { "✕" }
                }
                @if let Some(details) = details {
                    p class="mt-1 text-sm" { (details) }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
