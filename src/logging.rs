//! Middleware for logging requests and responses.

use axum::{extract::Request, http::header::CONTENT_TYPE, middleware::Next, response::Response};

/// The maximum number of body bytes logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Form fields whose values must never reach the logs.
const REDACTED_FIELDS: [&str; 2] = ["password", "confirm_password"];

/// Log each request and response at the `info` level.
///
/// Bodies longer than [LOG_BODY_LENGTH_LIMIT] bytes are truncated at `info`
/// and logged in full at `debug`. Password fields in urlencoded form bodies
/// are redacted first.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_text = body_to_text(body).await;

    let is_form_post = parts.method == axum::http::Method::POST
        && parts.headers.get(CONTENT_TYPE)
            == Some(&"application/x-www-form-urlencoded".parse().unwrap());

    let display_text = if is_form_post {
        REDACTED_FIELDS
            .iter()
            .fold(body_text.clone(), |text, field| {
                redact_field(&text, field)
            })
    } else {
        body_text.clone()
    };

    log_payload("Received request", &format!("{parts:#?}"), &display_text);

    let response = next
        .run(Request::from_parts(parts, body_text.into()))
        .await;

    let (parts, body) = response.into_parts();
    let body_text = body_to_text(body).await;
    log_payload("Sending response", &format!("{parts:#?}"), &body_text);

    Response::from_parts(parts, body_text.into())
}

async fn body_to_text(body: axum::body::Body) -> String {
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    String::from_utf8_lossy(&body_bytes).to_string()
}

fn redact_field(form_text: &str, field_name: &str) -> String {
    let start = match form_text.find(&format!("{field_name}=")) {
        Some(position) => position,
        None => return form_text.to_string(),
    };

    let end = form_text[start..]
        .find('&')
        .map(|offset| start + offset)
        .unwrap_or(form_text.len());

    form_text.replace(&form_text[start..end], &format!("{field_name}=********"))
}

fn log_payload(direction: &str, headers: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "{direction}: {headers}\nbody: {}...",
            &body[..LOG_BODY_LENGTH_LIMIT]
        );
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{direction}: {headers}\nbody: {body:?}");
    }
}
