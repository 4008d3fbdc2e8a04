//! Middleware that gates routes behind a valid auth cookie.
//!
//! On success the authenticated [UserID](crate::user::UserID) is inserted
//! into the request extensions, so handlers can receive it with
//! `Extension(user_id): Extension<UserID>`. On failure the client is sent
//! to the log-in page, carrying the original URL so it can be restored
//! after logging in.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::{
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
    timezone::get_local_offset,
};

/// A session is extended by this much on each authenticated request.
const SLIDING_EXPIRY_EXTENSION: Duration = Duration::minutes(5);

/// The state needed for the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    /// The key used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long a fresh auth cookie stays valid.
    pub cookie_duration: Duration,
    /// A canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Guard for regular page requests.
///
/// Unauthenticated clients receive a 303 redirect to the log-in page.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    run_auth_guard(state, request, next, |log_in_url| {
        Redirect::to(log_in_url).into_response()
    })
    .await
}

/// Guard for HTMX-driven API requests.
///
/// HTMX ignores the Location header of a plain redirect response, so
/// unauthenticated clients receive a 200 with an `HX-Redirect` header
/// instead.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    run_auth_guard(state, request, next, |log_in_url| {
        (HxRedirect(log_in_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}

#[inline]
async fn run_auth_guard(
    state: AuthState,
    request: Request,
    next: Next,
    redirect_with: impl Fn(&str) -> Response,
) -> Response {
    let log_in_url = build_log_in_redirect_url(&request).unwrap_or_else(|| {
        if request.uri().path().starts_with("/api") {
            tracing::warn!(
                "Missing or invalid HTMX headers for /api request. Falling back to dashboard."
            );
        } else {
            tracing::warn!("Invalid redirect URL from request URI. Falling back to dashboard.");
        }

        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    });

    let local_offset = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => {
            tracing::error!("Error getting local timezone. Redirecting to log in page.");
            return redirect_with(&log_in_url);
        }
    };

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Redirecting to log in page.");
            return redirect_with(&log_in_url);
        }
    };

    let user_id = match get_token_from_cookies(&jar) {
        Ok(token) => token.user_id,
        Err(_) => return redirect_with(&log_in_url),
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    // Sliding expiry: an active user keeps their session alive.
    let jar = match extend_auth_cookie_duration_if_needed(
        jar.clone(),
        SLIDING_EXPIRY_EXTENSION,
        local_offset,
    ) {
        Ok(updated_jar) => updated_jar,
        Err(err) => {
            tracing::error!("Error extending cookie duration: {err:?}. Rolling back cookie jar.");
            jar
        }
    };

    let (mut parts, body) = response.into_parts();

    for (key, value) in jar.into_response().headers() {
        if key == SET_COOKIE {
            parts.headers.append(key, value.to_owned());
        }
    }

    Response::from_parts(parts, body)
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{
        Router,
        extract::State,
        middleware,
        response::Html,
        routing::{get, post},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key, SameSite},
    };
    use axum_test::TestServer;
    use sha2::Digest;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::{
            AuthState, COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, auth_guard, auth_guard_hx,
            set_auth_cookie,
        },
        endpoints,
        timezone::get_local_offset,
        user::UserID,
    };

    const LOG_IN_ROUTE: &str = "/log_in";
    const PROTECTED_PAGE_ROUTE: &str = "/protected";
    const PROTECTED_API_ROUTE: &str = "/api/protected";

    async fn protected_handler() -> Html<&'static str> {
        Html("<h1>secret stuff</h1>")
    }

    async fn stub_log_in_route(
        State(state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        let local_timezone = get_local_offset(&state.local_timezone).unwrap();

        set_auth_cookie(jar, UserID::new(1), state.cookie_duration, local_timezone)
    }

    fn test_auth_state(cookie_duration: Duration) -> AuthState {
        let hash = sha2::Sha512::digest("the world's least guessable secret");

        AuthState {
            cookie_key: Key::from(&hash),
            cookie_duration,
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn page_test_server(cookie_duration: Duration) -> TestServer {
        let state = test_auth_state(cookie_duration);

        let app = Router::new()
            .route(PROTECTED_PAGE_ROUTE, get(protected_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .route(LOG_IN_ROUTE, post(stub_log_in_route))
            .with_state(state);

        TestServer::new(app)
    }

    fn api_test_server(cookie_duration: Duration) -> TestServer {
        let state = test_auth_state(cookie_duration);

        let app = Router::new()
            .route(PROTECTED_API_ROUTE, get(protected_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx))
            .with_state(state);

        TestServer::new(app)
    }

    fn expected_log_in_location(redirect_url: &str) -> String {
        let query = serde_urlencoded::to_string([("redirect_url", redirect_url)]).unwrap();

        format!("{}?{}", endpoints::LOG_IN_VIEW, query)
    }

    #[track_caller]
    fn assert_date_time_close(left: OffsetDateTime, right: OffsetDateTime) {
        assert!(
            (left - right).abs() < Duration::seconds(1),
            "got date time {left:?}, want {right:?}"
        );
    }

    #[tokio::test]
    async fn valid_cookie_reaches_the_protected_route() {
        let server = page_test_server(DEFAULT_COOKIE_DURATION);
        let response = server.post(LOG_IN_ROUTE).await;
        response.assert_status_ok();

        server
            .get(PROTECTED_PAGE_ROUTE)
            .add_cookie(response.cookie(COOKIE_TOKEN))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn authenticated_request_receives_a_refreshed_cookie() {
        let server = page_test_server(DEFAULT_COOKIE_DURATION);
        let response = server.post(LOG_IN_ROUTE).await;
        response.assert_status_ok();

        let response = server
            .get(PROTECTED_PAGE_ROUTE)
            .add_cookies(response.cookies())
            .await;

        assert!(
            response.cookies().get(COOKIE_TOKEN).is_some(),
            "expected token cookie to be set by auth guard"
        );
    }

    #[tokio::test]
    async fn short_lived_cookie_is_extended_on_use() {
        let server = page_test_server(Duration::seconds(5));
        let response = server.post(LOG_IN_ROUTE).await;
        response.assert_status_ok();

        let response_time = OffsetDateTime::now_utc();
        let jar = response.cookies();
        assert_date_time_close(
            jar.get(COOKIE_TOKEN).unwrap().expires_datetime().unwrap(),
            response_time + Duration::seconds(5),
        );

        let response = server.get(PROTECTED_PAGE_ROUTE).add_cookies(jar).await;

        let auth_cookie = response.cookie(COOKIE_TOKEN);
        assert_date_time_close(
            auth_cookie.expires_datetime().unwrap(),
            response_time + Duration::minutes(5),
        );
        assert_eq!(auth_cookie.secure(), Some(true));
        assert_eq!(auth_cookie.http_only(), Some(true));
        assert_eq!(auth_cookie.same_site(), Some(SameSite::Strict));
    }

    #[tokio::test]
    async fn missing_cookie_redirects_to_log_in() {
        let server = page_test_server(DEFAULT_COOKIE_DURATION);

        let response = server.get(PROTECTED_PAGE_ROUTE).await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("location"),
            expected_log_in_location(PROTECTED_PAGE_ROUTE)
        );
    }

    #[tokio::test]
    async fn garbage_cookie_redirects_to_log_in() {
        let server = page_test_server(DEFAULT_COOKIE_DURATION);

        let response = server
            .get(PROTECTED_PAGE_ROUTE)
            .add_cookie(Cookie::build((COOKIE_TOKEN, "FOOBAR")).build())
            .await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("location"),
            expected_log_in_location(PROTECTED_PAGE_ROUTE)
        );
    }

    #[tokio::test]
    async fn expired_cookie_redirects_to_log_in() {
        let server = page_test_server(DEFAULT_COOKIE_DURATION);
        let response = server.post(LOG_IN_ROUTE).await;
        response.assert_status_ok();

        let mut token_cookie = response.cookie(COOKIE_TOKEN);
        token_cookie.set_expires(OffsetDateTime::UNIX_EPOCH);

        let response = server
            .get(PROTECTED_PAGE_ROUTE)
            .add_cookie(token_cookie)
            .await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("location"),
            expected_log_in_location(PROTECTED_PAGE_ROUTE)
        );
    }

    #[tokio::test]
    async fn api_route_uses_hx_current_url_for_redirect() {
        let server = api_test_server(DEFAULT_COOKIE_DURATION);
        let current_url = "/transactions?month=2025-10";

        let response = server
            .get(PROTECTED_API_ROUTE)
            .add_header("HX-Request", "true")
            .add_header("HX-Current-URL", current_url)
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header("hx-redirect"),
            expected_log_in_location(current_url)
        );
    }
}
