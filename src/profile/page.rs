//! The profile and settings page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    profile::{
        db::get_or_create_profile,
        domain::{Profile, Theme},
    },
    user::UserID,
};

/// The state needed for the profile page.
#[derive(Debug, Clone)]
pub struct ProfilePageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfilePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the profile settings page.
pub async fn get_profile_page(
    State(state): State<ProfilePageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let profile = get_or_create_profile(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve profile: {error}"))?;

    Ok(profile_view(&profile, "").into_response())
}

pub(super) fn profile_view(profile: &Profile, error_message: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::PROFILE_VIEW).into_html();
    let form = profile_form_view(profile, error_message);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold self-start mb-4" { "Profile" }

            (form)
        }
    };

    base("Profile", &[], &content)
}

pub(super) fn profile_form_view(profile: &Profile, error_message: &str) -> Markup {
    html! {
        form
            hx-put=(endpoints::PROFILE_API)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Display Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Your name"
                    value=(profile.name)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="avatar" class=(FORM_LABEL_STYLE) { "Avatar" }

                input
                    id="avatar"
                    type="text"
                    name="avatar"
                    maxlength="8"
                    placeholder="An emoji, e.g. 🪷"
                    value=(profile.avatar)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            fieldset
            {
                legend class=(FORM_LABEL_STYLE) { "Theme" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    @for theme in Theme::ALL {
                        div class="flex items-center gap-2"
                        {
                            input
                                id={ "theme-" (theme.as_str()) }
                                type="radio"
                                name="theme"
                                value=(theme.as_str())
                                checked[theme == profile.theme]
                                class=(FORM_RADIO_INPUT_STYLE);

                            label
                                for={ "theme-" (theme.as_str()) }
                                class=(FORM_RADIO_LABEL_STYLE)
                            {
                                (theme.label())
                            }
                        }
                    }
                }
            }

            div
            {
                label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }

                input
                    id="currency"
                    type="text"
                    name="currency"
                    maxlength="3"
                    placeholder="INR"
                    value=(profile.currency)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            fieldset
            {
                legend class=(FORM_LABEL_STYLE) { "Notifications" }

                div class="flex flex-col gap-2"
                {
                    div class="flex items-center gap-2"
                    {
                        input
                            id="email_notifications"
                            type="checkbox"
                            name="email_notifications"
                            checked[profile.email_notifications]
                            class=(FORM_RADIO_INPUT_STYLE);

                        label
                            for="email_notifications"
                            class="text-sm text-gray-900 dark:text-white"
                        {
                            "Email notifications"
                        }
                    }

                    div class="flex items-center gap-2"
                    {
                        input
                            id="budget_reminders"
                            type="checkbox"
                            name="budget_reminders"
                            checked[profile.budget_reminders]
                            class=(FORM_RADIO_INPUT_STYLE);

                        label
                            for="budget_reminders"
                            class="text-sm text-gray-900 dark:text-white"
                        {
                            "Budget reminders"
                        }
                    }
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Changes" }
        }
    }
}

#[cfg(test)]
mod profile_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        PasswordHash,
        endpoints,
        profile::{create_profile_table, db::get_or_create_profile, domain::{Profile, Theme}},
        test_utils::{
            assert_content_type, assert_form_submit_button_with_text, assert_hx_endpoint,
            assert_valid_html, must_get_form, parse_html_document,
        },
        user::{UserID, create_user, create_user_table},
    };

    use super::{ProfilePageState, get_profile_page};

    fn get_page_state() -> (ProfilePageState, UserID) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");
        create_profile_table(&connection).expect("Could not create profile table");

        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .expect("Could not create test user");

        (
            ProfilePageState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn render_page_with_default_profile() {
        let (state, user_id) = get_page_state();

        let response = get_profile_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::PROFILE_API, "hx-put");
        assert_form_submit_button_with_text(&form, "Save Changes");

        // The system theme is checked by default.
        let checked_system = Selector::parse("input#theme-system[checked]").unwrap();
        assert_eq!(html.select(&checked_system).count(), 1);
    }

    #[tokio::test]
    async fn render_page_with_saved_profile_prefills_values() {
        let (state, user_id) = get_page_state();
        {
            let connection = state.db_connection.lock().unwrap();
            get_or_create_profile(user_id, &connection).unwrap();
            crate::profile::update_profile(
                &Profile {
                    user_id,
                    name: "Priya".to_string(),
                    avatar: "🪷".to_string(),
                    theme: Theme::Dark,
                    currency: "INR".to_string(),
                    email_notifications: true,
                    budget_reminders: false,
                },
                &connection,
            )
            .unwrap();
        }

        let response = get_profile_page(State(state), Extension(user_id))
            .await
            .unwrap();
        let html = parse_html_document(response).await;

        let name_input = Selector::parse("input#name[value='Priya']").unwrap();
        assert_eq!(html.select(&name_input).count(), 1);

        let checked_dark = Selector::parse("input#theme-dark[checked]").unwrap();
        assert_eq!(html.select(&checked_dark).count(), 1);

        let unchecked_reminders = Selector::parse("input#budget_reminders[checked]").unwrap();
        assert_eq!(html.select(&unchecked_reminders).count(), 0);
    }
}
