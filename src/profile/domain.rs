//! Core profile domain types.

use serde::{Deserialize, Serialize};

use crate::user::UserID;

/// The color theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Light,
    Dark,
    /// Follow the operating system preference.
    System,
}

impl Theme {
    /// All themes in display order.
    pub const ALL: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::System];

    /// The identifier stored in the database and submitted by forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    /// The human readable name shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::System => "System",
        }
    }

    /// Parse a stored or submitted theme string. Unknown values fall back to
    /// [Theme::System].
    pub fn parse_or_default(raw: &str) -> Theme {
        match raw {
            "light" => Theme::Light,
            "dark" => Theme::Dark,
            _ => Theme::System,
        }
    }
}

/// A user's display preferences and notification settings.
///
/// Every user has exactly one profile, created with default values the first
/// time it is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: UserID,
    /// The display name shown in the UI. May be empty.
    pub name: String,
    /// An emoji or short string shown next to the name.
    pub avatar: String,
    pub theme: Theme,
    /// An ISO 4217 currency code, e.g. "INR".
    pub currency: String,
    pub email_notifications: bool,
    pub budget_reminders: bool,
}

impl Profile {
    /// The default profile for a user who has not saved any settings yet.
    pub fn default_for(user_id: UserID) -> Self {
        Self {
            user_id,
            name: String::new(),
            avatar: String::new(),
            theme: Theme::System,
            currency: "INR".to_string(),
            email_notifications: true,
            budget_reminders: true,
        }
    }
}

/// The raw strings submitted from the profile settings form.
///
/// The checkbox fields are `None` when unchecked.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileFormData {
    pub name: String,
    pub avatar: String,
    pub theme: String,
    pub currency: String,
    pub email_notifications: Option<String>,
    pub budget_reminders: Option<String>,
}

impl ProfileFormData {
    /// Convert the form data into a [Profile] owned by `user_id`.
    ///
    /// A blank currency falls back to "INR".
    pub fn to_profile(&self, user_id: UserID) -> Profile {
        let currency = match self.currency.trim() {
            "" => "INR".to_owned(),
            currency => currency.to_owned(),
        };

        Profile {
            user_id,
            name: self.name.trim().to_owned(),
            avatar: self.avatar.trim().to_owned(),
            theme: Theme::parse_or_default(self.theme.trim()),
            currency,
            email_notifications: self.email_notifications.is_some(),
            budget_reminders: self.budget_reminders.is_some(),
        }
    }
}


#[cfg(test)]
mod form_data_tests {
    use crate::user::UserID;

    use super::{ProfileFormData, Theme};

    #[test]
    fn converts_form_to_profile() {
        let form = ProfileFormData {
            name: " Priya ".to_string(),
            avatar: "🪷".to_string(),
            theme: "dark".to_string(),
            currency: "INR".to_string(),
            email_notifications: Some("on".to_string()),
            budget_reminders: None,
        };

        let profile = form.to_profile(UserID::new(1));

        assert_eq!(profile.name, "Priya");
        assert_eq!(profile.avatar, "🪷");
        assert_eq!(profile.theme, Theme::Dark);
        assert!(profile.email_notifications);
        assert!(!profile.budget_reminders);
    }

    #[test]
    fn blank_currency_falls_back_to_inr() {
        let form = ProfileFormData {
            name: String::new(),
            avatar: String::new(),
            theme: "system".to_string(),
            currency: "  ".to_string(),
            email_notifications: None,
            budget_reminders: None,
        };

        assert_eq!(form.to_profile(UserID::new(1)).currency, "INR");
    }
}
