//! User display preferences and notification settings.

mod db;
mod domain;
mod page;
mod update;

pub use db::{create_profile_table, get_or_create_profile, update_profile};
pub use domain::{Profile, Theme};
pub use page::{ProfilePageState, get_profile_page};
pub use update::{UpdateProfileEndpointState, update_profile_endpoint};
