//! Recurring subscriptions and bills with a next billing date.

mod create;
mod db;
mod delete;
mod domain;

pub use create::{create_subscription_endpoint, get_new_subscription_page};
pub use db::{
    create_subscription, create_subscription_table, delete_subscription, get_subscription,
    get_subscriptions,
};
pub use delete::delete_subscription_endpoint;
pub use domain::{NewSubscription, Subscription};
