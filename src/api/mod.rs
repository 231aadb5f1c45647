//! Resource handlers for users, chirps, webhooks and admin endpoints.

pub mod admin;
pub mod chirps;
pub mod users;
pub mod webhooks;
