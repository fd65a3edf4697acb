//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod links;
pub mod redirect;
pub mod webhooks;
pub mod well_known;

pub use health::health_handler;
pub use links::{create_link_handler, lookup_link_handler};
pub use redirect::{fallback_handler, redirect_handler};
pub use webhooks::subscription_webhook_handler;
pub use well_known::{apple_app_site_association_handler, asset_links_handler};
