//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::redirect_service::RedirectService`] - Public redirect resolution
//! - [`services::click_recorder::ClickRecorder`] - Detached click counting
//! - [`services::link_service::LinkService`] - Link creation, lookup and metadata backfill
//! - [`services::auth_service::AuthService`] - API token issuing and authentication
//! - [`services::project_service::ProjectService`] - Projects and app bindings
//! - [`services::domain_service::DomainService`] - Custom domain registration
//! - [`services::subscription_service::SubscriptionService`] - Payments webhook events

pub mod services;
