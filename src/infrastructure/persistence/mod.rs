//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries mapped through `FromRow` row types.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Links, redirect lookup and atomic click counters
//! - [`PgProjectRepository`] - Projects and transactional project deletion
//! - [`PgAppRepository`] - Android / iOS app registrations and bindings
//! - [`PgCustomDomainRepository`] - Custom domains
//! - [`PgUserRepository`] - Subscription state
//! - [`PgTokenRepository`] - API token storage and validation

pub mod pg_app_repository;
pub mod pg_custom_domain_repository;
pub mod pg_link_repository;
pub mod pg_project_repository;
pub mod pg_token_repository;
pub mod pg_user_repository;
mod rows;

pub use pg_app_repository::PgAppRepository;
pub use pg_custom_domain_repository::PgCustomDomainRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_project_repository::PgProjectRepository;
pub use pg_token_repository::PgTokenRepository;
pub use pg_user_repository::PgUserRepository;
