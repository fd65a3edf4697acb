//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access behind the Repository pattern. Concrete
//! implementations live in `crate::infrastructure::persistence`; mocks are
//! generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Links, redirect lookup and click counters
//! - [`ProjectRepository`] - Projects and their bound apps
//! - [`AppRepository`] - Android / iOS app registrations
//! - [`CustomDomainRepository`] - Custom domains and verification state
//! - [`UserRepository`] - Subscription state
//! - [`TokenRepository`] - API token authentication
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod app_repository;
pub mod custom_domain_repository;
pub mod link_repository;
pub mod project_repository;
pub mod token_repository;
pub mod user_repository;

pub use app_repository::AppRepository;
pub use custom_domain_repository::CustomDomainRepository;
pub use link_repository::LinkRepository;
pub use project_repository::ProjectRepository;
pub use token_repository::{ApiToken, NewApiToken, TokenRepository};
pub use user_repository::UserRepository;

#[cfg(test)]
pub use app_repository::MockAppRepository;
#[cfg(test)]
pub use custom_domain_repository::MockCustomDomainRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use project_repository::MockProjectRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
