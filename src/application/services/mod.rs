//! Business logic services for the application layer.

pub mod auth_service;
pub mod click_recorder;
pub mod domain_service;
pub mod link_service;
pub mod project_service;
pub mod redirect_service;
pub mod subscription_service;

pub use auth_service::AuthService;
pub use click_recorder::ClickRecorder;
pub use domain_service::DomainService;
pub use link_service::{CreateLink, LinkService};
pub use project_service::ProjectService;
pub use redirect_service::{RedirectOutcome, RedirectService};
pub use subscription_service::{SignatureError, SubscriptionEvent, SubscriptionService};
