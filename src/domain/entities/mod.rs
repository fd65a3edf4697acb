//! Domain entities representing core business objects.
//!
//! Entities are plain data structures with no persistence logic; row mapping
//! lives in [`crate::infrastructure::persistence`].

pub mod app;
pub mod custom_domain;
pub mod link;
pub mod project;
pub mod user;

pub use app::{AndroidApp, IosApp, NewAndroidApp, NewIosApp};
pub use custom_domain::{CustomDomain, DnsChallenge};
pub use link::{ClickCounters, Link, LinkMetadata, NewLink, ResolvedLink};
pub use project::{NewProject, Project, ProjectApps, ProjectIdentity};
pub use user::{NewUser, SubscriptionUpdate, User};
