//! Domain layer containing business entities and the redirect decision logic.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`resolver`] - Host header → canonical project domain
//! - [`classifier`] - User agent → platform and crawler flag
//! - [`destination`] - Pure destination and channel selection
//!
//! # Redirect Flow
//!
//! 1. [`resolver::DomainResolver`] maps the `Host` header to a [`resolver::CanonicalDomain`]
//! 2. [`repositories::LinkRepository::find_for_redirect`] loads link, project and bound apps
//! 3. [`classifier::classify`] buckets the user agent
//! 4. [`destination::select_destination`] picks the URL and channel
//! 5. The click is recorded on a detached task after the response is built
//!    (see [`crate::application::services::ClickRecorder`])

pub mod classifier;
pub mod destination;
pub mod entities;
pub mod repositories;
pub mod resolver;
