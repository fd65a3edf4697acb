//! Project entity and its public identity.

use chrono::{DateTime, Utc};

use super::{AndroidApp, IosApp};

/// The single public identity a project is routed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectIdentity {
    /// Bare label under the platform root domain, e.g. `foo` for `foo.<root>`.
    Subdomain(String),
    /// A full host name owned by the user.
    CustomDomain(String),
}

/// A namespace owning links and at most one Android and one iOS app binding.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub identity: ProjectIdentity,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Canonical host of this project given the platform root domain.
    pub fn public_domain(&self, root_domain: &str) -> String {
        match &self.identity {
            ProjectIdentity::Subdomain(label) => format!("{}.{}", label, root_domain),
            ProjectIdentity::CustomDomain(host) => host.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub identity: ProjectIdentity,
}

/// A project together with its bound apps.
#[derive(Debug, Clone)]
pub struct ProjectApps {
    pub project: Project,
    pub android_app: Option<AndroidApp>,
    pub ios_app: Option<IosApp>,
}
