//! Mobile app registrations that a project can bind to.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct AndroidApp {
    pub id: i64,
    pub user_id: String,
    pub project_id: Option<i64>,
    pub package_name: String,
    pub sha256_cert_fingerprints: Vec<String>,
    pub store_link: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAndroidApp {
    pub user_id: String,
    pub package_name: String,
    pub sha256_cert_fingerprints: Vec<String>,
    pub store_link: String,
}

#[derive(Debug, Clone)]
pub struct IosApp {
    pub id: i64,
    pub user_id: String,
    pub project_id: Option<i64>,
    pub bundle_id: String,
    pub team_id: String,
    pub store_link: String,
    pub created_at: DateTime<Utc>,
}

impl IosApp {
    /// Application identifier as used in the association file: `<team>.<bundle>`.
    pub fn app_id(&self) -> String {
        format!("{}.{}", self.team_id, self.bundle_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewIosApp {
    pub user_id: String,
    pub bundle_id: String,
    pub team_id: String,
    pub store_link: String,
}
