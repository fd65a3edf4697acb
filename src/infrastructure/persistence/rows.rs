//! Row types shared by the PostgreSQL repositories and their mapping to entities.
//!
//! Joined queries alias project columns with `p_`, Android app columns with
//! `a_` and iOS app columns with `i_` so the flattened rows stay unambiguous.

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::types::Json;

use crate::domain::entities::{
    AndroidApp, ClickCounters, CustomDomain, DnsChallenge, IosApp, Link, LinkMetadata, Project,
    ProjectIdentity, User,
};
use crate::error::AppError;

#[derive(sqlx::FromRow)]
pub(crate) struct LinkRow {
    pub id: i64,
    pub project_id: i64,
    pub domain: String,
    pub code: String,
    pub long_url: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_image: Option<String>,
    pub android_referrer: Option<String>,
    pub clicks: i64,
    pub app_store_redirects: i64,
    pub play_store_redirects: i64,
    pub general_redirects: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link {
            id: r.id,
            project_id: r.project_id,
            domain: r.domain,
            code: r.code,
            long_url: r.long_url,
            metadata: LinkMetadata {
                title: r.meta_title,
                description: r.meta_description,
                image: r.meta_image,
            },
            android_referrer: r.android_referrer,
            counters: ClickCounters {
                clicks: r.clicks,
                app_store_redirects: r.app_store_redirects,
                play_store_redirects: r.play_store_redirects,
                general_redirects: r.general_redirects,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Project columns aliased with the `p_` prefix.
#[derive(sqlx::FromRow)]
pub(crate) struct ProjectRow {
    pub p_id: i64,
    pub p_user_id: String,
    pub p_name: String,
    pub p_description: Option<String>,
    pub p_subdomain: Option<String>,
    pub p_custom_domain: Option<String>,
    pub p_created_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = AppError;

    fn try_from(r: ProjectRow) -> Result<Self, Self::Error> {
        let identity = match (r.p_subdomain, r.p_custom_domain) {
            (Some(label), None) => ProjectIdentity::Subdomain(label),
            (None, Some(host)) => ProjectIdentity::CustomDomain(host),
            _ => {
                return Err(AppError::internal(
                    "Project has no single public identity",
                    json!({ "project_id": r.p_id }),
                ));
            }
        };

        Ok(Project {
            id: r.p_id,
            user_id: r.p_user_id,
            name: r.p_name,
            description: r.p_description,
            identity,
            created_at: r.p_created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct AndroidAppRow {
    pub id: i64,
    pub user_id: String,
    pub project_id: Option<i64>,
    pub package_name: String,
    pub sha256_cert_fingerprints: Json<Vec<String>>,
    pub store_link: String,
    pub created_at: DateTime<Utc>,
}

impl From<AndroidAppRow> for AndroidApp {
    fn from(r: AndroidAppRow) -> Self {
        AndroidApp {
            id: r.id,
            user_id: r.user_id,
            project_id: r.project_id,
            package_name: r.package_name,
            sha256_cert_fingerprints: r.sha256_cert_fingerprints.0,
            store_link: r.store_link,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct IosAppRow {
    pub id: i64,
    pub user_id: String,
    pub project_id: Option<i64>,
    pub bundle_id: String,
    pub team_id: String,
    pub store_link: String,
    pub created_at: DateTime<Utc>,
}

impl From<IosAppRow> for IosApp {
    fn from(r: IosAppRow) -> Self {
        IosApp {
            id: r.id,
            user_id: r.user_id,
            project_id: r.project_id,
            bundle_id: r.bundle_id,
            team_id: r.team_id,
            store_link: r.store_link,
            created_at: r.created_at,
        }
    }
}

/// App columns from `LEFT JOIN`s, every field nullable.
#[derive(sqlx::FromRow)]
pub(crate) struct JoinedAppsRow {
    pub a_id: Option<i64>,
    pub a_user_id: Option<String>,
    pub a_package_name: Option<String>,
    pub a_fingerprints: Option<Json<Vec<String>>>,
    pub a_store_link: Option<String>,
    pub a_created_at: Option<DateTime<Utc>>,
    pub i_id: Option<i64>,
    pub i_user_id: Option<String>,
    pub i_bundle_id: Option<String>,
    pub i_team_id: Option<String>,
    pub i_store_link: Option<String>,
    pub i_created_at: Option<DateTime<Utc>>,
}

impl JoinedAppsRow {
    pub fn into_apps(self, project_id: i64) -> (Option<AndroidApp>, Option<IosApp>) {
        let android = match (
            self.a_id,
            self.a_user_id,
            self.a_package_name,
            self.a_store_link,
            self.a_created_at,
        ) {
            (Some(id), Some(user_id), Some(package_name), Some(store_link), Some(created_at)) => {
                Some(AndroidApp {
                    id,
                    user_id,
                    project_id: Some(project_id),
                    package_name,
                    sha256_cert_fingerprints: self.a_fingerprints.map(|f| f.0).unwrap_or_default(),
                    store_link,
                    created_at,
                })
            }
            _ => None,
        };

        let ios = match (
            self.i_id,
            self.i_user_id,
            self.i_bundle_id,
            self.i_team_id,
            self.i_store_link,
            self.i_created_at,
        ) {
            (
                Some(id),
                Some(user_id),
                Some(bundle_id),
                Some(team_id),
                Some(store_link),
                Some(created_at),
            ) => Some(IosApp {
                id,
                user_id,
                project_id: Some(project_id),
                bundle_id,
                team_id,
                store_link,
                created_at,
            }),
            _ => None,
        };

        (android, ios)
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct CustomDomainRow {
    pub id: i64,
    pub user_id: String,
    pub domain: String,
    pub challenges: Json<Vec<DnsChallenge>>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<CustomDomainRow> for CustomDomain {
    fn from(r: CustomDomainRow) -> Self {
        CustomDomain {
            id: r.id,
            user_id: r.user_id,
            domain: r.domain,
            challenges: r.challenges.0,
            verified: r.verified,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub subscription_id: Option<String>,
    pub customer_id: Option<String>,
    pub price_id: Option<String>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            email: r.email,
            name: r.name,
            subscription_id: r.subscription_id,
            customer_id: r.customer_id,
            price_id: r.price_id,
            current_period_end: r.current_period_end,
            created_at: r.created_at,
        }
    }
}
