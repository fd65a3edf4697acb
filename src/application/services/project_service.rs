//! Projects, app registrations and well-known document lookup.

use regex::Regex;
use serde_json::json;
use std::sync::{Arc, LazyLock};

use crate::domain::entities::{
    AndroidApp, IosApp, NewAndroidApp, NewIosApp, NewProject, Project, ProjectApps,
    ProjectIdentity,
};
use crate::domain::repositories::{AppRepository, CustomDomainRepository, ProjectRepository};
use crate::domain::resolver::{CanonicalDomain, DomainResolver};
use crate::error::AppError;
use crate::utils::url_normalizer::normalize_url;

static FINGERPRINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9A-F]{2}:){31}[0-9A-F]{2}$").unwrap());

static PACKAGE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$").unwrap()
});

static TEAM_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z0-9]{10}$").unwrap());

/// Service for project lifecycle and mobile app bindings.
pub struct ProjectService<P, A, C>
where
    P: ProjectRepository,
    A: AppRepository,
    C: CustomDomainRepository,
{
    project_repository: Arc<P>,
    app_repository: Arc<A>,
    custom_domain_repository: Arc<C>,
    resolver: DomainResolver,
}

impl<P, A, C> ProjectService<P, A, C>
where
    P: ProjectRepository,
    A: AppRepository,
    C: CustomDomainRepository,
{
    pub fn new(
        project_repository: Arc<P>,
        app_repository: Arc<A>,
        custom_domain_repository: Arc<C>,
        resolver: DomainResolver,
    ) -> Self {
        Self {
            project_repository,
            app_repository,
            custom_domain_repository,
            resolver,
        }
    }

    /// Creates a project routed by a subdomain label or one of the user's
    /// registered custom domains.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for an empty name or malformed identity
    /// - [`AppError::NotFound`] if the custom domain is not registered to the user
    /// - [`AppError::Conflict`] if the identity is already taken
    pub async fn create_project(
        &self,
        user_id: &str,
        name: &str,
        description: Option<String>,
        identity: ProjectIdentity,
    ) -> Result<Project, AppError> {
        let name = name.trim();
        if name.is_empty() || name.len() > 255 {
            return Err(AppError::bad_request(
                "Project name must be 1-255 characters",
                json!({ "name": name }),
            ));
        }

        let identity = match identity {
            ProjectIdentity::Subdomain(label) => {
                ProjectIdentity::Subdomain(self.validate_subdomain(&label)?)
            }
            ProjectIdentity::CustomDomain(host) => {
                ProjectIdentity::CustomDomain(self.validate_custom_domain(user_id, &host).await?)
            }
        };

        let project = self
            .project_repository
            .create(NewProject {
                user_id: user_id.to_string(),
                name: name.to_string(),
                description: description.filter(|d| !d.trim().is_empty()),
                identity,
            })
            .await?;

        tracing::info!(project_id = project.id, user_id, "Project created");
        Ok(project)
    }

    fn validate_subdomain(&self, input: &str) -> Result<String, AppError> {
        let label = self.resolver.project_key(input);
        if !DomainResolver::is_valid_label(&label) {
            return Err(AppError::bad_request(
                "Invalid subdomain",
                json!({
                    "subdomain": input,
                    "reason": "Use 1-63 lowercase letters, digits or hyphens; 'www' is reserved",
                }),
            ));
        }
        Ok(label)
    }

    async fn validate_custom_domain(&self, user_id: &str, input: &str) -> Result<String, AppError> {
        let host = match self.resolver.resolve(Some(input)) {
            Some(CanonicalDomain::Custom(host)) => host,
            _ => {
                return Err(AppError::bad_request(
                    "Invalid custom domain",
                    json!({ "customDomain": input }),
                ));
            }
        };

        match self.custom_domain_repository.find_by_domain(&host).await? {
            Some(domain) if domain.user_id == user_id => Ok(host),
            _ => Err(AppError::not_found(
                "Custom domain not found",
                json!({ "customDomain": host }),
            )),
        }
    }

    pub async fn list_projects(&self, user_id: &str) -> Result<Vec<Project>, AppError> {
        self.project_repository.list_by_user(user_id).await
    }

    /// Deletes a project together with its links, leaving its apps unbound.
    pub async fn delete_project(&self, user_id: &str, project_id: i64) -> Result<(), AppError> {
        if !self.project_repository.delete(user_id, project_id).await? {
            return Err(AppError::not_found(
                "Project not found",
                json!({ "project_id": project_id }),
            ));
        }
        tracing::info!(project_id, user_id, "Project deleted");
        Ok(())
    }

    /// Project and bound apps for a request host, used by the well-known
    /// endpoints. Unresolvable hosts and unknown projects yield `None`.
    pub async fn find_for_host(&self, host: Option<&str>) -> Result<Option<ProjectApps>, AppError> {
        match self.resolver.resolve(host) {
            Some(domain) => self.project_repository.find_with_apps(&domain).await,
            None => Ok(None),
        }
    }

    /// Registers an Android app and optionally binds it to a project.
    pub async fn register_android_app(
        &self,
        app: NewAndroidApp,
        project_id: Option<i64>,
    ) -> Result<AndroidApp, AppError> {
        let app = validate_android_app(app)?;
        let user_id = app.user_id.clone();
        let created = self.app_repository.create_android(app).await?;

        match project_id {
            Some(project_id) => {
                self.app_repository
                    .bind_android(&user_id, created.id, Some(project_id))
                    .await
            }
            None => Ok(created),
        }
    }

    /// Registers an iOS app and optionally binds it to a project.
    pub async fn register_ios_app(
        &self,
        app: NewIosApp,
        project_id: Option<i64>,
    ) -> Result<IosApp, AppError> {
        let app = validate_ios_app(app)?;
        let user_id = app.user_id.clone();
        let created = self.app_repository.create_ios(app).await?;

        match project_id {
            Some(project_id) => {
                self.app_repository
                    .bind_ios(&user_id, created.id, Some(project_id))
                    .await
            }
            None => Ok(created),
        }
    }

    /// Moves an Android app to another project, or unbinds it with `None`.
    pub async fn bind_android_app(
        &self,
        user_id: &str,
        app_id: i64,
        project_id: Option<i64>,
    ) -> Result<AndroidApp, AppError> {
        self.app_repository
            .bind_android(user_id, app_id, project_id)
            .await
    }

    /// Moves an iOS app to another project, or unbinds it with `None`.
    pub async fn bind_ios_app(
        &self,
        user_id: &str,
        app_id: i64,
        project_id: Option<i64>,
    ) -> Result<IosApp, AppError> {
        self.app_repository.bind_ios(user_id, app_id, project_id).await
    }
}

fn validate_store_link(store_link: &str) -> Result<String, AppError> {
    normalize_url(store_link).map_err(|e| {
        AppError::bad_request(
            "Invalid store link",
            json!({ "storeLink": store_link, "reason": e.to_string() }),
        )
    })
}

/// Fingerprints are stored upper-case and colon-separated, the way
/// `keytool` prints them.
fn validate_android_app(app: NewAndroidApp) -> Result<NewAndroidApp, AppError> {
    let package_name = app.package_name.trim().to_string();
    if !PACKAGE_NAME_RE.is_match(&package_name) {
        return Err(AppError::bad_request(
            "Invalid package name",
            json!({ "packageName": package_name }),
        ));
    }

    let mut fingerprints = Vec::with_capacity(app.sha256_cert_fingerprints.len());
    for fingerprint in &app.sha256_cert_fingerprints {
        let normalized = fingerprint.trim().to_ascii_uppercase();
        if !FINGERPRINT_RE.is_match(&normalized) {
            return Err(AppError::bad_request(
                "Invalid SHA-256 certificate fingerprint",
                json!({ "fingerprint": fingerprint }),
            ));
        }
        if !fingerprints.contains(&normalized) {
            fingerprints.push(normalized);
        }
    }

    Ok(NewAndroidApp {
        user_id: app.user_id,
        package_name,
        sha256_cert_fingerprints: fingerprints,
        store_link: validate_store_link(&app.store_link)?,
    })
}

fn validate_ios_app(app: NewIosApp) -> Result<NewIosApp, AppError> {
    let bundle_id = app.bundle_id.trim().to_string();
    if !PACKAGE_NAME_RE.is_match(&bundle_id) {
        return Err(AppError::bad_request(
            "Invalid bundle id",
            json!({ "bundleId": bundle_id }),
        ));
    }

    let team_id = app.team_id.trim().to_ascii_uppercase();
    if !TEAM_ID_RE.is_match(&team_id) {
        return Err(AppError::bad_request(
            "Invalid team id",
            json!({ "teamId": app.team_id }),
        ));
    }

    Ok(NewIosApp {
        user_id: app.user_id,
        bundle_id,
        team_id,
        store_link: validate_store_link(&app.store_link)?,
    })
}
