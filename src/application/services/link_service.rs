//! Link creation, lookup and owner-side maintenance.

use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::domain::entities::{Link, LinkMetadata, NewLink};
use crate::domain::repositories::{LinkRepository, ProjectRepository, UserRepository};
use crate::domain::resolver::DomainResolver;
use crate::error::AppError;
use crate::infrastructure::metadata::MetadataFetcher;
use crate::utils::code_generator::generate_code;
use crate::utils::url_normalizer::normalize_url;
use serde_json::json;

const MAX_CODE_ATTEMPTS: usize = 10;

/// Validated input for [`LinkService::create_link`].
#[derive(Debug, Clone)]
pub struct CreateLink {
    pub long_url: String,
    /// Subdomain label, `<label>.<root>` or a custom domain.
    pub project_domain: String,
    /// `None` schedules a metadata backfill from the destination page.
    pub metadata: Option<LinkMetadata>,
    pub android_referrer: Option<String>,
}

/// Service for creating and resolving short links through the ingestion API.
///
/// Enforces project ownership and the free-tier link ceiling, generates
/// globally unique codes and backfills preview metadata off the request path.
pub struct LinkService<L: LinkRepository, P: ProjectRepository, U: UserRepository> {
    link_repository: Arc<L>,
    project_repository: Arc<P>,
    user_repository: Arc<U>,
    metadata_fetcher: Arc<dyn MetadataFetcher>,
    resolver: DomainResolver,
    free_links_limit: i64,
}

impl<L, P, U> LinkService<L, P, U>
where
    L: LinkRepository + 'static,
    P: ProjectRepository,
    U: UserRepository,
{
    pub fn new(
        link_repository: Arc<L>,
        project_repository: Arc<P>,
        user_repository: Arc<U>,
        metadata_fetcher: Arc<dyn MetadataFetcher>,
        resolver: DomainResolver,
        free_links_limit: i64,
    ) -> Self {
        Self {
            link_repository,
            project_repository,
            user_repository,
            metadata_fetcher,
            resolver,
            free_links_limit,
        }
    }

    /// Creates a link in one of `user_id`'s projects.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the destination is not an http(s) URL
    /// - [`AppError::NotFound`] if the project does not exist or belongs to someone else
    /// - [`AppError::PaymentRequired`] if a free user has reached the link ceiling
    /// - [`AppError::Internal`] on database errors or exhausted code attempts
    pub async fn create_link(&self, user_id: &str, input: CreateLink) -> Result<Link, AppError> {
        let long_url = normalize_url(&input.long_url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        let key = self.resolver.project_key(&input.project_domain);
        let project = self
            .project_repository
            .find_owned(user_id, &key)
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    "Project not found",
                    json!({ "projectDomain": input.project_domain }),
                )
            })?;

        self.ensure_within_free_limit(user_id).await?;

        let domain = project.public_domain(self.resolver.root_domain());
        let android_referrer = input
            .android_referrer
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        let backfill = input.metadata.is_none();

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code();

            if self.link_repository.code_exists(&code).await? {
                continue;
            }

            let new_link = NewLink {
                project_id: project.id,
                domain: domain.clone(),
                code,
                long_url: long_url.clone(),
                metadata: input.metadata.clone().unwrap_or_default(),
                android_referrer: android_referrer.clone(),
            };

            match self.link_repository.create(new_link).await {
                Ok(link) => {
                    tracing::info!(link_id = link.id, project_id = project.id, code = %link.code, "Link created");
                    if backfill {
                        self.spawn_metadata_backfill(link.id, link.long_url.clone());
                    }
                    return Ok(link);
                }
                Err(AppError::Conflict { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions" }),
        ))
    }

    async fn ensure_within_free_limit(&self, user_id: &str) -> Result<(), AppError> {
        let is_pro = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .is_some_and(|user| user.is_pro(Utc::now()));
        if is_pro {
            return Ok(());
        }

        let count = self.link_repository.count_by_user(user_id).await?;
        if count >= self.free_links_limit {
            return Err(AppError::payment_required(
                "You have reached the limit of free links. Upgrade your plan to create more.",
                json!({ "limit": self.free_links_limit, "count": count }),
            ));
        }

        Ok(())
    }

    /// Fetches the destination page and stores its metadata if the link still
    /// has none.
    ///
    /// Runs detached; every failure is logged and dropped. The returned handle
    /// is only awaited in tests.
    pub fn spawn_metadata_backfill(&self, link_id: i64, url: String) -> JoinHandle<()> {
        let fetcher = self.metadata_fetcher.clone();
        let repository = self.link_repository.clone();

        tokio::spawn(async move {
            let metadata = match fetcher.fetch(&url).await {
                Ok(metadata) if !metadata.is_empty() => metadata,
                Ok(_) => {
                    tracing::debug!(link_id, "No metadata found on destination page");
                    return;
                }
                Err(e) => {
                    tracing::warn!(link_id, error = %e, "Metadata fetch failed");
                    return;
                }
            };

            match repository.fill_metadata_if_absent(link_id, metadata).await {
                Ok(true) => tracing::debug!(link_id, "Metadata backfilled"),
                Ok(false) => tracing::debug!(link_id, "Metadata already set, backfill skipped"),
                Err(e) => tracing::warn!(link_id, error = %e, "Failed to store backfilled metadata"),
            }
        })
    }

    /// Returns the short URL of the link stored under exactly `(domain, code)`.
    ///
    /// Any authenticated caller may look up any link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the pair.
    pub async fn lookup_short_url(&self, domain: &str, code: &str) -> Result<String, AppError> {
        let link = self
            .link_repository
            .find_by_domain_and_code(domain, code)
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    "Link not found",
                    json!({ "domain": domain, "alias": code }),
                )
            })?;

        Ok(link.short_url())
    }

    /// Links of every project of `user_id`, with their click counters.
    pub async fn list_links(&self, user_id: &str) -> Result<Vec<Link>, AppError> {
        self.link_repository.list_by_user(user_id).await
    }

    /// Points one of `user_id`'s links at a new destination.
    ///
    /// Without owner-supplied metadata the new page is fetched inline; a
    /// failed fetch clears the old preview instead of keeping stale values.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the destination is not an http(s) URL
    /// - [`AppError::NotFound`] if the link does not exist or belongs to someone else
    pub async fn update_link(
        &self,
        user_id: &str,
        link_id: i64,
        long_url: &str,
        metadata: Option<LinkMetadata>,
    ) -> Result<Link, AppError> {
        let long_url = normalize_url(long_url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        let metadata = match metadata {
            Some(metadata) => metadata,
            None => match self.metadata_fetcher.fetch(&long_url).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!(link_id, error = %e, "Metadata fetch failed");
                    LinkMetadata::default()
                }
            },
        };

        let link = self
            .link_repository
            .update_destination(user_id, link_id, &long_url, metadata)
            .await?;

        tracing::info!(link_id, user_id, "Link destination updated");
        Ok(link)
    }

    /// Deletes one of `user_id`'s links.
    pub async fn delete_link(&self, user_id: &str, link_id: i64) -> Result<(), AppError> {
        if !self.link_repository.delete(user_id, link_id).await? {
            return Err(AppError::not_found(
                "Link not found",
                json!({ "link_id": link_id }),
            ));
        }
        Ok(())
    }

    /// Sets a link's metadata on behalf of its owner.
    ///
    /// Owner-set values are never replaced by a later backfill.
    pub async fn set_metadata(
        &self,
        user_id: &str,
        link_id: i64,
        metadata: LinkMetadata,
    ) -> Result<Link, AppError> {
        self.link_repository
            .update_metadata(user_id, link_id, metadata)
            .await
    }
}
