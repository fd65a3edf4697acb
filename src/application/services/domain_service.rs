//! Custom domain registration and verification state.

use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{CustomDomain, DnsChallenge};
use crate::domain::repositories::{CustomDomainRepository, UserRepository};
use crate::domain::resolver::{CanonicalDomain, DomainResolver};
use crate::error::AppError;

/// Service for managing user-owned custom domains.
///
/// Verification itself happens at the domain authority; this service only
/// records what the authority reports. A custom domain routes traffic once
/// it is marked verified.
pub struct DomainService<C: CustomDomainRepository, U: UserRepository> {
    repository: Arc<C>,
    user_repository: Arc<U>,
    resolver: DomainResolver,
}

impl<C: CustomDomainRepository, U: UserRepository> DomainService<C, U> {
    /// Creates a new domain service.
    pub fn new(repository: Arc<C>, user_repository: Arc<U>, resolver: DomainResolver) -> Self {
        Self {
            repository,
            user_repository,
            resolver,
        }
    }

    /// Registers `domain` for `user_id`, unverified, with the DNS record the
    /// user has to create.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if `domain` is not a usable custom host
    /// - [`AppError::PaymentRequired`] if the user has no active subscription
    /// - [`AppError::Conflict`] if the domain is already registered
    pub async fn add_custom_domain(
        &self,
        user_id: &str,
        domain: &str,
    ) -> Result<CustomDomain, AppError> {
        let host = self.validate_domain_name(domain)?;

        let is_pro = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .is_some_and(|user| user.is_pro(Utc::now()));
        if !is_pro {
            return Err(AppError::payment_required(
                "You need to be a Pro user to create a custom domain",
                json!({ "domain": host }),
            ));
        }

        if self.repository.find_by_domain(&host).await?.is_some() {
            return Err(AppError::conflict(
                "Domain already exists",
                json!({ "domain": host }),
            ));
        }

        let challenges = vec![self.routing_challenge(&host)];
        let created = self
            .repository
            .create(user_id, &host, challenges, false)
            .await?;

        tracing::info!(domain = %created.domain, user_id, "Custom domain registered");
        Ok(created)
    }

    /// Records the verification status reported by the domain authority.
    ///
    /// Outstanding challenges are cleared once the domain is verified.
    /// Concurrent reports converge on the last write.
    pub async fn record_verification(
        &self,
        domain: &str,
        verified: bool,
        challenges: Vec<DnsChallenge>,
    ) -> Result<CustomDomain, AppError> {
        let host = self.validate_domain_name(domain)?;
        let challenges = if verified { Vec::new() } else { challenges };

        let updated = self
            .repository
            .set_verification(&host, verified, challenges)
            .await?;

        tracing::info!(domain = %updated.domain, verified, "Custom domain verification recorded");
        Ok(updated)
    }

    pub async fn list_domains(&self, user_id: &str) -> Result<Vec<CustomDomain>, AppError> {
        self.repository.list_by_user(user_id).await
    }

    /// Releases one of `user_id`'s custom domains so it can be registered again.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the user has no such domain
    /// - [`AppError::Conflict`] while a project is still routed by it
    pub async fn remove_custom_domain(&self, user_id: &str, domain: &str) -> Result<(), AppError> {
        let host = self.validate_domain_name(domain)?;

        if !self.repository.delete(user_id, &host).await? {
            return Err(AppError::not_found(
                "Custom domain not found",
                json!({ "domain": host }),
            ));
        }

        tracing::info!(domain = %host, user_id, "Custom domain removed");
        Ok(())
    }

    /// Validates a domain name.
    ///
    /// Hosts under the platform root, IP literals and single-label names are
    /// rejected.
    fn validate_domain_name(&self, domain: &str) -> Result<String, AppError> {
        match self.resolver.resolve(Some(domain)) {
            Some(CanonicalDomain::Custom(host)) => Ok(host),
            _ => Err(AppError::bad_request(
                "Invalid domain format",
                json!({ "domain": domain }),
            )),
        }
    }

    /// Apex domains need an ALIAS record at `@`; subdomains a CNAME on their
    /// first label. Both point at `cname.<root>`.
    fn routing_challenge(&self, host: &str) -> DnsChallenge {
        let target = format!("cname.{}", self.resolver.root_domain());
        let labels: Vec<&str> = host.split('.').collect();

        if labels.len() == 2 {
            DnsChallenge {
                record_type: "ALIAS".to_string(),
                domain: "@".to_string(),
                value: target,
                reason: None,
            }
        } else {
            DnsChallenge {
                record_type: "CNAME".to_string(),
                domain: labels[..labels.len() - 2].join("."),
                value: target,
                reason: None,
            }
        }
    }
}
