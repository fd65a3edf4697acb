//! Shared application state injected into every handler.

use sqlx::PgPool;
use std::sync::Arc;

use crate::application::services::{
    AuthService, ClickRecorder, DomainService, LinkService, ProjectService, RedirectService,
    SubscriptionService,
};
use crate::config::Config;
use crate::domain::resolver::DomainResolver;
use crate::infrastructure::metadata::MetadataFetcher;
use crate::infrastructure::persistence::{
    PgAppRepository, PgCustomDomainRepository, PgLinkRepository, PgProjectRepository,
    PgTokenRepository, PgUserRepository,
};

pub type AppRedirectService = RedirectService<PgLinkRepository>;
pub type AppClickRecorder = ClickRecorder<PgLinkRepository>;
pub type AppLinkService = LinkService<PgLinkRepository, PgProjectRepository, PgUserRepository>;
pub type AppAuthService = AuthService<PgTokenRepository>;
pub type AppProjectService =
    ProjectService<PgProjectRepository, PgAppRepository, PgCustomDomainRepository>;
pub type AppDomainService = DomainService<PgCustomDomainRepository, PgUserRepository>;
pub type AppSubscriptionService = SubscriptionService<PgUserRepository>;

/// Cloned per request by axum; every field is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<PgPool>,
    pub redirect_service: Arc<AppRedirectService>,
    pub click_recorder: Arc<AppClickRecorder>,
    pub link_service: Arc<AppLinkService>,
    pub auth_service: Arc<AppAuthService>,
    pub project_service: Arc<AppProjectService>,
    pub domain_service: Arc<AppDomainService>,
    pub subscription_service: Arc<AppSubscriptionService>,
}

impl AppState {
    /// Wires repositories and services over one connection pool.
    pub fn new(
        pool: Arc<PgPool>,
        config: &Config,
        metadata_fetcher: Arc<dyn MetadataFetcher>,
    ) -> Self {
        let resolver = DomainResolver::new(config.root_domain.clone());

        let link_repository = Arc::new(PgLinkRepository::new(pool.clone()));
        let project_repository = Arc::new(PgProjectRepository::new(pool.clone()));
        let app_repository = Arc::new(PgAppRepository::new(pool.clone()));
        let user_repository = Arc::new(PgUserRepository::new(pool.clone()));
        let custom_domain_repository = Arc::new(PgCustomDomainRepository::new(pool.clone()));
        let token_repository = Arc::new(PgTokenRepository::new(pool.clone()));

        let redirect_service = Arc::new(RedirectService::new(
            link_repository.clone(),
            resolver.clone(),
        ));
        let click_recorder = Arc::new(ClickRecorder::new(link_repository.clone()));
        let link_service = Arc::new(LinkService::new(
            link_repository,
            project_repository.clone(),
            user_repository.clone(),
            metadata_fetcher,
            resolver.clone(),
            config.free_links_limit,
        ));
        let auth_service = Arc::new(AuthService::new(
            token_repository,
            config.token_signing_secret.clone(),
        ));
        let project_service = Arc::new(ProjectService::new(
            project_repository,
            app_repository,
            custom_domain_repository.clone(),
            resolver.clone(),
        ));
        let domain_service = Arc::new(DomainService::new(
            custom_domain_repository,
            user_repository.clone(),
            resolver,
        ));
        let subscription_service = Arc::new(SubscriptionService::new(
            user_repository,
            config.webhook_secret.clone(),
        ));

        Self {
            pool,
            redirect_service,
            click_recorder,
            link_service,
            auth_service,
            project_service,
            domain_service,
            subscription_service,
        }
    }
}
