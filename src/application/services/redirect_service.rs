//! Redirect resolution: host + code + user agent → outcome.

use std::sync::Arc;

use crate::domain::classifier::classify;
use crate::domain::destination::{Channel, Destination, select_destination};
use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::domain::resolver::DomainResolver;
use crate::error::AppError;

const MAX_CODE_LENGTH: usize = 64;

/// Result of resolving a public redirect request.
///
/// Not-found is an ordinary outcome here, not an error. Database failures are
/// the only `Err` the service produces.
#[derive(Debug, Clone)]
pub enum RedirectOutcome {
    NotFound,
    /// Social crawler: render the preview page for this link.
    Placeholder(Box<Link>),
    Redirect {
        url: String,
        link_id: i64,
        channel: Channel,
    },
}

/// Runs Domain Resolver → Link Lookup → Client Classifier → Destination Selector.
///
/// Recording the click is left to the caller so it can happen after the
/// response is built.
pub struct RedirectService<L: LinkRepository> {
    repository: Arc<L>,
    resolver: DomainResolver,
}

impl<L: LinkRepository> RedirectService<L> {
    pub fn new(repository: Arc<L>, resolver: DomainResolver) -> Self {
        Self {
            repository,
            resolver,
        }
    }

    pub async fn resolve(
        &self,
        host: Option<&str>,
        code: &str,
        user_agent: Option<&str>,
    ) -> Result<RedirectOutcome, AppError> {
        let Some(domain) = self.resolver.resolve(host) else {
            tracing::debug!(?host, "Host does not map to a project domain");
            return Ok(RedirectOutcome::NotFound);
        };

        if !is_plausible_code(code) {
            return Ok(RedirectOutcome::NotFound);
        }

        let Some(resolved) = self.repository.find_for_redirect(&domain, code).await? else {
            tracing::debug!(%domain, code, "Short link not found");
            return Ok(RedirectOutcome::NotFound);
        };

        let classification = classify(user_agent);

        Ok(match select_destination(&resolved, &classification) {
            Destination::Placeholder => RedirectOutcome::Placeholder(Box::new(resolved.link)),
            Destination::Redirect { url, channel } => RedirectOutcome::Redirect {
                url,
                link_id: resolved.link.id,
                channel,
            },
        })
    }
}

fn is_plausible_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_CODE_LENGTH
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
