//! HTTP metadata fetcher backed by reqwest and scraper.
//!
//! Only publicly routable addresses are contacted. Hostnames resolve through
//! [`PublicOnlyResolver`]; IP-literal URLs and redirect targets are checked
//! before the request goes out.

use async_trait::async_trait;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use reqwest::redirect::Policy;
use reqwest::{Client, Response, Url};
use scraper::{Html, Selector};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Host;

use super::service::{MetadataError, MetadataFetcher, MetadataResult};
use crate::domain::entities::LinkMetadata;

/// Largest HTML body parsed, in bytes.
const MAX_BODY_BYTES: usize = 1024 * 1024;
/// Longest value stored per metadata field, in characters.
const MAX_FIELD_CHARS: usize = 255;
const MAX_REDIRECTS: usize = 5;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub struct HttpMetadataFetcher {
    client: Client,
    allow_private: bool,
}

impl HttpMetadataFetcher {
    /// Builds a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> MetadataResult<Self> {
        Self::build(timeout, false)
    }

    fn build(timeout: Duration, allow_private: bool) -> MetadataResult<Self> {
        let mut builder = Client::builder()
            .timeout(timeout)
            .redirect(redirect_policy(allow_private))
            .user_agent(concat!("Mozilla/5.0 (compatible; dynlink/", env!("CARGO_PKG_VERSION"), ")"));

        if !allow_private {
            builder = builder.dns_resolver(Arc::new(PublicOnlyResolver));
        }

        let client = builder
            .build()
            .map_err(|e| MetadataError::Client(e.to_string()))?;

        Ok(Self {
            client,
            allow_private,
        })
    }
}

#[async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch(&self, url: &str) -> MetadataResult<LinkMetadata> {
        let url = Url::parse(url).map_err(|e| MetadataError::Request(e.to_string()))?;
        if !self.allow_private && !is_allowed_target(&url) {
            return Err(MetadataError::Blocked(
                url.host_str().unwrap_or_default().to_string(),
            ));
        }

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| MetadataError::Request(e.to_string()))?;

        if let Some(content_type) = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            && !content_type.contains("text/html")
        {
            return Err(MetadataError::NotHtml(content_type.to_string()));
        }

        if let Some(length) = response.content_length()
            && length > MAX_BODY_BYTES as u64
        {
            return Err(MetadataError::TooLarge(length));
        }

        let body = read_capped(&mut response, MAX_BODY_BYTES).await?;
        if body.len() == MAX_BODY_BYTES {
            debug!(url = %url, "Stopped reading HTML body at size cap");
        }

        Ok(extract_metadata(&String::from_utf8_lossy(&body)))
    }
}

/// Reads at most `limit` bytes of the body, chunk by chunk.
///
/// Whatever the server still has to send is dropped with the response.
async fn read_capped(response: &mut Response, limit: usize) -> MetadataResult<Vec<u8>> {
    let mut body = Vec::new();

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| MetadataError::Request(e.to_string()))?
    {
        let remaining = limit - body.len();
        if chunk.len() >= remaining {
            body.extend_from_slice(&chunk[..remaining]);
            break;
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

fn redirect_policy(allow_private: bool) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if !allow_private && !is_allowed_target(attempt.url()) {
            attempt.error("redirect to a non-public address")
        } else {
            attempt.follow()
        }
    })
}

/// IP-literal hosts must be public. Hostnames are checked at resolution.
fn is_allowed_target(url: &Url) -> bool {
    match url.host() {
        Some(Host::Ipv4(ip)) => is_public(IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => is_public(IpAddr::V6(ip)),
        Some(Host::Domain(_)) => true,
        None => false,
    }
}

fn is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, ..] = v4.octets();
            !(v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_documentation()
                || v4.is_unspecified()
                || v4.is_multicast()
                || a == 0
                // 100.64.0.0/10, carrier-grade NAT
                || (a == 100 && (b & 0xc0) == 64))
        }
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_public(IpAddr::V4(v4));
            }
            let first = v6.segments()[0];
            !(v6.is_loopback()
                || v6.is_unspecified()
                || v6.is_multicast()
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80)
        }
    }
}

/// System resolver that drops every address which is not publicly routable.
struct PublicOnlyResolver;

impl Resolve for PublicOnlyResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(resolve_public(name.as_str().to_string()))
    }
}

async fn resolve_public(host: String) -> Result<Addrs, BoxError> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host.as_str(), 0))
        .await?
        .filter(|addr| is_public(addr.ip()))
        .collect();

    if addrs.is_empty() {
        return Err(format!("{host} has no public address").into());
    }

    Ok(Box::new(addrs.into_iter()))
}

/// Pulls title, description and image out of an HTML document.
///
/// Open Graph tags win over their plain HTML counterparts.
pub fn extract_metadata(html: &str) -> LinkMetadata {
    let document = Html::parse_document(html);

    let title = meta_content(&document, r#"meta[property="og:title"]"#)
        .or_else(|| element_text(&document, "title"));
    let description = meta_content(&document, r#"meta[property="og:description"]"#)
        .or_else(|| meta_content(&document, r#"meta[name="description"]"#));
    let image = meta_content(&document, r#"meta[property="og:image"]"#);

    LinkMetadata {
        title,
        description,
        image,
    }
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .and_then(clean)
}

fn element_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| clean(&el.text().collect::<String>()))
}

fn clean(value: &str) -> Option<String> {
    let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if value.is_empty() {
        return None;
    }
    Some(value.chars().take(MAX_FIELD_CHARS).collect())
}
