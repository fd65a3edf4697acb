//! DTOs for the Public Ingestion API link endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::CreateLink;
use crate::domain::entities::LinkMetadata;

/// Body of `POST /api/v1/links`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    /// Destination URL (HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    pub link: String,

    /// Subdomain label, `<label>.<root>` or custom domain of one of the caller's projects.
    #[validate(length(min = 1, max = 255))]
    pub project_domain: String,

    #[validate(nested)]
    pub meta_data: Option<MetaData>,

    #[validate(length(min = 1))]
    pub android_referrer: Option<String>,
}

/// Social preview metadata supplied with a new link.
#[derive(Debug, Deserialize, Validate)]
pub struct MetaData {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub image: Option<String>,
}

impl From<CreateLinkRequest> for CreateLink {
    fn from(req: CreateLinkRequest) -> Self {
        CreateLink {
            long_url: req.link,
            project_domain: req.project_domain,
            metadata: req.meta_data.map(|m| LinkMetadata {
                title: m.title,
                description: m.description,
                image: m.image,
            }),
            android_referrer: req.android_referrer,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkResponse {
    pub link_id: i64,
    pub url: String,
}

/// Query of `GET /api/v1/links`. Both parameters are required; they are
/// optional here so their absence maps to a 400 with the error envelope.
#[derive(Debug, Deserialize)]
pub struct LookupLinkQuery {
    pub domain: Option<String>,
    pub alias: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LookupLinkResponse {
    pub url: String,
}
