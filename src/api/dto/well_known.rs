//! App association documents served on project hosts.

use serde::Serialize;

use crate::domain::entities::{AndroidApp, IosApp};

const HANDLE_ALL_URLS: &str = "delegate_permission/common.handle_all_urls";

/// One statement of `/.well-known/assetlinks.json`.
#[derive(Debug, Serialize)]
pub struct AssetLinkStatement {
    pub relation: Vec<&'static str>,
    pub target: AssetLinkTarget,
}

#[derive(Debug, Serialize)]
pub struct AssetLinkTarget {
    pub namespace: &'static str,
    pub package_name: String,
    pub sha256_cert_fingerprints: Vec<String>,
}

impl AssetLinkStatement {
    /// The document is a JSON array with one statement per app.
    pub fn document(app: &AndroidApp) -> Vec<Self> {
        vec![Self {
            relation: vec![HANDLE_ALL_URLS],
            target: AssetLinkTarget {
                namespace: "android_app",
                package_name: app.package_name.clone(),
                sha256_cert_fingerprints: app.sha256_cert_fingerprints.clone(),
            },
        }]
    }
}

/// `/apple-app-site-association` document.
#[derive(Debug, Serialize)]
pub struct AppleAppSiteAssociation {
    pub applinks: AppLinks,
}

#[derive(Debug, Serialize)]
pub struct AppLinks {
    pub apps: Vec<String>,
    pub details: Vec<AppLinkDetail>,
}

#[derive(Debug, Serialize)]
pub struct AppLinkDetail {
    #[serde(rename = "appID")]
    pub app_id: String,
    pub paths: Vec<&'static str>,
}

impl AppleAppSiteAssociation {
    pub fn document(app: &IosApp) -> Self {
        Self {
            applinks: AppLinks {
                apps: Vec::new(),
                details: vec![AppLinkDetail {
                    app_id: app.app_id(),
                    paths: vec!["*"],
                }],
            },
        }
    }
}
