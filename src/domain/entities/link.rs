//! Link entity: the redirect unit addressed by `(domain, code)`.

use chrono::{DateTime, Utc};

use super::{AndroidApp, IosApp, Project};

/// Social preview metadata shown to crawlers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl LinkMetadata {
    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.image.is_none()
    }
}

/// Aggregate and per-channel click counters.
///
/// Only ever advanced by database-side increments; never written back from memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickCounters {
    pub clicks: i64,
    pub app_store_redirects: i64,
    pub play_store_redirects: i64,
    pub general_redirects: i64,
}

/// A short link owned by a project.
///
/// `domain` is the canonical host of the owning project copied at creation
/// time. `code` and `domain` never change after insert.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub project_id: i64,
    pub domain: String,
    pub code: String,
    pub long_url: String,
    pub metadata: LinkMetadata,
    pub android_referrer: Option<String>,
    pub counters: ClickCounters,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Fully-qualified short URL, always HTTPS.
    pub fn short_url(&self) -> String {
        format!("https://{}/{}", self.domain, self.code)
    }

    /// Referrer to append to Play Store links, if one is set and non-empty.
    pub fn referrer(&self) -> Option<&str> {
        self.android_referrer
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub project_id: i64,
    pub domain: String,
    pub code: String,
    pub long_url: String,
    pub metadata: LinkMetadata,
    pub android_referrer: Option<String>,
}

/// A link with its owning project and the apps bound to that project,
/// loaded together for the redirect path.
#[derive(Debug, Clone)]
pub struct ResolvedLink {
    pub link: Link,
    pub project: Project,
    pub android_app: Option<AndroidApp>,
    pub ios_app: Option<IosApp>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link_with_referrer(referrer: Option<&str>) -> Link {
        Link {
            id: 1,
            project_id: 1,
            domain: "foo.directt.to".to_string(),
            code: "xY12abCD".to_string(),
            long_url: "https://example.com/".to_string(),
            metadata: LinkMetadata::default(),
            android_referrer: referrer.map(str::to_string),
            counters: ClickCounters::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_short_url() {
        let link = link_with_referrer(None);
        assert_eq!(link.short_url(), "https://foo.directt.to/xY12abCD");
    }

    #[test]
    fn test_blank_referrer_counts_as_absent() {
        assert_eq!(link_with_referrer(Some("   ")).referrer(), None);
        assert_eq!(link_with_referrer(Some("")).referrer(), None);
        assert_eq!(link_with_referrer(None).referrer(), None);
        assert_eq!(
            link_with_referrer(Some("utm_source=mail")).referrer(),
            Some("utm_source=mail")
        );
    }

    #[test]
    fn test_metadata_is_empty() {
        assert!(LinkMetadata::default().is_empty());
        let meta = LinkMetadata {
            image: Some("https://example.com/a.png".to_string()),
            ..Default::default()
        };
        assert!(!meta.is_empty());
    }
}
