//! Chooses where a resolved link sends the current client.

use url::form_urlencoded;

use crate::domain::classifier::{Classification, Platform};
use crate::domain::entities::ResolvedLink;

const PLAY_STORE_DETAILS_URL: &str = "https://play.google.com/store/apps/details";

/// Counter bucket a redirect is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Ios,
    Android,
    General,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Ios => "ios",
            Channel::Android => "android",
            Channel::General => "general",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Render the preview page instead of redirecting. No click is recorded.
    Placeholder,
    Redirect { url: String, channel: Channel },
}

/// Picks the destination for a classified request. First match wins:
///
/// 1. social crawler → [`Destination::Placeholder`]
/// 2. Android with a bound Android app → Play Store listing, tagged with the
///    link's referrer when it has one
/// 3. iOS with a bound iOS app → the app's store link
/// 4. anything else → the link's long URL
pub fn select_destination(resolved: &ResolvedLink, classification: &Classification) -> Destination {
    if classification.is_social_crawler {
        return Destination::Placeholder;
    }

    match (classification.platform, &resolved.android_app, &resolved.ios_app) {
        (Platform::Android, Some(app), _) => Destination::Redirect {
            url: play_store_url(&app.package_name, resolved.link.referrer()),
            channel: Channel::Android,
        },
        (Platform::Ios, _, Some(app)) => Destination::Redirect {
            url: app.store_link.clone(),
            channel: Channel::Ios,
        },
        _ => Destination::Redirect {
            url: resolved.link.long_url.clone(),
            channel: Channel::General,
        },
    }
}

/// Play Store listing URL for `package_name`, with an install referrer when given.
pub fn play_store_url(package_name: &str, referrer: Option<&str>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("id", package_name);
    if let Some(referrer) = referrer.filter(|r| !r.is_empty()) {
        query.append_pair("referrer", referrer);
    }
    format!("{}?{}", PLAY_STORE_DETAILS_URL, query.finish())
}
