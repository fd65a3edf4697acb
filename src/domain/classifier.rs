//! User-agent classification for the redirect path.

use regex::Regex;
use std::sync::LazyLock;

static IOS_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)iphone|ipad|ipod").unwrap());
static ANDROID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)android").unwrap());

/// Agents that fetch a page to render a link preview.
const SOCIAL_CRAWLER_TOKENS: &[&str] = &[
    "twitterbot",
    "facebookexternalhit",
    "facebot",
    "linkedinbot",
    "whatsapp",
    "slackbot",
    "telegrambot",
    "discordbot",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ios,
    Android,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub platform: Platform,
    pub is_social_crawler: bool,
}

/// Buckets a request by platform and flags social preview crawlers.
///
/// A missing or empty user agent is `Unknown` and not a crawler.
pub fn classify(user_agent: Option<&str>) -> Classification {
    let ua = user_agent.unwrap_or_default();

    let platform = if IOS_REGEX.is_match(ua) {
        Platform::Ios
    } else if ANDROID_REGEX.is_match(ua) {
        Platform::Android
    } else {
        Platform::Unknown
    };

    let lowered = ua.to_ascii_lowercase();
    let is_social_crawler = SOCIAL_CRAWLER_TOKENS
        .iter()
        .any(|token| lowered.contains(token));

    Classification {
        platform,
        is_social_crawler,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE_SAFARI: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
        AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const PIXEL_CHROME: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
    const DESKTOP_FIREFOX: &str =
        "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";

    #[test]
    fn test_iphone_is_ios() {
        let c = classify(Some(IPHONE_SAFARI));
        assert_eq!(c.platform, Platform::Ios);
        assert!(!c.is_social_crawler);
    }

    #[test]
    fn test_ipad_and_ipod_are_ios() {
        assert_eq!(classify(Some("Mozilla/5.0 (iPad; CPU OS 16_0)")).platform, Platform::Ios);
        assert_eq!(classify(Some("Mozilla/5.0 (iPod touch)")).platform, Platform::Ios);
    }

    #[test]
    fn test_android_any_case() {
        for ua in [PIXEL_CHROME, "ANDROID", "some android thing", "AnDrOiD 9"] {
            assert_eq!(classify(Some(ua)).platform, Platform::Android, "{ua}");
        }
    }

    #[test]
    fn test_ios_wins_over_android() {
        assert_eq!(classify(Some("Android iPhone")).platform, Platform::Ios);
    }

    #[test]
    fn test_desktop_is_unknown() {
        assert_eq!(classify(Some(DESKTOP_FIREFOX)).platform, Platform::Unknown);
    }

    #[test]
    fn test_empty_and_missing() {
        for ua in [None, Some("")] {
            let c = classify(ua);
            assert_eq!(c.platform, Platform::Unknown);
            assert!(!c.is_social_crawler);
        }
    }

    #[test]
    fn test_social_crawlers() {
        for ua in [
            "facebookexternalhit/1.1 (+http://www.facebook.com/externalhit_uatext.php)",
            "Twitterbot/1.0",
            "LinkedInBot/1.0 (compatible; Mozilla/5.0; Apache-HttpClient +http://www.linkedin.com)",
            "WhatsApp/2.23.20.0 A",
            "Slackbot-LinkExpanding 1.0 (+https://api.slack.com/robots)",
            "TelegramBot (like TwitterBot)",
            "Mozilla/5.0 (compatible; Discordbot/2.0; +https://discordapp.com)",
        ] {
            assert!(classify(Some(ua)).is_social_crawler, "{ua}");
        }
    }

    #[test]
    fn test_crawler_flag_is_independent_of_platform() {
        let c = classify(Some("WhatsApp/2.23 Android"));
        assert_eq!(c.platform, Platform::Android);
        assert!(c.is_social_crawler);
    }

    #[test]
    fn test_regular_browsers_are_not_crawlers() {
        for ua in [IPHONE_SAFARI, PIXEL_CHROME, DESKTOP_FIREFOX] {
            assert!(!classify(Some(ua)).is_social_crawler);
        }
    }
}
