//! User record mirrored from the identity provider.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub subscription_id: Option<String>,
    pub customer_id: Option<String>,
    pub price_id: Option<String>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A user is on the paid plan while a subscription exists and its
    /// current period has not ended.
    pub fn is_pro(&self, now: DateTime<Utc>) -> bool {
        self.subscription_id.is_some() && self.current_period_end.is_some_and(|end| end > now)
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Subscription fields written when the payments provider reports a new
/// or renewed subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionUpdate {
    pub subscription_id: String,
    pub customer_id: Option<String>,
    pub price_id: Option<String>,
    pub current_period_end: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(subscription: Option<&str>, period_end: Option<DateTime<Utc>>) -> User {
        User {
            id: "user_1".to_string(),
            email: None,
            name: None,
            subscription_id: subscription.map(str::to_string),
            customer_id: None,
            price_id: None,
            current_period_end: period_end,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_pro_requires_future_period_end() {
        let now = Utc::now();
        assert!(user(Some("sub_1"), Some(now + Duration::days(3))).is_pro(now));
        assert!(!user(Some("sub_1"), Some(now - Duration::seconds(1))).is_pro(now));
        assert!(!user(Some("sub_1"), None).is_pro(now));
        assert!(!user(None, Some(now + Duration::days(3))).is_pro(now));
    }
}
