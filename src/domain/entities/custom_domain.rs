//! Custom domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An outstanding DNS record the domain authority wants to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsChallenge {
    #[serde(rename = "type")]
    pub record_type: String,
    pub domain: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A user-owned host that may serve as a project identity once verified.
#[derive(Debug, Clone)]
pub struct CustomDomain {
    pub id: i64,
    pub user_id: String,
    pub domain: String,
    pub challenges: Vec<DnsChallenge>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_json_shape() {
        let challenge = DnsChallenge {
            record_type: "TXT".to_string(),
            domain: "_verify.go.brand.com".to_string(),
            value: "token=abc".to_string(),
            reason: None,
        };

        let json = serde_json::to_value(&challenge).unwrap();
        assert_eq!(json["type"], "TXT");
        assert!(json.get("reason").is_none());
    }
}
