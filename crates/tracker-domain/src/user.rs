//! User profile document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Savings goal applied when a profile has none.
pub const DEFAULT_TARGET_BALANCE: Money = Money::from_cents(125_000);

/// Name shown when a profile has no name on record.
pub const FALLBACK_USER_NAME: &str = "User";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default = "UserProfile::default_target_balance")]
    pub target_balance: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn new(
        uid: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            email: email.into(),
            phone_number: None,
            target_balance: DEFAULT_TARGET_BALANCE,
            created_at: Some(created_at),
            last_login: Some(created_at),
        }
    }

    pub fn default_target_balance() -> Money {
        DEFAULT_TARGET_BALANCE
    }

    /// Returns the stored name, or the generic fallback when it is blank.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            FALLBACK_USER_NAME
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_target_defaults_to_standard_goal() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"name":"Ada","email":"ada@example.com"}"#).unwrap();
        assert_eq!(profile.target_balance, DEFAULT_TARGET_BALANCE);
        assert_eq!(profile.display_name(), "Ada");
    }

    #[test]
    fn blank_name_uses_fallback() {
        let profile: UserProfile = serde_json::from_str(r#"{"name":"  "}"#).unwrap();
        assert_eq!(profile.display_name(), FALLBACK_USER_NAME);
    }
}
