//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIER: &str = "freemium";

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub country: Option<String>,
    pub favorite_f1_team: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub tier: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields required to insert a user. The password is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub hashed_password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub tier: String,
}

impl NewUser {
    pub fn new(email: impl Into<String>, hashed_password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            hashed_password: hashed_password.into(),
            first_name: None,
            last_name: None,
            tier: DEFAULT_TIER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            email: "fan@example.com".to_string(),
            hashed_password: "$argon2id$secret".to_string(),
            first_name: None,
            last_name: None,
            display_name: None,
            country: None,
            favorite_f1_team: None,
            is_active: true,
            is_superuser: false,
            tier: DEFAULT_TIER.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("freemium"));
    }
}
