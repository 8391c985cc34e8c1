//! Account profiles and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AccountId;

/// The identity record of an account.
///
/// Created at registration from the identity provider's subject and email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// The account ID (identity provider subject).
    pub account_id: AccountId,

    /// Contact email.
    pub email: String,

    /// Display name.
    pub name: Option<String>,

    /// Avatar image URL.
    pub avatar_url: Option<String>,

    /// Free-form biography.
    pub bio: Option<String>,

    /// Country of residence.
    pub country: Option<String>,

    /// Telegram handle.
    pub telegram: Option<String>,

    /// Payout wallet address.
    pub wallet_address: Option<String>,

    /// When the profile was created.
    pub created_at: DateTime<Utc>,

    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create a profile with only the registration fields set.
    #[must_use]
    pub fn new(account_id: AccountId, email: String, name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            email,
            name,
            avatar_url: None,
            bio: None,
            country: None,
            telegram: None,
            wallet_address: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. Fields left as `None` are unchanged.
    pub fn apply(&mut self, update: ProfileUpdate) {
        let ProfileUpdate {
            email,
            name,
            avatar_url,
            bio,
            country,
            telegram,
            wallet_address,
        } = update;

        if let Some(email) = email {
            self.email = email;
        }
        // Some("") clears an optional field.
        merge(&mut self.name, name);
        merge(&mut self.avatar_url, avatar_url);
        merge(&mut self.bio, bio);
        merge(&mut self.country, country);
        merge(&mut self.telegram, telegram);
        merge(&mut self.wallet_address, wallet_address);
        self.updated_at = Utc::now();
    }

    /// Case-insensitive match against email or name.
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.email.to_lowercase().contains(&term)
            || self
                .name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&term))
    }
}

fn merge(field: &mut Option<String>, value: Option<String>) {
    match value {
        Some(v) if v.is_empty() => *field = None,
        Some(v) => *field = Some(v),
        None => {}
    }
}

/// A partial profile update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    /// New email.
    pub email: Option<String>,
    /// New display name.
    pub name: Option<String>,
    /// New avatar URL.
    pub avatar_url: Option<String>,
    /// New biography.
    pub bio: Option<String>,
    /// New country.
    pub country: Option<String>,
    /// New Telegram handle.
    pub telegram: Option<String>,
    /// New wallet address.
    pub wallet_address: Option<String>,
}

/// Role claim carried by identity tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular dashboard user.
    #[default]
    User,
    /// Operator with access to the admin overview.
    Admin,
}

impl Role {
    /// Whether this role may use admin endpoints.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile::new(
            AccountId::generate(),
            "miner@example.com".into(),
            Some("Satoshi".into()),
        )
    }

    #[test]
    fn apply_update_merges_fields() {
        let mut p = profile();
        p.apply(ProfileUpdate {
            country: Some("PT".into()),
            name: Some(String::new()),
            ..ProfileUpdate::default()
        });

        assert_eq!(p.country.as_deref(), Some("PT"));
        assert!(p.name.is_none());
        assert_eq!(p.email, "miner@example.com");
    }

    #[test]
    fn matches_is_case_insensitive() {
        let p = profile();
        assert!(p.matches("MINER"));
        assert!(p.matches("sato"));
        assert!(!p.matches("admin"));
    }

    #[test]
    fn role_serde() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert!(Role::Admin.is_admin());
        assert!(!Role::default().is_admin());
    }
}
