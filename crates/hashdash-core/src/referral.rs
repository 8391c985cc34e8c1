//! Referral codes and referral records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{AccountId, ReferralId};

// ============================================================================
// Constants
// ============================================================================

/// Literal prefix of every referral code.
pub const REFERRAL_CODE_PREFIX: &str = "REF_";

/// Length of the random suffix of a generated code.
pub const REFERRAL_SUFFIX_LEN: usize = 8;

/// Longest code accepted from user input.
pub const MAX_REFERRAL_CODE_LEN: usize = 64;

/// Earnings credited to the referrer per successful referral, in cents ($10).
pub const REFERRAL_BONUS_CENTS: i64 = 1000;

/// Points credited to the referrer per successful referral.
pub const REFERRAL_BONUS_POINTS: i64 = 100;

/// Points credited to the referred account on attribution.
pub const WELCOME_BONUS_POINTS: i64 = 50;

/// A shareable referral token.
///
/// Generated codes look like `REF_1A2B3C4D_9F8E7D6C`: the prefix, the first
/// eight characters of the referrer's id and eight random characters, all
/// upper-cased. Parsed codes only need to be non-empty ASCII tokens, since
/// they arrive from query strings and are compared verbatim.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferralCode(String);

impl ReferralCode {
    /// Generate a fresh code for `referrer`.
    ///
    /// Uniqueness relies on the random suffix; the store is not consulted.
    #[must_use]
    pub fn generate(referrer: &AccountId) -> Self {
        let suffix: String = uuid::Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(REFERRAL_SUFFIX_LEN)
            .collect();
        let code = format!("{REFERRAL_CODE_PREFIX}{}_{suffix}", referrer.fragment());
        Self(code.to_uppercase())
    }

    /// Borrow the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ReferralCode {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CodeError::Empty);
        }
        if s.len() > MAX_REFERRAL_CODE_LEN {
            return Err(CodeError::TooLong { len: s.len() });
        }
        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(CodeError::InvalidCharacter(c));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ReferralCode {
    type Error = CodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReferralCode> for String {
    fn from(code: ReferralCode) -> Self {
        code.0
    }
}

impl AsRef<str> for ReferralCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ReferralCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReferralCode({})", self.0)
    }
}

impl fmt::Display for ReferralCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors produced when parsing a referral code from user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeError {
    /// The input was empty or whitespace.
    #[error("referral code is empty")]
    Empty,

    /// The input exceeds [`MAX_REFERRAL_CODE_LEN`].
    #[error("referral code too long: {len} characters")]
    TooLong {
        /// Length of the rejected input.
        len: usize,
    },

    /// The input contains a character outside `[A-Za-z0-9_-]`.
    #[error("invalid character in referral code: {0:?}")]
    InvalidCharacter(char),
}

/// A successful attribution of one account to its referrer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralRecord {
    /// Row identifier.
    pub id: ReferralId,

    /// The account whose code was used.
    pub referrer_id: AccountId,

    /// The newly registered account.
    pub referred_id: AccountId,

    /// The code presented at sign-up.
    pub referral_code: ReferralCode,

    /// Whether the reward was claimed. Always `false` at creation.
    pub reward_claimed: bool,

    /// When the referral was recorded.
    pub created_at: DateTime<Utc>,
}

impl ReferralRecord {
    /// Create an unclaimed referral record.
    #[must_use]
    pub fn new(referrer_id: AccountId, referred_id: AccountId, referral_code: ReferralCode) -> Self {
        Self {
            id: ReferralId::generate(),
            referrer_id,
            referred_id,
            referral_code,
            reward_claimed: false,
            created_at: Utc::now(),
        }
    }
}

/// A code registered to its referrer at issuance time.
///
/// Only written when code pre-registration is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedCode {
    /// The issued code.
    pub code: ReferralCode,
    /// The account the code belongs to.
    pub referrer_id: AccountId,
    /// When the code was issued.
    pub issued_at: DateTime<Utc>,
}

impl IssuedCode {
    /// Bind `code` to `referrer_id` now.
    #[must_use]
    pub fn new(code: ReferralCode, referrer_id: AccountId) -> Self {
        Self {
            code,
            referrer_id,
            issued_at: Utc::now(),
        }
    }
}
