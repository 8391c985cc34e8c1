//! Request and response types for the hashdash API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mining accrual request.
#[derive(Debug, Clone, Serialize)]
pub struct AccrueMiningRequest {
    /// Account to credit.
    pub account_id: String,
    /// Mined amount in cents.
    pub amount_cents: i64,
    /// Points to award.
    pub points: i64,
}

/// Account stats.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    /// Account ID.
    pub account_id: String,
    /// Mined balance in cents.
    pub mining_balance_cents: i64,
    /// Mined balance formatted as dollars.
    pub mining_balance_formatted: String,
    /// Number of attributed referrals.
    pub referral_count: i64,
    /// Lifetime earnings in cents.
    pub earnings_cents: i64,
    /// Lifetime earnings formatted as dollars.
    pub earnings_formatted: String,
    /// Reward points.
    pub total_points: i64,
    /// Account level.
    pub level: i32,
    /// Last update.
    pub updated_at: DateTime<Utc>,
}

/// A referral link.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferralLinkResponse {
    /// The referral code.
    pub code: String,
    /// Sign-up URL embedding the code.
    pub url: String,
}

/// Referred account summary.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferredAccount {
    /// Display name.
    pub name: Option<String>,
    /// Email.
    pub email: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// One referral.
#[derive(Debug, Clone, Deserialize)]
pub struct Referral {
    /// Referral ID.
    pub id: String,
    /// Referred account ID.
    pub referred_id: String,
    /// Code used.
    pub referral_code: String,
    /// Reward claim flag.
    pub reward_claimed: bool,
    /// When the referral was recorded.
    pub created_at: DateTime<Utc>,
    /// Referred profile, if it still exists.
    pub referred: Option<ReferredAccount>,
}

/// Referral summary.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferralStatsResponse {
    /// Number of referrals.
    pub total_referrals: u64,
    /// Referral earnings in cents.
    pub total_earnings_cents: i64,
    /// Referral earnings formatted as dollars.
    pub total_earnings_formatted: String,
    /// Referrals, oldest first.
    pub referrals: Vec<Referral>,
}

/// API error response body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: String,
    pub message: String,
}
