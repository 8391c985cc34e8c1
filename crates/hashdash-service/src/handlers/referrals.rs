//! Referral handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use hashdash_ledger::{ReferralEntry, ReferralLink};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::format_cents;
use crate::state::AppState;

/// Referral link response.
#[derive(Debug, Serialize)]
pub struct ReferralLinkResponse {
    /// The referral code.
    pub code: String,
    /// Shareable sign-up URL.
    pub url: String,
}

impl From<ReferralLink> for ReferralLinkResponse {
    fn from(link: ReferralLink) -> Self {
        Self {
            code: link.code.to_string(),
            url: link.url,
        }
    }
}

/// Issue a referral link for the current user.
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ReferralLinkResponse>, ApiError> {
    // Links are only issued to registered accounts.
    state.accounts.profile(&auth.account_id)?;

    let link = state.referrals.issue_referral_link(&auth.account_id)?;
    Ok(Json(link.into()))
}

/// Referred account summary.
#[derive(Debug, Serialize)]
pub struct ReferredResponse {
    /// Display name.
    pub name: Option<String>,
    /// Email.
    pub email: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// One referral.
#[derive(Debug, Serialize)]
pub struct ReferralResponse {
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
    pub referred: Option<ReferredResponse>,
}

impl From<ReferralEntry> for ReferralResponse {
    fn from(entry: ReferralEntry) -> Self {
        let ReferralEntry { record, referred } = entry;
        Self {
            id: record.id.to_string(),
            referred_id: record.referred_id.to_string(),
            referral_code: record.referral_code.to_string(),
            reward_claimed: record.reward_claimed,
            created_at: record.created_at,
            referred: referred.map(|p| ReferredResponse {
                name: p.name,
                email: p.email,
                created_at: p.created_at,
            }),
        }
    }
}

/// Referral stats response.
#[derive(Debug, Serialize)]
pub struct ReferralStatsResponse {
    /// Number of referrals.
    pub total_referrals: usize,
    /// Referral earnings in cents.
    pub total_earnings_cents: i64,
    /// Referral earnings formatted as dollars.
    pub total_earnings_formatted: String,
    /// Referrals, oldest first.
    pub referrals: Vec<ReferralResponse>,
}

/// Get the current user's referral stats.
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ReferralStatsResponse>, ApiError> {
    let stats = state.referrals.referral_stats(&auth.account_id)?;

    Ok(Json(ReferralStatsResponse {
        total_referrals: stats.total_referrals,
        total_earnings_cents: stats.total_earnings_cents,
        total_earnings_formatted: format_cents(stats.total_earnings_cents),
        referrals: stats.referrals.into_iter().map(Into::into).collect(),
    }))
}
