//! Account stats handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use hashdash_core::AccountStats;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::format_cents;
use crate::state::AppState;

/// Stats response.
#[derive(Debug, Serialize)]
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

impl From<&AccountStats> for StatsResponse {
    fn from(stats: &AccountStats) -> Self {
        Self {
            account_id: stats.account_id.to_string(),
            mining_balance_cents: stats.mining_balance_cents,
            mining_balance_formatted: format_cents(stats.mining_balance_cents),
            referral_count: stats.referral_count,
            earnings_cents: stats.earnings_cents,
            earnings_formatted: format_cents(stats.earnings_cents),
            total_points: stats.total_points,
            level: stats.level,
            updated_at: stats.updated_at,
        }
    }
}

/// Get the current user's stats.
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.accounts.stats(&auth.account_id)?;
    Ok(Json(StatsResponse::from(&stats)))
}
