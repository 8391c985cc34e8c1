//! Operator handlers. Require the `admin` role claim.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AdminAuth;
use crate::error::ApiError;
use crate::handlers::accounts::ProfileResponse;
use crate::handlers::format_cents;
use crate::state::AppState;

/// Overview response.
#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    /// Registered accounts.
    pub total_users: usize,
    /// Sum of earnings in cents.
    pub total_earnings_cents: i64,
    /// Sum of earnings formatted as dollars.
    pub total_earnings_formatted: String,
    /// Sum of mining balances in cents.
    pub total_mining_balance_cents: i64,
    /// Sum of referral counters.
    pub total_referrals: i64,
    /// Newest profiles.
    pub recent_users: Vec<ProfileResponse>,
}

/// Platform overview.
pub async fn overview(
    State(state): State<Arc<AppState>>,
    AdminAuth(admin): AdminAuth,
) -> Result<Json<OverviewResponse>, ApiError> {
    let overview = state.admin.overview()?;

    tracing::debug!(admin = %admin.account_id, total_users = overview.total_users, "Admin overview");

    Ok(Json(OverviewResponse {
        total_users: overview.total_users,
        total_earnings_cents: overview.total_earnings_cents,
        total_earnings_formatted: format_cents(overview.total_earnings_cents),
        total_mining_balance_cents: overview.total_mining_balance_cents,
        total_referrals: overview.total_referrals,
        recent_users: overview.recent_users.into_iter().map(Into::into).collect(),
    }))
}

/// User search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchUsersQuery {
    /// Case-insensitive substring of email or name.
    #[serde(default)]
    pub search: String,
    /// Maximum results (default: 50, max: 200).
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// User search response.
#[derive(Debug, Serialize)]
pub struct SearchUsersResponse {
    /// Matching profiles, newest first.
    pub users: Vec<ProfileResponse>,
}

/// Search users by email or name.
pub async fn search_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Query(query): Query<SearchUsersQuery>,
) -> Result<Json<SearchUsersResponse>, ApiError> {
    let users = state
        .admin
        .search_users(&query.search, query.limit.min(200))?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(SearchUsersResponse { users }))
}
