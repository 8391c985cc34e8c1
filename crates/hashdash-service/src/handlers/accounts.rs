//! Account registration and profile handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hashdash_core::{Profile, ProfileUpdate};
use hashdash_ledger::NewAccount;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::stats::StatsResponse;
use crate::state::AppState;

/// Profile response.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// Account ID.
    pub account_id: String,
    /// Email.
    pub email: String,
    /// Display name.
    pub name: Option<String>,
    /// Avatar URL.
    pub avatar_url: Option<String>,
    /// Biography.
    pub bio: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// Telegram handle.
    pub telegram: Option<String>,
    /// Payout wallet address.
    pub wallet_address: Option<String>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Last update.
    pub updated_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            account_id: p.account_id.to_string(),
            email: p.email,
            name: p.name,
            avatar_url: p.avatar_url,
            bio: p.bio,
            country: p.country,
            telegram: p.telegram,
            wallet_address: p.wallet_address,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Registration request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateAccountRequest {
    /// Email; defaults to the token's email claim.
    pub email: Option<String>,
    /// Display name; defaults to the token's name claim.
    pub name: Option<String>,
    /// Referral code from the sign-up link.
    pub referral_code: Option<String>,
}

/// Registration response.
#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    /// The new profile.
    pub profile: ProfileResponse,
    /// Initial stats.
    pub stats: StatsResponse,
    /// Whether the referral code attributed the account.
    pub referral_attributed: bool,
}

/// Register the current user.
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateAccountRequest>,
) -> Result<Json<RegistrationResponse>, ApiError> {
    let email = body
        .email
        .or(auth.email)
        .ok_or_else(|| ApiError::BadRequest("email is required".into()))?;

    let registration = state.accounts.register(NewAccount {
        account_id: auth.account_id,
        email,
        name: body.name.or(auth.name),
        referral_code: body.referral_code,
    })?;

    Ok(Json(RegistrationResponse {
        stats: StatsResponse::from(&registration.stats),
        profile: registration.profile.into(),
        referral_attributed: registration.referral_attributed,
    }))
}

/// Get the current user's profile.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state.accounts.profile(&auth.account_id)?;
    Ok(Json(profile.into()))
}

/// Update the current user's profile.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state.accounts.update_profile(&auth.account_id, update)?;
    Ok(Json(profile.into()))
}
