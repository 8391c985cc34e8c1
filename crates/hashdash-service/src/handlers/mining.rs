//! Mining accrual handler (service-to-service).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use hashdash_core::AccountId;

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::handlers::stats::StatsResponse;
use crate::state::AppState;

/// Mining accrual request.
#[derive(Debug, Deserialize)]
pub struct AccrueMiningRequest {
    /// Account to credit.
    pub account_id: String,
    /// Mined amount in cents.
    pub amount_cents: i64,
    /// Points to award.
    #[serde(default)]
    pub points: i64,
}

/// Credit mining proceeds to an account.
pub async fn accrue(
    State(state): State<Arc<AppState>>,
    service: ServiceAuth,
    Json(body): Json<AccrueMiningRequest>,
) -> Result<Json<StatsResponse>, ApiError> {
    let account_id: AccountId = body
        .account_id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid account id: {}", body.account_id)))?;

    tracing::debug!(
        service = %service.service_name,
        account_id = %account_id,
        amount_cents = body.amount_cents,
        "Mining accrual requested"
    );

    let stats = state
        .accounts
        .accrue_mining(&account_id, body.amount_cents, body.points)?;

    Ok(Json(StatsResponse::from(&stats)))
}
