//! Router configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{accounts, admin, health, mining, notifications, referrals, stats};
use crate::state::AppState;

/// Maximum concurrent requests for the mining accrual endpoint.
const MINING_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Accounts (JWT auth)
/// - `POST /v1/accounts` - Register, optionally with a referral code
/// - `GET /v1/accounts/me` - Current profile
/// - `PATCH /v1/accounts/me` - Update profile
/// - `GET /v1/stats/me` - Current stats
///
/// ## Referrals (JWT auth)
/// - `POST /v1/referrals/link` - Issue a referral link
/// - `GET /v1/referrals/stats` - Referral summary
///
/// ## Notifications (JWT auth)
/// - `GET /v1/notifications` - List, newest first
/// - `POST /v1/notifications/:id/read` - Mark read
///
/// ## Mining (service API key)
/// - `POST /v1/mining/accrue` - Credit mining proceeds
///
/// ## Admin (JWT with `admin` role)
/// - `GET /v1/admin/overview` - Platform totals
/// - `GET /v1/admin/users?search=` - Search users
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let state = Arc::new(state);

    let mining_routes = Router::new()
        .route("/accrue", post(mining::accrue))
        .layer(ConcurrencyLimitLayer::new(MINING_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        // Accounts
        .route("/accounts", post(accounts::create_account))
        .route(
            "/accounts/me",
            get(accounts::get_profile).patch(accounts::update_profile),
        )
        .route("/stats/me", get(stats::get_stats))
        // Referrals
        .route("/referrals/link", post(referrals::create_link))
        .route("/referrals/stats", get(referrals::get_stats))
        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/:id/read", post(notifications::mark_read))
        // Admin
        .route("/admin/overview", get(admin::overview))
        .route("/admin/users", get(admin::search_users))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS))
        // Mining (own concurrency limit)
        .nest("/mining", mining_routes);

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
