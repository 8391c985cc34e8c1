//! Hashdash HTTP API service.
//!
//! Serves the dashboard: registration with referral attribution, profiles,
//! stats, referral links and summaries, notifications, mining accruals and
//! an operator overview.
//!
//! # Authentication
//!
//! 1. **Identity provider JWTs** - dashboard users; an `admin` role claim
//!    unlocks the `/v1/admin` endpoints
//! 2. **Service API keys** - service-to-service requests (mining accruals)

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Axum handlers all return Result and are async by signature
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::unused_async)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
