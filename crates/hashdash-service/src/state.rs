//! Application state.

use std::sync::Arc;

use hashdash_ledger::{Accounts, Admin, ReferralLedger};
use hashdash_store::Store;

use crate::auth::JwksCache;
use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Referral ledger.
    pub referrals: Arc<ReferralLedger>,

    /// Account directory.
    pub accounts: Accounts,

    /// Operator queries.
    pub admin: Admin,

    jwks: Arc<JwksCache>,
}

impl AppState {
    /// Wire the ledger components over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let referrals = Arc::new(ReferralLedger::new(
            Arc::clone(&store),
            config.referral_config(),
        ));
        let accounts = Accounts::new(Arc::clone(&store), Arc::clone(&referrals));
        let admin = Admin::new(Arc::clone(&store));

        if config.register_issued_codes {
            tracing::info!("Referral codes are registered when links are issued");
        }
        if config.service_api_key.is_none() {
            tracing::warn!("SERVICE_API_KEY not configured - mining accruals will be rejected");
        }

        Self {
            store,
            config,
            referrals,
            accounts,
            admin,
            jwks: Arc::new(JwksCache::new()),
        }
    }

    pub(crate) fn jwks(&self) -> &JwksCache {
        &self.jwks
    }
}
