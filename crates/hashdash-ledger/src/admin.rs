//! Operator overview across all accounts.

use std::sync::Arc;

use hashdash_core::Profile;
use hashdash_store::Store;

use crate::error::Result;

/// Number of recent profiles included in the overview.
pub const RECENT_USERS: usize = 10;

/// Platform totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    /// Registered accounts.
    pub total_users: usize,
    /// Sum of all accounts' earnings, in cents.
    pub total_earnings_cents: i64,
    /// Sum of all mining balances, in cents.
    pub total_mining_balance_cents: i64,
    /// Sum of all referral counters.
    pub total_referrals: i64,
    /// Most recently registered profiles, newest first.
    pub recent_users: Vec<Profile>,
}

/// Read-only queries for operators.
#[derive(Clone)]
pub struct Admin {
    store: Arc<dyn Store>,
}

impl Admin {
    /// Create the admin view over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Compute platform totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn overview(&self) -> Result<Overview> {
        let profiles = self.store.list_profiles()?;
        let stats = self.store.list_stats()?;

        let (earnings, balance, referrals) = stats.iter().fold((0i64, 0i64, 0i64), |acc, s| {
            (
                acc.0.saturating_add(s.earnings_cents),
                acc.1.saturating_add(s.mining_balance_cents),
                acc.2.saturating_add(s.referral_count),
            )
        });

        Ok(Overview {
            total_users: profiles.len(),
            total_earnings_cents: earnings,
            total_mining_balance_cents: balance,
            total_referrals: referrals,
            recent_users: profiles.into_iter().take(RECENT_USERS).collect(),
        })
    }

    /// Profiles whose email or name contains `term`, newest first.
    ///
    /// A blank term matches everyone.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn search_users(&self, term: &str, limit: usize) -> Result<Vec<Profile>> {
        let term = term.trim();
        let profiles = self.store.list_profiles()?;
        Ok(profiles
            .into_iter()
            .filter(|p| term.is_empty() || p.matches(term))
            .take(limit)
            .collect())
    }
}
