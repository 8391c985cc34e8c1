//! Account directory: registration, profiles, stats and notifications.

use std::sync::Arc;

use hashdash_core::{
    AccountId, AccountStats, Notification, NotificationId, Profile, ProfileUpdate, StatsDelta,
};
use hashdash_store::{Store, StoreError};

use crate::error::{LedgerError, Result};
use crate::referral::ReferralLedger;

/// Largest page of notifications returned by one call.
pub const MAX_NOTIFICATION_PAGE: usize = 100;

/// Registration request.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Identity provider subject.
    pub account_id: AccountId,
    /// Contact email.
    pub email: String,
    /// Display name.
    pub name: Option<String>,
    /// Referral code from the sign-up link, if any.
    pub referral_code: Option<String>,
}

/// Result of a registration.
#[derive(Debug, Clone)]
pub struct Registration {
    /// The stored profile.
    pub profile: Profile,
    /// Stats after registration, including any welcome bonus.
    pub stats: AccountStats,
    /// Whether the supplied referral code attributed the account.
    pub referral_attributed: bool,
}

/// Account operations over a [`Store`].
#[derive(Clone)]
pub struct Accounts {
    store: Arc<dyn Store>,
    referrals: Arc<ReferralLedger>,
}

impl Accounts {
    /// Create the directory.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, referrals: Arc<ReferralLedger>) -> Self {
        Self { store, referrals }
    }

    /// Register an account and, if a code was supplied, attribute it.
    ///
    /// A code that fails to attribute does not fail the registration.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidInput` if the email is blank.
    /// - `LedgerError::AccountExists` if the account is already registered.
    pub fn register(&self, request: NewAccount) -> Result<Registration> {
        let NewAccount {
            account_id,
            email,
            name,
            referral_code,
        } = request;

        let email = validate_email(&email)?;
        let name = name.filter(|n| !n.trim().is_empty());

        let profile = Profile::new(account_id, email, name);
        let stats = AccountStats::new(account_id);

        match self.store.create_account(&profile, &stats) {
            Ok(()) => {}
            Err(StoreError::AlreadyExists { .. }) => {
                return Err(LedgerError::AccountExists {
                    account_id: account_id.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(account_id = %account_id, "Account registered");

        let referral_attributed = referral_code
            .as_deref()
            .is_some_and(|code| self.referrals.process_referral(code, &account_id));

        let stats = if referral_attributed {
            self.stats(&account_id)?
        } else {
            stats
        };

        Ok(Registration {
            profile,
            stats,
            referral_attributed,
        })
    }

    /// Get a profile.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountNotFound` if the account is not registered.
    pub fn profile(&self, account_id: &AccountId) -> Result<Profile> {
        self.store
            .get_profile(account_id)?
            .ok_or_else(|| LedgerError::account_not_found(account_id))
    }

    /// Apply a partial profile update.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing or the new email is blank.
    pub fn update_profile(&self, account_id: &AccountId, update: ProfileUpdate) -> Result<Profile> {
        let mut update = update;
        if let Some(email) = update.email.take() {
            update.email = Some(validate_email(&email)?);
        }

        let mut profile = self.profile(account_id)?;
        profile.apply(update);
        self.store.put_profile(&profile)?;

        tracing::debug!(account_id = %account_id, "Profile updated");
        Ok(profile)
    }

    /// Get an account's stats.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountNotFound` if the account has no stats row.
    pub fn stats(&self, account_id: &AccountId) -> Result<AccountStats> {
        self.store
            .get_stats(account_id)?
            .ok_or_else(|| LedgerError::account_not_found(account_id))
    }

    /// Credit mining proceeds to an account.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidInput` if an amount is negative or both are zero.
    /// - `LedgerError::AccountNotFound` if the account has no stats row.
    pub fn accrue_mining(
        &self,
        account_id: &AccountId,
        amount_cents: i64,
        points: i64,
    ) -> Result<AccountStats> {
        if amount_cents < 0 || points < 0 {
            return Err(LedgerError::InvalidInput(
                "mining amounts must not be negative".into(),
            ));
        }
        let delta = StatsDelta::mining(amount_cents, points);
        if delta.is_zero() {
            return Err(LedgerError::InvalidInput("nothing to accrue".into()));
        }

        let stats = match self.store.apply_stats_delta(account_id, &delta) {
            Ok(stats) => stats,
            Err(StoreError::NotFound { .. }) => {
                return Err(LedgerError::account_not_found(account_id))
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            account_id = %account_id,
            amount_cents,
            points,
            balance_cents = stats.mining_balance_cents,
            "Mining accrued"
        );
        Ok(stats)
    }

    /// List notifications, newest first. `limit` is capped at
    /// [`MAX_NOTIFICATION_PAGE`].
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn notifications(
        &self,
        account_id: &AccountId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Notification>> {
        let limit = limit.min(MAX_NOTIFICATION_PAGE);
        Ok(self.store.list_notifications(account_id, limit, offset)?)
    }

    /// Mark one of the account's notifications as read.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` (wrapped) if the notification does not
    /// belong to the account.
    pub fn mark_notification_read(
        &self,
        account_id: &AccountId,
        notification_id: &NotificationId,
    ) -> Result<Notification> {
        Ok(self
            .store
            .mark_notification_read(account_id, notification_id)?)
    }
}

fn validate_email(email: &str) -> Result<String> {
    let email = email.trim();
    if email.is_empty() {
        return Err(LedgerError::InvalidInput("email must not be empty".into()));
    }
    if !email.contains('@') {
        return Err(LedgerError::InvalidInput(format!("invalid email: {email}")));
    }
    Ok(email.to_string())
}
