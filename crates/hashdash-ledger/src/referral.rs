//! The referral ledger.
//!
//! Issues referral codes, attributes new accounts to the referrer whose code
//! they used, accrues the referral rewards and notifies the referrer.
//!
//! # Attribution
//!
//! A code resolves to a referrer by looking up an existing referral record
//! that used the same code. A freshly generated code therefore resolves only
//! once it has been recorded, unless code pre-registration is enabled in
//! [`ReferralConfig`], in which case codes issued through
//! [`ReferralLedger::issue_referral_link`] resolve from their first use.
//!
//! Each step of an attribution is a separate store call. A failure after the
//! referral record is written leaves the record in place without the rewards.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use hashdash_core::{
    AccountId, IssuedCode, Notification, ReferralCode, ReferralRecord, StatsDelta,
    REFERRAL_BONUS_CENTS,
};
use hashdash_store::{Store, StoreError};

use crate::error::Result;

/// Path of the sign-up page that accepts a `ref` query parameter.
const SIGNUP_PATH: &str = "/signup";

/// Referral ledger settings.
#[derive(Debug, Clone)]
pub struct ReferralConfig {
    /// Public origin of the dashboard, used to build referral links.
    pub public_base_url: String,

    /// Persist codes when links are issued so they resolve on first use.
    pub register_issued_codes: bool,
}

impl Default for ReferralConfig {
    fn default() -> Self {
        Self {
            public_base_url: "http://localhost:3000".into(),
            register_issued_codes: false,
        }
    }
}

/// A shareable referral link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralLink {
    /// The embedded code.
    pub code: ReferralCode,
    /// The full sign-up URL.
    pub url: String,
}

/// Outcome of an attribution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribution {
    /// The account was attributed and rewards accrued.
    Attributed(ReferralRecord),
    /// No referrer could be resolved for the code.
    UnknownCode,
    /// The code belongs to the account being attributed.
    SelfReferral,
    /// The account already has a referrer.
    AlreadyReferred,
}

impl Attribution {
    /// Whether the account was attributed by this call.
    #[must_use]
    pub const fn is_attributed(&self) -> bool {
        matches!(self, Self::Attributed(_))
    }
}

/// Display fields of a referred account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferredProfile {
    /// Display name.
    pub name: Option<String>,
    /// Email.
    pub email: String,
    /// When the referred account registered.
    pub created_at: DateTime<Utc>,
}

/// One referral joined with the referred account's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralEntry {
    /// The referral record.
    pub record: ReferralRecord,
    /// The referred profile, if it still exists.
    pub referred: Option<ReferredProfile>,
}

/// Referral summary of one referrer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralStats {
    /// Number of accounts attributed to the referrer.
    pub total_referrals: usize,

    /// Referral earnings in cents, recomputed as
    /// `total_referrals * REFERRAL_BONUS_CENTS`.
    ///
    /// This is a reporting figure: `AccountStats::earnings_cents` also
    /// includes mining proceeds and is the account's balance of record.
    pub total_earnings_cents: i64,

    /// The referrals, oldest first.
    pub referrals: Vec<ReferralEntry>,
}

/// The referral ledger.
///
/// Stateless between calls; all state lives in the injected store.
#[derive(Clone)]
pub struct ReferralLedger {
    store: Arc<dyn Store>,
    config: ReferralConfig,
}

impl ReferralLedger {
    /// Create a ledger over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ReferralConfig) -> Self {
        Self { store, config }
    }

    /// Ledger settings.
    #[must_use]
    pub fn config(&self) -> &ReferralConfig {
        &self.config
    }

    /// Generate a new code for `account_id`. No side effects.
    #[must_use]
    pub fn generate_code(&self, account_id: &AccountId) -> ReferralCode {
        ReferralCode::generate(account_id)
    }

    /// Sign-up URL embedding `code`.
    #[must_use]
    pub fn link_for(&self, code: &ReferralCode) -> String {
        format!(
            "{}{SIGNUP_PATH}?ref={code}",
            self.config.public_base_url.trim_end_matches('/')
        )
    }

    /// Build a link with a freshly generated code. No side effects.
    #[must_use]
    pub fn build_referral_link(&self, account_id: &AccountId) -> ReferralLink {
        let code = self.generate_code(account_id);
        let url = self.link_for(&code);
        ReferralLink { code, url }
    }

    /// Build a link and, if pre-registration is enabled, persist its code.
    ///
    /// # Errors
    ///
    /// Returns an error if registering the code fails.
    pub fn issue_referral_link(&self, account_id: &AccountId) -> Result<ReferralLink> {
        let link = self.build_referral_link(account_id);

        if self.config.register_issued_codes {
            self.store
                .put_issued_code(&IssuedCode::new(link.code.clone(), *account_id))?;
            tracing::debug!(account_id = %account_id, code = %link.code, "Referral code registered");
        }

        Ok(link)
    }

    /// Attribute `new_account` to the owner of `code` and accrue rewards.
    ///
    /// Returns `true` only if the account was attributed by this call. Unknown
    /// or malformed codes, self-referrals, already-attributed accounts and
    /// storage failures all return `false`; failures are logged.
    pub fn process_referral(&self, code: &str, new_account: &AccountId) -> bool {
        let code: ReferralCode = match code.parse() {
            Ok(code) => code,
            Err(e) => {
                tracing::debug!(new_account = %new_account, error = %e, "Malformed referral code");
                return false;
            }
        };

        match self.attribute(&code, new_account) {
            Ok(Attribution::Attributed(_)) => true,
            Ok(Attribution::UnknownCode) => {
                tracing::debug!(code = %code, new_account = %new_account, "Referral code did not resolve");
                false
            }
            Ok(outcome) => {
                tracing::warn!(
                    code = %code,
                    new_account = %new_account,
                    outcome = ?outcome,
                    "Referral rejected"
                );
                false
            }
            Err(e) => {
                tracing::error!(
                    code = %code,
                    new_account = %new_account,
                    error = %e,
                    "Error processing referral"
                );
                false
            }
        }
    }

    /// Attribute `new_account` to the owner of `code`, reporting why not.
    ///
    /// # Errors
    ///
    /// Returns an error if any store call fails. Steps completed before the
    /// failure are not undone.
    pub fn attribute(&self, code: &ReferralCode, new_account: &AccountId) -> Result<Attribution> {
        let Some(referrer) = self.resolve_referrer(code)? else {
            return Ok(Attribution::UnknownCode);
        };

        if referrer == *new_account {
            return Ok(Attribution::SelfReferral);
        }

        let record = ReferralRecord::new(referrer, *new_account, code.clone());
        match self.store.insert_referral(&record) {
            Ok(()) => {}
            Err(StoreError::DuplicateReferral { .. }) => return Ok(Attribution::AlreadyReferred),
            Err(e) => return Err(e.into()),
        }

        self.accrue(&referrer, &StatsDelta::referral_reward())?;
        self.accrue(new_account, &StatsDelta::welcome_bonus())?;

        self.store
            .insert_notification(&Notification::referral_reward(referrer))?;

        tracing::info!(
            referrer = %referrer,
            referred = %new_account,
            code = %code,
            referral_id = %record.id,
            "Referral attributed"
        );

        Ok(Attribution::Attributed(record))
    }

    /// Referral summary for `referrer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn referral_stats(&self, referrer: &AccountId) -> Result<ReferralStats> {
        let records = self.store.list_referrals_by_referrer(referrer)?;

        let mut referrals = Vec::with_capacity(records.len());
        for record in records {
            let referred = self
                .store
                .get_profile(&record.referred_id)?
                .map(|p| ReferredProfile {
                    name: p.name,
                    email: p.email,
                    created_at: p.created_at,
                });
            referrals.push(ReferralEntry { record, referred });
        }

        let total_referrals = referrals.len();
        let total_earnings_cents = i64::try_from(total_referrals)
            .map_or(i64::MAX, |n| n.saturating_mul(REFERRAL_BONUS_CENTS));

        Ok(ReferralStats {
            total_referrals,
            total_earnings_cents,
            referrals,
        })
    }

    fn resolve_referrer(&self, code: &ReferralCode) -> Result<Option<AccountId>> {
        if let Some(record) = self.store.find_referral_by_code(code)? {
            return Ok(Some(record.referrer_id));
        }
        if self.config.register_issued_codes {
            return Ok(self
                .store
                .get_issued_code(code)?
                .map(|issued| issued.referrer_id));
        }
        Ok(None)
    }

    /// Apply `delta` if the account has a stats row; a missing row is skipped.
    fn accrue(&self, account_id: &AccountId, delta: &StatsDelta) -> Result<()> {
        match self.store.apply_stats_delta(account_id, delta) {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound { .. }) => {
                tracing::debug!(account_id = %account_id, "No stats row, accrual skipped");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashdash_core::{AccountStats, NotificationId, NotificationKind, Profile};
    use hashdash_store::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        ledger: ReferralLedger,
    }

    fn fixture(register_issued_codes: bool) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let ledger = ReferralLedger::new(
            store.clone(),
            ReferralConfig {
                public_base_url: "https://hashdash.example/".into(),
                register_issued_codes,
            },
        );
        Fixture { store, ledger }
    }

    fn register(store: &MemoryStore, email: &str) -> AccountId {
        let id = AccountId::generate();
        store
            .create_account(
                &Profile::new(id, email.into(), Some(email.into())),
                &AccountStats::new(id),
            )
            .unwrap();
        id
    }

    /// Seed one prior referral so that `code` resolves to `referrer`.
    fn seed_prior_referral(store: &MemoryStore, referrer: AccountId) -> ReferralCode {
        let code = ReferralCode::generate(&referrer);
        store
            .insert_referral(&ReferralRecord::new(referrer, AccountId::generate(), code.clone()))
            .unwrap();
        code
    }

    #[test]
    fn link_embeds_code() {
        let f = fixture(false);
        let id = AccountId::generate();
        let link = f.ledger.build_referral_link(&id);

        assert_eq!(
            link.url,
            format!("https://hashdash.example/signup?ref={}", link.code)
        );
        assert!(link.code.as_str().starts_with("REF_"));
    }

    #[test]
    fn fresh_code_does_not_resolve() {
        // A generated code resolves only after a referral has used it.
        let f = fixture(false);
        let referrer = register(&f.store, "referrer@example.com");
        let newcomer = register(&f.store, "new@example.com");

        let link = f.ledger.issue_referral_link(&referrer).unwrap();
        assert!(!f.ledger.process_referral(link.code.as_str(), &newcomer));
        assert!(f.store.find_referral_by_referred(&newcomer).unwrap().is_none());
    }

    #[test]
    fn attribution_accrues_rewards_and_notifies() {
        let f = fixture(false);
        let referrer = register(&f.store, "referrer@example.com");
        let newcomer = register(&f.store, "new@example.com");
        let code = seed_prior_referral(&f.store, referrer);

        let mut stats = f.store.get_stats(&referrer).unwrap().unwrap();
        stats.referral_count = 2;
        stats.earnings_cents = 2000;
        stats.total_points = 200;
        f.store.put_stats(&stats).unwrap();

        assert!(f.ledger.process_referral(code.as_str(), &newcomer));

        let referrer_stats = f.store.get_stats(&referrer).unwrap().unwrap();
        assert_eq!(referrer_stats.referral_count, 3);
        assert_eq!(referrer_stats.earnings_cents, 3000);
        assert_eq!(referrer_stats.total_points, 300);

        let newcomer_stats = f.store.get_stats(&newcomer).unwrap().unwrap();
        assert_eq!(newcomer_stats.total_points, 50);

        let notifications = f.store.list_notifications(&referrer, 10, 0).unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Success);

        let record = f.store.find_referral_by_referred(&newcomer).unwrap().unwrap();
        assert_eq!(record.referrer_id, referrer);
        assert_eq!(record.referral_code, code);
        assert!(!record.reward_claimed);
    }

    #[test]
    fn second_attribution_is_rejected() {
        let f = fixture(false);
        let referrer = register(&f.store, "referrer@example.com");
        let newcomer = register(&f.store, "new@example.com");
        let code = seed_prior_referral(&f.store, referrer);

        assert!(f.ledger.process_referral(code.as_str(), &newcomer));
        assert!(!f.ledger.process_referral(code.as_str(), &newcomer));

        let stats = f.store.get_stats(&referrer).unwrap().unwrap();
        assert_eq!(stats.referral_count, 1);
        assert_eq!(stats.earnings_cents, REFERRAL_BONUS_CENTS);
        assert_eq!(f.store.get_stats(&newcomer).unwrap().unwrap().total_points, 50);
        assert_eq!(f.store.list_notifications(&referrer, 10, 0).unwrap().len(), 1);
        // The seeded referral plus one attribution.
        assert_eq!(f.store.list_referrals_by_referrer(&referrer).unwrap().len(), 2);
    }

    #[test]
    fn self_referral_is_rejected() {
        let f = fixture(false);
        let referrer = register(&f.store, "referrer@example.com");
        let code = seed_prior_referral(&f.store, referrer);

        assert_eq!(
            f.ledger.attribute(&code, &referrer).unwrap(),
            Attribution::SelfReferral
        );
        assert_eq!(f.store.get_stats(&referrer).unwrap().unwrap().referral_count, 0);
    }

    #[test]
    fn malformed_code_is_a_miss() {
        let f = fixture(false);
        assert!(!f.ledger.process_referral("", &AccountId::generate()));
        assert!(!f.ledger.process_referral("REF_<script>", &AccountId::generate()));
    }

    #[test]
    fn missing_stats_rows_are_skipped() {
        let f = fixture(false);
        let referrer = AccountId::generate();
        let newcomer = AccountId::generate();
        let code = seed_prior_referral(&f.store, referrer);

        assert!(f.ledger.process_referral(code.as_str(), &newcomer));
        assert_eq!(f.store.list_notifications(&referrer, 10, 0).unwrap().len(), 1);
    }

    #[test]
    fn registered_codes_resolve_on_first_use() {
        let f = fixture(true);
        let referrer = register(&f.store, "referrer@example.com");
        let newcomer = register(&f.store, "new@example.com");

        let link = f.ledger.issue_referral_link(&referrer).unwrap();
        assert!(f.ledger.process_referral(link.code.as_str(), &newcomer));
        assert_eq!(f.store.get_stats(&referrer).unwrap().unwrap().referral_count, 1);
    }

    #[test]
    fn stats_recompute_earnings_from_count() {
        let f = fixture(false);
        let referrer = register(&f.store, "referrer@example.com");
        let code = ReferralCode::generate(&referrer);

        let mut referred = Vec::new();
        for i in 0..3 {
            let id = register(&f.store, &format!("friend{i}@example.com"));
            f.store
                .insert_referral(&ReferralRecord::new(referrer, id, code.clone()))
                .unwrap();
            referred.push(id);
        }

        let mut stats = f.store.get_stats(&referrer).unwrap().unwrap();
        stats.earnings_cents = 123_456;
        f.store.put_stats(&stats).unwrap();

        let summary = f.ledger.referral_stats(&referrer).unwrap();
        assert_eq!(summary.total_referrals, 3);
        assert_eq!(summary.total_earnings_cents, 3000);
        assert!(summary
            .referrals
            .iter()
            .all(|entry| entry.referred.as_ref().is_some_and(|p| p.email.starts_with("friend"))));
    }

    /// Store whose stats increments always fail.
    struct BrokenStats(MemoryStore);

    impl Store for BrokenStats {
        fn create_account(&self, p: &Profile, s: &AccountStats) -> hashdash_store::Result<()> {
            self.0.create_account(p, s)
        }
        fn put_profile(&self, p: &Profile) -> hashdash_store::Result<()> {
            self.0.put_profile(p)
        }
        fn get_profile(&self, id: &AccountId) -> hashdash_store::Result<Option<Profile>> {
            self.0.get_profile(id)
        }
        fn list_profiles(&self) -> hashdash_store::Result<Vec<Profile>> {
            self.0.list_profiles()
        }
        fn put_stats(&self, s: &AccountStats) -> hashdash_store::Result<()> {
            self.0.put_stats(s)
        }
        fn get_stats(&self, id: &AccountId) -> hashdash_store::Result<Option<AccountStats>> {
            self.0.get_stats(id)
        }
        fn list_stats(&self) -> hashdash_store::Result<Vec<AccountStats>> {
            self.0.list_stats()
        }
        fn apply_stats_delta(
            &self,
            _: &AccountId,
            _: &StatsDelta,
        ) -> hashdash_store::Result<AccountStats> {
            Err(StoreError::Database("connection reset".into()))
        }
        fn insert_referral(&self, r: &ReferralRecord) -> hashdash_store::Result<()> {
            self.0.insert_referral(r)
        }
        fn find_referral_by_code(
            &self,
            c: &ReferralCode,
        ) -> hashdash_store::Result<Option<ReferralRecord>> {
            self.0.find_referral_by_code(c)
        }
        fn find_referral_by_referred(
            &self,
            id: &AccountId,
        ) -> hashdash_store::Result<Option<ReferralRecord>> {
            self.0.find_referral_by_referred(id)
        }
        fn list_referrals_by_referrer(
            &self,
            id: &AccountId,
        ) -> hashdash_store::Result<Vec<ReferralRecord>> {
            self.0.list_referrals_by_referrer(id)
        }
        fn put_issued_code(&self, i: &IssuedCode) -> hashdash_store::Result<()> {
            self.0.put_issued_code(i)
        }
        fn get_issued_code(&self, c: &ReferralCode) -> hashdash_store::Result<Option<IssuedCode>> {
            self.0.get_issued_code(c)
        }
        fn insert_notification(&self, n: &Notification) -> hashdash_store::Result<()> {
            self.0.insert_notification(n)
        }
        fn list_notifications(
            &self,
            id: &AccountId,
            limit: usize,
            offset: usize,
        ) -> hashdash_store::Result<Vec<Notification>> {
            self.0.list_notifications(id, limit, offset)
        }
        fn mark_notification_read(
            &self,
            id: &AccountId,
            n: &NotificationId,
        ) -> hashdash_store::Result<Notification> {
            self.0.mark_notification_read(id, n)
        }
    }

    #[test]
    fn failure_after_recording_is_not_rolled_back() {
        let inner = MemoryStore::new();
        let referrer = register(&inner, "referrer@example.com");
        let newcomer = register(&inner, "new@example.com");
        let code = seed_prior_referral(&inner, referrer);

        let store = Arc::new(BrokenStats(inner));
        let ledger = ReferralLedger::new(store.clone(), ReferralConfig::default());

        assert!(!ledger.process_referral(code.as_str(), &newcomer));

        // The record stays, the rewards and notification never happened.
        assert!(store.find_referral_by_referred(&newcomer).unwrap().is_some());
        assert_eq!(store.get_stats(&referrer).unwrap().unwrap().referral_count, 0);
        assert!(store.list_notifications(&referrer, 10, 0).unwrap().is_empty());
    }
}
