//! In-memory storage implementation.
//!
//! All tables sit behind one `RwLock`, which makes every `Store` method
//! atomic with respect to the others.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use hashdash_core::{
    AccountId, AccountStats, IssuedCode, Notification, NotificationId, Profile, ReferralCode,
    ReferralId, ReferralRecord, StatsDelta,
};

use crate::error::{Result, StoreError};
use crate::Store;

#[derive(Default)]
struct Tables {
    profiles: HashMap<AccountId, Profile>,
    stats: HashMap<AccountId, AccountStats>,
    referrals: BTreeMap<ReferralId, ReferralRecord>,
    referrals_by_referred: HashMap<AccountId, ReferralId>,
    issued_codes: HashMap<ReferralCode, IssuedCode>,
    notifications: BTreeMap<NotificationId, Notification>,
}

/// Process-local `Store`.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> Result<T> {
        let tables = self.tables.read().map_err(StoreError::poisoned)?;
        Ok(f(&tables))
    }

    fn write<T>(&self, f: impl FnOnce(&mut Tables) -> Result<T>) -> Result<T> {
        let mut tables = self.tables.write().map_err(StoreError::poisoned)?;
        f(&mut tables)
    }
}

impl Store for MemoryStore {
    fn create_account(&self, profile: &Profile, stats: &AccountStats) -> Result<()> {
        self.write(|t| {
            if t.profiles.contains_key(&profile.account_id) {
                return Err(StoreError::already_exists("profile", profile.account_id));
            }
            t.profiles.insert(profile.account_id, profile.clone());
            t.stats.insert(stats.account_id, stats.clone());
            Ok(())
        })
    }

    fn put_profile(&self, profile: &Profile) -> Result<()> {
        self.write(|t| {
            t.profiles.insert(profile.account_id, profile.clone());
            Ok(())
        })
    }

    fn get_profile(&self, account_id: &AccountId) -> Result<Option<Profile>> {
        self.read(|t| t.profiles.get(account_id).cloned())
    }

    fn list_profiles(&self) -> Result<Vec<Profile>> {
        let mut profiles = self.read(|t| t.profiles.values().cloned().collect::<Vec<_>>())?;
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }

    fn put_stats(&self, stats: &AccountStats) -> Result<()> {
        self.write(|t| {
            t.stats.insert(stats.account_id, stats.clone());
            Ok(())
        })
    }

    fn get_stats(&self, account_id: &AccountId) -> Result<Option<AccountStats>> {
        self.read(|t| t.stats.get(account_id).cloned())
    }

    fn list_stats(&self) -> Result<Vec<AccountStats>> {
        self.read(|t| t.stats.values().cloned().collect())
    }

    fn apply_stats_delta(
        &self,
        account_id: &AccountId,
        delta: &StatsDelta,
    ) -> Result<AccountStats> {
        self.write(|t| {
            let stats = t
                .stats
                .get_mut(account_id)
                .ok_or_else(|| StoreError::not_found("stats", account_id))?;
            stats.apply(delta)?;
            Ok(stats.clone())
        })
    }

    fn insert_referral(&self, record: &ReferralRecord) -> Result<()> {
        self.write(|t| {
            if t.referrals_by_referred.contains_key(&record.referred_id) {
                return Err(StoreError::DuplicateReferral {
                    referred_id: record.referred_id.to_string(),
                });
            }
            t.referrals_by_referred.insert(record.referred_id, record.id);
            t.referrals.insert(record.id, record.clone());
            Ok(())
        })
    }

    fn find_referral_by_code(&self, code: &ReferralCode) -> Result<Option<ReferralRecord>> {
        self.read(|t| {
            t.referrals
                .values()
                .find(|r| &r.referral_code == code)
                .cloned()
        })
    }

    fn find_referral_by_referred(
        &self,
        referred_id: &AccountId,
    ) -> Result<Option<ReferralRecord>> {
        self.read(|t| {
            t.referrals_by_referred
                .get(referred_id)
                .and_then(|id| t.referrals.get(id))
                .cloned()
        })
    }

    fn list_referrals_by_referrer(&self, referrer_id: &AccountId) -> Result<Vec<ReferralRecord>> {
        self.read(|t| {
            t.referrals
                .values()
                .filter(|r| &r.referrer_id == referrer_id)
                .cloned()
                .collect()
        })
    }

    fn put_issued_code(&self, issued: &IssuedCode) -> Result<()> {
        self.write(|t| {
            if t.issued_codes.contains_key(&issued.code) {
                return Err(StoreError::already_exists("issued code", &issued.code));
            }
            t.issued_codes.insert(issued.code.clone(), issued.clone());
            Ok(())
        })
    }

    fn get_issued_code(&self, code: &ReferralCode) -> Result<Option<IssuedCode>> {
        self.read(|t| t.issued_codes.get(code).cloned())
    }

    fn insert_notification(&self, notification: &Notification) -> Result<()> {
        self.write(|t| {
            t.notifications
                .insert(notification.id, notification.clone());
            Ok(())
        })
    }

    fn list_notifications(
        &self,
        user_id: &AccountId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Notification>> {
        self.read(|t| {
            t.notifications
                .values()
                .rev()
                .filter(|n| &n.user_id == user_id)
                .skip(offset)
                .take(limit)
                .cloned()
                .collect()
        })
    }

    fn mark_notification_read(
        &self,
        user_id: &AccountId,
        notification_id: &NotificationId,
    ) -> Result<Notification> {
        self.write(|t| {
            let notification = t
                .notifications
                .get_mut(notification_id)
                .filter(|n| &n.user_id == user_id)
                .ok_or_else(|| StoreError::not_found("notification", notification_id))?;
            notification.read = true;
            Ok(notification.clone())
        })
    }
}
