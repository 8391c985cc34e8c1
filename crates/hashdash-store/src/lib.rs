//! Storage layer for hashdash.
//!
//! The ledger treats persistence as an external row store: per-table insert,
//! filtered select and update-by-key. This crate defines that contract as the
//! [`Store`] trait and ships two implementations:
//!
//! - [`MemoryStore`]: process-local tables, used by tests and single-node demos
//! - `RocksStore` (feature `rocksdb-backend`): column families in `RocksDB`
//!
//! # Atomicity
//!
//! Each method is atomic on its own. Nothing spans calls: a caller issuing
//! several writes gets no rollback if a later one fails. Stats updates go
//! through [`Store::apply_stats_delta`], an increment performed under the
//! store's write lock, so concurrent accruals for one account never lose
//! updates.
//!
//! # Example
//!
//! ```
//! use hashdash_core::{AccountId, AccountStats, Profile, StatsDelta};
//! use hashdash_store::{MemoryStore, Store};
//!
//! let store = MemoryStore::new();
//! let id = AccountId::generate();
//! store
//!     .create_account(&Profile::new(id, "a@b.c".into(), None), &AccountStats::new(id))
//!     .unwrap();
//!
//! let stats = store.apply_stats_delta(&id, &StatsDelta::welcome_bonus()).unwrap();
//! assert_eq!(stats.total_points, 50);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
#[cfg(feature = "rocksdb-backend")]
pub mod keys;
pub mod memory;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
#[cfg(feature = "rocksdb-backend")]
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use hashdash_core::{
    AccountId, AccountStats, IssuedCode, Notification, NotificationId, Profile, ReferralCode,
    ReferralRecord, StatsDelta,
};

/// The storage trait defining all row operations.
pub trait Store: Send + Sync {
    // =========================================================================
    // Profiles
    // =========================================================================

    /// Insert a profile and its zeroed stats row together.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if a profile for the account exists.
    fn create_account(&self, profile: &Profile, stats: &AccountStats) -> Result<()>;

    /// Insert or replace a profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_profile(&self, profile: &Profile) -> Result<()>;

    /// Get a profile by account ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_profile(&self, account_id: &AccountId) -> Result<Option<Profile>>;

    /// List all profiles, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_profiles(&self) -> Result<Vec<Profile>>;

    // =========================================================================
    // Stats
    // =========================================================================

    /// Insert or replace a stats row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_stats(&self, stats: &AccountStats) -> Result<()>;

    /// Get the stats row of an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_stats(&self, account_id: &AccountId) -> Result<Option<AccountStats>>;

    /// List every stats row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_stats(&self) -> Result<Vec<AccountStats>>;

    /// Atomically add `delta` to an account's stats and return the new row.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the account has no stats row.
    /// - `StoreError::InvalidStats` if a field would go negative.
    fn apply_stats_delta(&self, account_id: &AccountId, delta: &StatsDelta)
        -> Result<AccountStats>;

    // =========================================================================
    // Referrals
    // =========================================================================

    /// Insert a referral record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateReferral` if the referred account already
    /// has a record.
    fn insert_referral(&self, record: &ReferralRecord) -> Result<()>;

    /// Find the earliest referral record that used `code`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn find_referral_by_code(&self, code: &ReferralCode) -> Result<Option<ReferralRecord>>;

    /// Find the referral record attributing `referred_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn find_referral_by_referred(&self, referred_id: &AccountId)
        -> Result<Option<ReferralRecord>>;

    /// List referral records of a referrer, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_referrals_by_referrer(&self, referrer_id: &AccountId) -> Result<Vec<ReferralRecord>>;

    /// Register an issued code.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the code is already registered.
    fn put_issued_code(&self, issued: &IssuedCode) -> Result<()>;

    /// Look up an issued code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_issued_code(&self, code: &ReferralCode) -> Result<Option<IssuedCode>>;

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Insert a notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn insert_notification(&self, notification: &Notification) -> Result<()>;

    /// List an account's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_notifications(
        &self,
        user_id: &AccountId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Notification>>;

    /// Mark a notification as read and return it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the notification does not exist or
    /// belongs to another account.
    fn mark_notification_read(
        &self,
        user_id: &AccountId,
        notification_id: &NotificationId,
    ) -> Result<Notification>;
}
