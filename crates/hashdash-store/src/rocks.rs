//! `RocksDB` storage implementation.
//!
//! Values are CBOR-encoded rows. Secondary indexes live in their own column
//! families and are written in the same `WriteBatch` as the row. Methods that
//! read before writing hold `write_lock` so that checks and increments are
//! not interleaved with other writers.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options, WriteBatch,
};

use hashdash_core::{
    AccountId, AccountStats, IssuedCode, Notification, NotificationId, Profile, ReferralCode,
    ReferralId, ReferralRecord, StatsDelta,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    write_lock: Mutex<()>,
}

fn db_err(e: rocksdb::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(db_err)?;

        tracing::debug!(path = %path.display(), "RocksDB store opened");

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn get<T: serde::de::DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        self.db
            .get_cf(&cf, key)
            .map_err(db_err)?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn put<T: serde::Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let value = Self::serialize(value)?;
        self.db.put_cf(&cf, key, value).map_err(db_err)
    }

    fn scan<T: serde::de::DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        self.db
            .iterator_cf(&cf, IteratorMode::Start)
            .map(|item| {
                let (_, value) = item.map_err(db_err)?;
                Self::deserialize(&value)
            })
            .collect()
    }

    /// Keys of `cf_name` starting with `prefix`, in key order.
    fn prefix_keys(&self, cf_name: &str, prefix: &[u8]) -> Result<Vec<Box<[u8]>>> {
        let cf = self.cf(cf_name)?;
        let mut found = Vec::new();
        for item in self
            .db
            .iterator_cf(&cf, IteratorMode::From(prefix, Direction::Forward))
        {
            let (key, _) = item.map_err(db_err)?;
            if !key.starts_with(prefix) {
                break;
            }
            found.push(key);
        }
        Ok(found)
    }

    fn referral_from_index_key(&self, key: &[u8]) -> Result<Option<ReferralRecord>> {
        let id = keys::trailing_id(key)
            .ok_or_else(|| StoreError::Database("malformed referral index key".into()))?;
        self.get(cf::REFERRALS, &keys::referral_key(&ReferralId::from_bytes(id)))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(StoreError::poisoned)
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Profiles
    // =========================================================================

    fn create_account(&self, profile: &Profile, stats: &AccountStats) -> Result<()> {
        let _guard = self.lock()?;
        let key = keys::account_key(&profile.account_id);

        if self.get::<Profile>(cf::PROFILES, &key)?.is_some() {
            return Err(StoreError::already_exists("profile", profile.account_id));
        }

        let cf_profiles = self.cf(cf::PROFILES)?;
        let cf_stats = self.cf(cf::STATS)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_profiles, &key, Self::serialize(profile)?);
        batch.put_cf(
            &cf_stats,
            keys::account_key(&stats.account_id),
            Self::serialize(stats)?,
        );

        self.db.write(batch).map_err(db_err)
    }

    fn put_profile(&self, profile: &Profile) -> Result<()> {
        self.put(cf::PROFILES, &keys::account_key(&profile.account_id), profile)
    }

    fn get_profile(&self, account_id: &AccountId) -> Result<Option<Profile>> {
        self.get(cf::PROFILES, &keys::account_key(account_id))
    }

    fn list_profiles(&self) -> Result<Vec<Profile>> {
        let mut profiles: Vec<Profile> = self.scan(cf::PROFILES)?;
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }

    // =========================================================================
    // Stats
    // =========================================================================

    fn put_stats(&self, stats: &AccountStats) -> Result<()> {
        let _guard = self.lock()?;
        self.put(cf::STATS, &keys::account_key(&stats.account_id), stats)
    }

    fn get_stats(&self, account_id: &AccountId) -> Result<Option<AccountStats>> {
        self.get(cf::STATS, &keys::account_key(account_id))
    }

    fn list_stats(&self) -> Result<Vec<AccountStats>> {
        self.scan(cf::STATS)
    }

    fn apply_stats_delta(
        &self,
        account_id: &AccountId,
        delta: &StatsDelta,
    ) -> Result<AccountStats> {
        let _guard = self.lock()?;
        let key = keys::account_key(account_id);

        let mut stats: AccountStats = self
            .get(cf::STATS, &key)?
            .ok_or_else(|| StoreError::not_found("stats", account_id))?;
        stats.apply(delta)?;

        self.put(cf::STATS, &key, &stats)?;
        Ok(stats)
    }

    // =========================================================================
    // Referrals
    // =========================================================================

    fn insert_referral(&self, record: &ReferralRecord) -> Result<()> {
        let _guard = self.lock()?;
        let referred_key = keys::account_key(&record.referred_id);

        let cf_by_referred = self.cf(cf::REFERRALS_BY_REFERRED)?;
        if self
            .db
            .get_cf(&cf_by_referred, &referred_key)
            .map_err(db_err)?
            .is_some()
        {
            return Err(StoreError::DuplicateReferral {
                referred_id: record.referred_id.to_string(),
            });
        }

        let cf_referrals = self.cf(cf::REFERRALS)?;
        let cf_by_referrer = self.cf(cf::REFERRALS_BY_REFERRER)?;
        let cf_by_code = self.cf(cf::REFERRALS_BY_CODE)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_referrals,
            keys::referral_key(&record.id),
            Self::serialize(record)?,
        );
        batch.put_cf(
            &cf_by_referrer,
            keys::referrer_referral_key(&record.referrer_id, &record.id),
            b"",
        );
        batch.put_cf(&cf_by_referred, &referred_key, record.id.to_bytes());
        batch.put_cf(
            &cf_by_code,
            keys::code_referral_key(&record.referral_code, &record.id),
            b"",
        );

        self.db.write(batch).map_err(db_err)
    }

    fn find_referral_by_code(&self, code: &ReferralCode) -> Result<Option<ReferralRecord>> {
        let prefix = keys::code_prefix(code);
        match self.prefix_keys(cf::REFERRALS_BY_CODE, &prefix)?.first() {
            Some(key) => self.referral_from_index_key(key),
            None => Ok(None),
        }
    }

    fn find_referral_by_referred(
        &self,
        referred_id: &AccountId,
    ) -> Result<Option<ReferralRecord>> {
        let cf = self.cf(cf::REFERRALS_BY_REFERRED)?;
        let Some(id) = self
            .db
            .get_cf(&cf, keys::account_key(referred_id))
            .map_err(db_err)?
        else {
            return Ok(None);
        };
        self.referral_from_index_key(&id)
    }

    fn list_referrals_by_referrer(&self, referrer_id: &AccountId) -> Result<Vec<ReferralRecord>> {
        let prefix = keys::owner_prefix(referrer_id);
        let mut records = Vec::new();
        for key in self.prefix_keys(cf::REFERRALS_BY_REFERRER, &prefix)? {
            if let Some(record) = self.referral_from_index_key(&key)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn put_issued_code(&self, issued: &IssuedCode) -> Result<()> {
        let _guard = self.lock()?;
        let key = keys::issued_code_key(&issued.code);
        if self.get::<IssuedCode>(cf::ISSUED_CODES, &key)?.is_some() {
            return Err(StoreError::already_exists("issued code", &issued.code));
        }
        self.put(cf::ISSUED_CODES, &key, issued)
    }

    fn get_issued_code(&self, code: &ReferralCode) -> Result<Option<IssuedCode>> {
        self.get(cf::ISSUED_CODES, &keys::issued_code_key(code))
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    fn insert_notification(&self, notification: &Notification) -> Result<()> {
        let cf_notifications = self.cf(cf::NOTIFICATIONS)?;
        let cf_by_user = self.cf(cf::NOTIFICATIONS_BY_USER)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_notifications,
            keys::notification_key(&notification.id),
            Self::serialize(notification)?,
        );
        batch.put_cf(
            &cf_by_user,
            keys::user_notification_key(&notification.user_id, &notification.id),
            b"",
        );

        self.db.write(batch).map_err(db_err)
    }

    fn list_notifications(
        &self,
        user_id: &AccountId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Notification>> {
        let prefix = keys::owner_prefix(user_id);
        let mut index = self.prefix_keys(cf::NOTIFICATIONS_BY_USER, &prefix)?;
        // Keys iterate oldest first.
        index.reverse();

        let mut notifications = Vec::new();
        for key in index.iter().skip(offset).take(limit) {
            let id = keys::trailing_id(key)
                .ok_or_else(|| StoreError::Database("malformed notification index key".into()))?;
            let key = keys::notification_key(&NotificationId::from_bytes(id));
            if let Some(n) = self.get(cf::NOTIFICATIONS, &key)? {
                notifications.push(n);
            }
        }
        Ok(notifications)
    }

    fn mark_notification_read(
        &self,
        user_id: &AccountId,
        notification_id: &NotificationId,
    ) -> Result<Notification> {
        let _guard = self.lock()?;
        let key = keys::notification_key(notification_id);

        let mut notification: Notification = self
            .get(cf::NOTIFICATIONS, &key)?
            .filter(|n: &Notification| &n.user_id == user_id)
            .ok_or_else(|| StoreError::not_found("notification", notification_id))?;

        notification.read = true;
        self.put(cf::NOTIFICATIONS, &key, &notification)?;
        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn register(store: &RocksStore, email: &str) -> AccountId {
        let id = AccountId::generate();
        store
            .create_account(&Profile::new(id, email.into(), None), &AccountStats::new(id))
            .unwrap();
        id
    }

    #[test]
    fn account_lifecycle() {
        let (store, _dir) = create_test_store();
        let id = register(&store, "miner@example.com");

        assert!(matches!(
            store.create_account(
                &Profile::new(id, "again@example.com".into(), None),
                &AccountStats::new(id)
            ),
            Err(StoreError::AlreadyExists { .. })
        ));

        let stats = store
            .apply_stats_delta(&id, &StatsDelta::mining(500, 10))
            .unwrap();
        assert_eq!(stats.mining_balance_cents, 500);
        assert_eq!(store.get_stats(&id).unwrap().unwrap(), stats);
        assert_eq!(store.list_profiles().unwrap().len(), 1);
    }

    #[test]
    fn referral_indexes() {
        let (store, _dir) = create_test_store();
        let referrer = register(&store, "referrer@example.com");
        let code = ReferralCode::generate(&referrer);

        let first = ReferralRecord::new(referrer, AccountId::generate(), code.clone());
        store.insert_referral(&first).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = ReferralRecord::new(referrer, AccountId::generate(), code.clone());
        store.insert_referral(&second).unwrap();

        assert_eq!(store.find_referral_by_code(&code).unwrap(), Some(first.clone()));
        assert_eq!(
            store.find_referral_by_referred(&second.referred_id).unwrap(),
            Some(second.clone())
        );
        assert_eq!(
            store.list_referrals_by_referrer(&referrer).unwrap(),
            vec![first.clone(), second]
        );

        let dup = ReferralRecord::new(AccountId::generate(), first.referred_id, code);
        assert!(matches!(
            store.insert_referral(&dup),
            Err(StoreError::DuplicateReferral { .. })
        ));
    }

    #[test]
    fn unknown_code_resolves_to_none() {
        let (store, _dir) = create_test_store();
        let code = ReferralCode::generate(&AccountId::generate());
        assert!(store.find_referral_by_code(&code).unwrap().is_none());
        assert!(store.get_issued_code(&code).unwrap().is_none());
    }

    #[test]
    fn issued_codes_are_unique() {
        let (store, _dir) = create_test_store();
        let referrer = AccountId::generate();
        let issued = IssuedCode::new(ReferralCode::generate(&referrer), referrer);

        store.put_issued_code(&issued).unwrap();
        assert_eq!(store.get_issued_code(&issued.code).unwrap(), Some(issued.clone()));
        assert!(matches!(
            store.put_issued_code(&issued),
            Err(StoreError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn notifications_pagination() {
        let (store, _dir) = create_test_store();
        let id = register(&store, "miner@example.com");

        let mut ids = Vec::new();
        for _ in 0..3 {
            let n = Notification::referral_reward(id);
            store.insert_notification(&n).unwrap();
            ids.push(n.id);
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        let page = store.list_notifications(&id, 2, 0).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, ids[2]);
        assert_eq!(page[1].id, ids[1]);

        let read = store.mark_notification_read(&id, &ids[0]).unwrap();
        assert!(read.read);
        assert!(store.list_notifications(&id, 10, 2).unwrap()[0].read);
    }
}
