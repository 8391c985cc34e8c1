//! Key encoding utilities for `RocksDB`.
//!
//! Identifiers are stored as their 16-byte encodings. ULID bytes sort by
//! creation time, so composite keys `owner || ulid` iterate oldest first.

use hashdash_core::{AccountId, NotificationId, ReferralCode, ReferralId};

/// Separator between a variable-length code and the id that follows it.
/// Codes are ASCII without NUL, so the separator cannot appear inside one.
const CODE_SEPARATOR: u8 = 0x00;

/// Create an account key (profiles, stats, referred index).
#[must_use]
pub fn account_key(account_id: &AccountId) -> Vec<u8> {
    account_id.as_bytes().to_vec()
}

/// Create a referral key.
#[must_use]
pub fn referral_key(referral_id: &ReferralId) -> Vec<u8> {
    referral_id.to_bytes().to_vec()
}

/// Create a referrer index key: `referrer_id (16) || referral_id (16)`.
#[must_use]
pub fn referrer_referral_key(referrer_id: &AccountId, referral_id: &ReferralId) -> Vec<u8> {
    owner_key(referrer_id, &referral_id.to_bytes())
}

/// Create a code index key: `code || 0x00 || referral_id (16)`.
#[must_use]
pub fn code_referral_key(code: &ReferralCode, referral_id: &ReferralId) -> Vec<u8> {
    let mut key = code_prefix(code);
    key.extend_from_slice(&referral_id.to_bytes());
    key
}

/// Prefix for iterating code index entries of `code`.
#[must_use]
pub fn code_prefix(code: &ReferralCode) -> Vec<u8> {
    let mut key = Vec::with_capacity(code.as_str().len() + 17);
    key.extend_from_slice(code.as_str().as_bytes());
    key.push(CODE_SEPARATOR);
    key
}

/// Create an issued-code key.
#[must_use]
pub fn issued_code_key(code: &ReferralCode) -> Vec<u8> {
    code.as_str().as_bytes().to_vec()
}

/// Create a notification key.
#[must_use]
pub fn notification_key(notification_id: &NotificationId) -> Vec<u8> {
    notification_id.to_bytes().to_vec()
}

/// Create a user index key: `user_id (16) || notification_id (16)`.
#[must_use]
pub fn user_notification_key(user_id: &AccountId, notification_id: &NotificationId) -> Vec<u8> {
    owner_key(user_id, &notification_id.to_bytes())
}

/// Prefix for iterating index entries owned by an account.
#[must_use]
pub fn owner_prefix(account_id: &AccountId) -> Vec<u8> {
    account_id.as_bytes().to_vec()
}

/// Extract the trailing 16-byte id from a composite index key.
///
/// Returns `None` if the key is shorter than 16 bytes.
#[must_use]
pub fn trailing_id(key: &[u8]) -> Option<[u8; 16]> {
    let start = key.len().checked_sub(16)?;
    key[start..].try_into().ok()
}

fn owner_key(owner: &AccountId, id: &[u8; 16]) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(owner.as_bytes());
    key.extend_from_slice(id);
    key
}
