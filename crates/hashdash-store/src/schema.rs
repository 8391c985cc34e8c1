//! Column families used by the `RocksDB` backend.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Profiles, keyed by `account_id`.
    pub const PROFILES: &str = "profiles";

    /// Account stats, keyed by `account_id`.
    pub const STATS: &str = "stats";

    /// Referral records, keyed by `referral_id` (ULID).
    pub const REFERRALS: &str = "referrals";

    /// Index: referrals by referrer, keyed by `referrer_id || referral_id`.
    /// Value is empty (index only).
    pub const REFERRALS_BY_REFERRER: &str = "referrals_by_referrer";

    /// Index: referral of a referred account, keyed by `referred_id`.
    /// Value is the `referral_id`. One entry per account enforces uniqueness.
    pub const REFERRALS_BY_REFERRED: &str = "referrals_by_referred";

    /// Index: referrals by code, keyed by `code || 0x00 || referral_id`.
    pub const REFERRALS_BY_CODE: &str = "referrals_by_code";

    /// Pre-registered codes, keyed by code.
    pub const ISSUED_CODES: &str = "issued_codes";

    /// Notifications, keyed by `notification_id` (ULID).
    pub const NOTIFICATIONS: &str = "notifications";

    /// Index: notifications by user, keyed by `user_id || notification_id`.
    pub const NOTIFICATIONS_BY_USER: &str = "notifications_by_user";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::PROFILES,
        cf::STATS,
        cf::REFERRALS,
        cf::REFERRALS_BY_REFERRER,
        cf::REFERRALS_BY_REFERRED,
        cf::REFERRALS_BY_CODE,
        cf::ISSUED_CODES,
        cf::NOTIFICATIONS,
        cf::NOTIFICATIONS_BY_USER,
    ]
}
