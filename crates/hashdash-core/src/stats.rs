//! Per-account aggregate statistics.
//!
//! Currency fields are integer cents; points and counters are plain
//! integers. Every field is non-negative and `level` starts at 1.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::referral::{REFERRAL_BONUS_CENTS, REFERRAL_BONUS_POINTS, WELCOME_BONUS_POINTS};
use crate::AccountId;

/// Level assigned at registration.
pub const INITIAL_LEVEL: i32 = 1;

/// Mutable aggregates for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStats {
    /// Owning account.
    pub account_id: AccountId,

    /// Mined balance in cents.
    pub mining_balance_cents: i64,

    /// Number of accounts attributed to this one.
    pub referral_count: i64,

    /// Lifetime earnings in cents (mining and referral rewards).
    pub earnings_cents: i64,

    /// Reward points.
    pub total_points: i64,

    /// Account level.
    pub level: i32,

    /// When the row was created.
    pub created_at: DateTime<Utc>,

    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl AccountStats {
    /// Zeroed stats at the initial level.
    #[must_use]
    pub fn new(account_id: AccountId) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            mining_balance_cents: 0,
            referral_count: 0,
            earnings_cents: 0,
            total_points: 0,
            level: INITIAL_LEVEL,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply `delta` in place.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError`] if any field would overflow or go negative; the
    /// row is left untouched in that case.
    pub fn apply(&mut self, delta: &StatsDelta) -> Result<(), StatsError> {
        let mining_balance_cents =
            checked("mining_balance_cents", self.mining_balance_cents, delta.mining_balance_cents)?;
        let referral_count = checked("referral_count", self.referral_count, delta.referral_count)?;
        let earnings_cents = checked("earnings_cents", self.earnings_cents, delta.earnings_cents)?;
        let total_points = checked("total_points", self.total_points, delta.total_points)?;

        self.mining_balance_cents = mining_balance_cents;
        self.referral_count = referral_count;
        self.earnings_cents = earnings_cents;
        self.total_points = total_points;
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn checked(field: &'static str, current: i64, delta: i64) -> Result<i64, StatsError> {
    match current.checked_add(delta) {
        Some(v) if v >= 0 => Ok(v),
        _ => Err(StatsError { field, current, delta }),
    }
}

/// Increments applied atomically to an [`AccountStats`] row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsDelta {
    /// Change to the mined balance, in cents.
    pub mining_balance_cents: i64,
    /// Change to the referral counter.
    pub referral_count: i64,
    /// Change to earnings, in cents.
    pub earnings_cents: i64,
    /// Change to reward points.
    pub total_points: i64,
}

impl StatsDelta {
    /// Reward credited to a referrer for one attributed account.
    #[must_use]
    pub const fn referral_reward() -> Self {
        Self {
            mining_balance_cents: 0,
            referral_count: 1,
            earnings_cents: REFERRAL_BONUS_CENTS,
            total_points: REFERRAL_BONUS_POINTS,
        }
    }

    /// Bonus credited to a newly attributed account.
    #[must_use]
    pub const fn welcome_bonus() -> Self {
        Self {
            mining_balance_cents: 0,
            referral_count: 0,
            earnings_cents: 0,
            total_points: WELCOME_BONUS_POINTS,
        }
    }

    /// Mining proceeds: credited to both the balance and lifetime earnings.
    #[must_use]
    pub const fn mining(amount_cents: i64, points: i64) -> Self {
        Self {
            mining_balance_cents: amount_cents,
            referral_count: 0,
            earnings_cents: amount_cents,
            total_points: points,
        }
    }

    /// Whether the delta changes nothing.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.mining_balance_cents == 0
            && self.referral_count == 0
            && self.earnings_cents == 0
            && self.total_points == 0
    }
}

/// A stats update that would break the non-negativity invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stats field {field} out of range: {current} + {delta}")]
pub struct StatsError {
    /// Name of the offending field.
    pub field: &'static str,
    /// Value before the update.
    pub current: i64,
    /// Attempted change.
    pub delta: i64,
}
