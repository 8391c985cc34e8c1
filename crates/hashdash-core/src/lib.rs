//! Core types for the hashdash referral ledger.
//!
//! This crate provides the rows shared by the store, the ledger and the API:
//!
//! - **Identifiers**: `AccountId`, `ReferralId`, `NotificationId`
//! - **Profiles**: `Profile`, `ProfileUpdate`, `Role`
//! - **Stats**: `AccountStats`, `StatsDelta`
//! - **Referrals**: `ReferralCode`, `ReferralRecord`, `IssuedCode`
//! - **Notifications**: `Notification`, `NotificationKind`
//!
//! # Currency
//!
//! Balances and earnings are stored as `i64` cents. A referral is worth
//! $10 (1000 cents) and 100 points to the referrer, and 50 points to the
//! referred account.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;
pub mod notification;
pub mod profile;
pub mod referral;
pub mod stats;

pub use ids::{AccountId, IdError, NotificationId, ReferralId};
pub use notification::{Notification, NotificationKind};
pub use profile::{Profile, ProfileUpdate, Role};
pub use referral::{
    CodeError, IssuedCode, ReferralCode, ReferralRecord, REFERRAL_BONUS_CENTS,
    REFERRAL_BONUS_POINTS, REFERRAL_CODE_PREFIX, WELCOME_BONUS_POINTS,
};
pub use stats::{AccountStats, StatsDelta, StatsError, INITIAL_LEVEL};
