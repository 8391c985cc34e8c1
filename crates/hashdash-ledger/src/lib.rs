//! Business logic for hashdash.
//!
//! - [`ReferralLedger`]: referral codes, attribution and referral stats
//! - [`Accounts`]: registration, profiles, stats and notifications
//! - [`Admin`]: operator totals and user search
//!
//! All three hold an `Arc<dyn Store>` and no other state.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod accounts;
pub mod admin;
pub mod error;
pub mod referral;

pub use accounts::{Accounts, NewAccount, Registration, MAX_NOTIFICATION_PAGE};
pub use admin::{Admin, Overview, RECENT_USERS};
pub use error::{LedgerError, Result};
pub use referral::{
    Attribution, ReferralConfig, ReferralEntry, ReferralLedger, ReferralLink, ReferralStats,
    ReferredProfile,
};
