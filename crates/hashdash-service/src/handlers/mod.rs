//! API handlers.

pub mod accounts;
pub mod admin;
pub mod health;
pub mod mining;
pub mod notifications;
pub mod referrals;
pub mod stats;

/// Format cents as dollars, e.g. `1050` as `$10.50`.
pub(crate) fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", abs / 100, abs % 100)
}
