//! Notifications addressed to a single account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, NotificationId};

/// Notification severity, rendered by the dashboard as a colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Informational.
    #[default]
    Info,
    /// Something good happened (rewards).
    Success,
    /// Needs attention.
    Warning,
    /// Something failed.
    Error,
}

impl NotificationKind {
    /// Wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A message shown in the account's notification list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Row identifier (time-ordered).
    pub id: NotificationId,
    /// Recipient.
    pub user_id: AccountId,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Severity.
    pub kind: NotificationKind,
    /// Whether the recipient has read it.
    pub read: bool,
    /// When it was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Create an unread notification.
    #[must_use]
    pub fn new(
        user_id: AccountId,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
    ) -> Self {
        Self {
            id: NotificationId::generate(),
            user_id,
            title: title.into(),
            message: message.into(),
            kind,
            read: false,
            created_at: Utc::now(),
        }
    }

    /// The notification sent to a referrer when a referral is attributed.
    #[must_use]
    pub fn referral_reward(referrer: AccountId) -> Self {
        Self::new(
            referrer,
            "New Referral!",
            "Someone joined using your referral link. You earned $10 and 100 points!",
            NotificationKind::Success,
        )
    }
}
