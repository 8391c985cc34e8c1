//! Notification handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hashdash_core::{Notification, NotificationId};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Notification list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    /// Maximum number of notifications to return (default: 20).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    20
}

/// Notification response.
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    /// Notification ID.
    pub id: String,
    /// Title.
    pub title: String,
    /// Body.
    pub message: String,
    /// Severity: info, success, warning or error.
    pub kind: &'static str,
    /// Read flag.
    pub read: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id.to_string(),
            title: n.title,
            message: n.message,
            kind: n.kind.as_str(),
            read: n.read,
            created_at: n.created_at,
        }
    }
}

/// Notification list response.
#[derive(Debug, Serialize)]
pub struct ListNotificationsResponse {
    /// Notifications, newest first.
    pub notifications: Vec<NotificationResponse>,
    /// Unread notifications on this page.
    pub unread: usize,
}

/// List the current user's notifications.
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<ListNotificationsResponse>, ApiError> {
    let notifications: Vec<NotificationResponse> = state
        .accounts
        .notifications(&auth.account_id, query.limit, query.offset)?
        .into_iter()
        .map(Into::into)
        .collect();
    let unread = notifications.iter().filter(|n| !n.read).count();

    Ok(Json(ListNotificationsResponse {
        notifications,
        unread,
    }))
}

/// Mark one notification as read.
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let id: NotificationId = id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid notification id: {id}")))?;

    let notification = state.accounts.mark_notification_read(&auth.account_id, &id)?;
    Ok(Json(notification.into()))
}
