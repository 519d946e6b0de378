//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use super::delivery::DeliveryState;
use super::importance::Importance;
use super::kind::NotificationType;
use super::reference::EntityRef;

/// A notification delivered (or deliverable) to a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// The recipient user.
    pub recipient: Uuid,
    /// Event type that produced this notification.
    pub notification_type: NotificationType,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub content: String,
    /// Severity level.
    pub importance: Importance,
    /// Whether the recipient has read this notification.
    pub read: bool,
    /// When the notification was read. Cleared if forced back to unread.
    pub read_at: Option<DateTime<Utc>>,
    /// Weak reference to the entity that triggered the event.
    pub reference: Option<Json<EntityRef>>,
    /// Per-channel delivery outcomes.
    pub delivery: Json<DeliveryState>,
    /// Optional clustering key for digest/batched presentation.
    pub group_key: Option<String>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// When the notification becomes eligible for deletion.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Check if the notification is unread.
    pub fn is_unread(&self) -> bool {
        !self.read
    }

    /// Check if the notification has expired at the given instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp < now).unwrap_or(false)
    }
}

/// Data required to create a new notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    /// The recipient user.
    pub recipient: Uuid,
    /// Event type that produced this notification.
    pub notification_type: NotificationType,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub content: String,
    /// Severity level.
    #[serde(default)]
    pub importance: Importance,
    /// Weak reference to the triggering entity (optional).
    pub reference: Option<EntityRef>,
    /// Optional clustering key.
    pub group_key: Option<String>,
    /// Optional expiry instant.
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(expires_at: Option<DateTime<Utc>>) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            recipient: Uuid::new_v4(),
            notification_type: NotificationType::TaskAssigned,
            title: "Task assigned".into(),
            content: "You were assigned a task".into(),
            importance: Importance::Medium,
            read: false,
            read_at: None,
            reference: None,
            delivery: Json(DeliveryState::default()),
            group_key: None,
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_expiry_is_strict() {
        let now = Utc::now();
        assert!(sample(Some(now - Duration::seconds(1))).is_expired(now));
        assert!(!sample(Some(now)).is_expired(now));
        assert!(!sample(None).is_expired(now));
    }
}
