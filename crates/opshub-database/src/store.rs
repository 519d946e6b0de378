//! Persistence seams for the notification services.
//!
//! The services depend on these traits rather than on the concrete
//! repositories, so alternate backends and in-memory test doubles can
//! stand in for PostgreSQL. The documented contracts here are what the
//! SQL implementations must uphold.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use opshub_core::result::AppResult;
use opshub_core::types::pagination::{PageRequest, PageResponse};
use opshub_entity::notification::delivery::ChannelDelivery;
use opshub_entity::notification::{
    Channel, NewNotification, Notification, NotificationPreference, NotificationType,
};

/// Storage contract for notification records.
///
/// State-transition methods return the number of rows matched; ownership
/// is part of the match predicate, so a record owned by someone else
/// counts as absent.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Create a notification. New records start unread with no delivery
    /// attempts tracked.
    async fn create(&self, new: &NewNotification) -> AppResult<Notification>;

    /// Find one notification scoped to its owner.
    async fn find_for_user(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<Notification>>;

    /// List notifications for a user, newest first.
    async fn find_by_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
        unread_only: bool,
    ) -> AppResult<PageResponse<Notification>>;

    /// Count unread notifications for a user.
    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64>;

    /// Mark a notification as read. Idempotent: a repeat call keeps the
    /// original `read_at` stamp.
    async fn mark_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<u64>;

    /// Force a notification back to unread, clearing `read_at`.
    async fn mark_unread(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<u64>;

    /// Mark every unread notification as read for a user, optionally
    /// filtered by type, as one set-based update.
    async fn mark_all_read(
        &self,
        user_id: Uuid,
        notification_type: Option<NotificationType>,
        now: DateTime<Utc>,
    ) -> AppResult<u64>;

    /// Replace one channel's delivery sub-record wholesale, discarding any
    /// prior attempt for that channel.
    async fn track_delivery(
        &self,
        notification_id: Uuid,
        channel: Channel,
        outcome: &ChannelDelivery,
    ) -> AppResult<u64>;

    /// Delete a notification scoped to its owner.
    async fn delete(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<u64>;

    /// Delete every notification whose expiry is strictly before `now`.
    /// Safe to run repeatedly and concurrently.
    async fn cleanup_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Storage contract for the one-per-user preference record.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Find the preference record for a user.
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<NotificationPreference>>;

    /// Insert a new preference record. A duplicate for the same user must
    /// fail with [`ErrorKind::Conflict`](opshub_core::error::ErrorKind::Conflict)
    /// so callers can resolve the bootstrap race by re-reading.
    async fn insert(&self, prefs: &NotificationPreference) -> AppResult<NotificationPreference>;

    /// Persist the channel blocks and DND window of an existing record.
    async fn update(&self, prefs: &NotificationPreference) -> AppResult<NotificationPreference>;
}
