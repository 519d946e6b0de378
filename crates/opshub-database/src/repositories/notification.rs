//! Notification repository implementation.
//!
//! Bulk state transitions and the expiry sweep are single set-based
//! statements; ownership checks live in the WHERE predicate so a record
//! owned by someone else is indistinguishable from a missing one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use opshub_core::error::{AppError, ErrorKind};
use opshub_core::result::AppResult;
use opshub_core::types::pagination::{PageRequest, PageResponse};
use opshub_entity::notification::delivery::ChannelDelivery;
use opshub_entity::notification::{Channel, NewNotification, Notification, NotificationType};

use crate::store::NotificationStore;

/// PostgreSQL-backed [`NotificationStore`].
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn create(&self, new: &NewNotification) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications \
             (id, recipient, notification_type, title, content, importance, read, delivery, reference, group_key, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, FALSE, '{}'::jsonb, $7, $8, NOW(), $9) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(new.recipient)
        .bind(new.notification_type)
        .bind(&new.title)
        .bind(&new.content)
        .bind(new.importance)
        .bind(new.reference.map(Json))
        .bind(&new.group_key)
        .bind(new.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create notification", e))
    }

    async fn find_for_user(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE id = $1 AND recipient = $2",
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find notification", e))
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
        unread_only: bool,
    ) -> AppResult<PageResponse<Notification>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient = $1 AND ($2 = FALSE OR read = FALSE)",
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count notifications", e))?;

        let notifs = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE recipient = $1 AND ($2 = FALSE OR read = FALSE) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list notifications", e))?;

        Ok(PageResponse::new(
            notifs,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient = $1 AND read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))
    }

    // COALESCE keeps the first read stamp across repeat calls.
    async fn mark_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE, read_at = COALESCE(read_at, $3) \
             WHERE id = $1 AND recipient = $2",
        )
        .bind(notification_id)
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark read", e))?;
        Ok(result.rows_affected())
    }

    async fn mark_unread(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read = FALSE, read_at = NULL \
             WHERE id = $1 AND recipient = $2",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark unread", e))?;
        Ok(result.rows_affected())
    }

    async fn mark_all_read(
        &self,
        user_id: Uuid,
        notification_type: Option<NotificationType>,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE, read_at = $3 \
             WHERE recipient = $1 AND read = FALSE \
             AND ($2::notification_type IS NULL OR notification_type = $2)",
        )
        .bind(user_id)
        .bind(notification_type)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark all read", e))?;
        Ok(result.rows_affected())
    }

    async fn track_delivery(
        &self,
        notification_id: Uuid,
        channel: Channel,
        outcome: &ChannelDelivery,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET delivery = jsonb_set(delivery, ARRAY[$2]::text[], $3) \
             WHERE id = $1",
        )
        .bind(notification_id)
        .bind(channel.as_str())
        .bind(Json(outcome))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to track delivery", e))?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND recipient = $2")
            .bind(notification_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete notification", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM notifications WHERE expires_at IS NOT NULL AND expires_at < $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to cleanup expired notifications", e)
        })?;
        Ok(result.rows_affected())
    }
}
