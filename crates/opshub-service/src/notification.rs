//! Notification CRUD, read-state transitions, and delivery bookkeeping.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use opshub_core::error::AppError;
use opshub_core::result::AppResult;
use opshub_core::types::pagination::{PageRequest, PageResponse};
use opshub_database::store::NotificationStore;
use opshub_entity::notification::delivery::ChannelDelivery;
use opshub_entity::notification::{Channel, NewNotification, Notification, NotificationType};

/// Manages notification records for their owning users.
#[derive(Clone)]
pub struct NotificationService {
    /// Notification storage backend.
    store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Creates a notification. New records start unread with an empty
    /// delivery map.
    pub async fn create(&self, new: NewNotification) -> AppResult<Notification> {
        if new.title.trim().is_empty() {
            return Err(AppError::validation("Notification title is required"));
        }
        if new.recipient.is_nil() {
            return Err(AppError::validation("Notification recipient is required"));
        }

        let notification = self.store.create(&new).await?;
        info!(
            notification_id = %notification.id,
            recipient = %notification.recipient,
            notification_type = %notification.notification_type,
            "Notification created"
        );
        Ok(notification)
    }

    /// Gets one notification owned by the user.
    pub async fn get(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<Notification> {
        self.store
            .find_for_user(notification_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Notification not found"))
    }

    /// Lists the user's notifications, newest first.
    pub async fn list(
        &self,
        user_id: Uuid,
        page: &PageRequest,
        unread_only: bool,
    ) -> AppResult<PageResponse<Notification>> {
        self.store.find_by_user(user_id, page, unread_only).await
    }

    /// Gets the unread notification count for a user.
    pub async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        self.store.count_unread(user_id).await
    }

    /// Marks a notification as read. A record that is absent or owned by
    /// someone else reports NotFound either way.
    pub async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let matched = self
            .store
            .mark_read(notification_id, user_id, Utc::now())
            .await?;
        if matched == 0 {
            return Err(AppError::not_found("Notification not found"));
        }
        Ok(())
    }

    /// Forces a notification back to unread, clearing its read stamp.
    pub async fn mark_unread(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let matched = self.store.mark_unread(notification_id, user_id).await?;
        if matched == 0 {
            return Err(AppError::not_found("Notification not found"));
        }
        Ok(())
    }

    /// Marks every unread notification as read for a user, optionally
    /// limited to one type. Returns the number of records transitioned.
    pub async fn mark_all_read(
        &self,
        user_id: Uuid,
        notification_type: Option<NotificationType>,
    ) -> AppResult<u64> {
        let updated = self
            .store
            .mark_all_read(user_id, notification_type, Utc::now())
            .await?;
        info!(user_id = %user_id, updated, "Marked all notifications read");
        Ok(updated)
    }

    /// Records the outcome of a delivery attempt on one channel, replacing
    /// any prior attempt for that channel wholesale.
    pub async fn track_delivery(
        &self,
        notification_id: Uuid,
        channel: Channel,
        success: bool,
        error: Option<String>,
    ) -> AppResult<()> {
        let outcome = if success {
            ChannelDelivery::success(Utc::now())
        } else {
            ChannelDelivery::failure(error)
        };

        let matched = self
            .store
            .track_delivery(notification_id, channel, &outcome)
            .await?;
        if matched == 0 {
            return Err(AppError::not_found("Notification not found"));
        }

        info!(
            notification_id = %notification_id,
            channel = %channel,
            success,
            "Delivery outcome tracked"
        );
        Ok(())
    }

    /// Deletes a notification owned by the user.
    pub async fn delete(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let deleted = self.store.delete(notification_id, user_id).await?;
        if deleted == 0 {
            return Err(AppError::not_found("Notification not found"));
        }
        Ok(())
    }

    /// Deletes every notification whose expiry is strictly before `now`.
    /// Safe to run repeatedly and concurrently.
    pub async fn cleanup_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let removed = self.store.cleanup_expired(now).await?;
        if removed > 0 {
            info!(removed, "Cleaned up expired notifications");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use chrono::Duration;
    use sqlx::types::Json;
    use tokio::sync::Mutex;

    use opshub_core::error::ErrorKind;
    use opshub_entity::notification::delivery::DeliveryState;
    use opshub_entity::notification::Importance;

    /// In-memory store honoring the documented [`NotificationStore`]
    /// contract, for exercising the service without PostgreSQL.
    #[derive(Default)]
    struct MemoryNotificationStore {
        rows: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl NotificationStore for MemoryNotificationStore {
        async fn create(&self, new: &NewNotification) -> AppResult<Notification> {
            let notification = Notification {
                id: Uuid::new_v4(),
                recipient: new.recipient,
                notification_type: new.notification_type,
                title: new.title.clone(),
                content: new.content.clone(),
                importance: new.importance,
                read: false,
                read_at: None,
                reference: new.reference.map(Json),
                delivery: Json(DeliveryState::default()),
                group_key: new.group_key.clone(),
                created_at: Utc::now(),
                expires_at: new.expires_at,
            };
            self.rows.lock().await.push(notification.clone());
            Ok(notification)
        }

        async fn find_for_user(
            &self,
            notification_id: Uuid,
            user_id: Uuid,
        ) -> AppResult<Option<Notification>> {
            Ok(self
                .rows
                .lock()
                .await
                .iter()
                .find(|n| n.id == notification_id && n.recipient == user_id)
                .cloned())
        }

        async fn find_by_user(
            &self,
            user_id: Uuid,
            page: &PageRequest,
            unread_only: bool,
        ) -> AppResult<PageResponse<Notification>> {
            let rows = self.rows.lock().await;
            let mut matched: Vec<Notification> = rows
                .iter()
                .filter(|n| n.recipient == user_id && (!unread_only || !n.read))
                .cloned()
                .collect();
            matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            let total = matched.len() as u64;
            let items = matched
                .into_iter()
                .skip(page.offset() as usize)
                .take(page.limit() as usize)
                .collect();
            Ok(PageResponse::new(items, page.page, page.page_size, total))
        }

        async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
            Ok(self
                .rows
                .lock()
                .await
                .iter()
                .filter(|n| n.recipient == user_id && !n.read)
                .count() as i64)
        }

        async fn mark_read(
            &self,
            notification_id: Uuid,
            user_id: Uuid,
            now: DateTime<Utc>,
        ) -> AppResult<u64> {
            let mut rows = self.rows.lock().await;
            match rows
                .iter_mut()
                .find(|n| n.id == notification_id && n.recipient == user_id)
            {
                Some(n) => {
                    n.read = true;
                    n.read_at = n.read_at.or(Some(now));
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        async fn mark_unread(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<u64> {
            let mut rows = self.rows.lock().await;
            match rows
                .iter_mut()
                .find(|n| n.id == notification_id && n.recipient == user_id)
            {
                Some(n) => {
                    n.read = false;
                    n.read_at = None;
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        async fn mark_all_read(
            &self,
            user_id: Uuid,
            notification_type: Option<NotificationType>,
            now: DateTime<Utc>,
        ) -> AppResult<u64> {
            let mut rows = self.rows.lock().await;
            let mut updated = 0;
            for n in rows.iter_mut().filter(|n| {
                n.recipient == user_id
                    && !n.read
                    && notification_type.is_none_or(|t| n.notification_type == t)
            }) {
                n.read = true;
                n.read_at = Some(now);
                updated += 1;
            }
            Ok(updated)
        }

        async fn track_delivery(
            &self,
            notification_id: Uuid,
            channel: Channel,
            outcome: &ChannelDelivery,
        ) -> AppResult<u64> {
            let mut rows = self.rows.lock().await;
            match rows.iter_mut().find(|n| n.id == notification_id) {
                Some(n) => {
                    n.delivery.set(channel, outcome.clone());
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        async fn delete(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<u64> {
            let mut rows = self.rows.lock().await;
            let before = rows.len();
            rows.retain(|n| !(n.id == notification_id && n.recipient == user_id));
            Ok((before - rows.len()) as u64)
        }

        async fn cleanup_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
            let mut rows = self.rows.lock().await;
            let before = rows.len();
            rows.retain(|n| !n.is_expired(now));
            Ok((before - rows.len()) as u64)
        }
    }

    fn service() -> NotificationService {
        NotificationService::new(Arc::new(MemoryNotificationStore::default()))
    }

    fn new_notification(recipient: Uuid, kind: NotificationType) -> NewNotification {
        NewNotification {
            recipient,
            notification_type: kind,
            title: "Task assigned".into(),
            content: "You were assigned a task".into(),
            importance: Importance::Medium,
            reference: None,
            group_key: None,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_requires_title_and_recipient() {
        let svc = service();
        let mut blank_title = new_notification(Uuid::new_v4(), NotificationType::Mention);
        blank_title.title = "  ".into();
        let err = svc.create(blank_title).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let nil_recipient = new_notification(Uuid::nil(), NotificationType::Mention);
        let err = svc.create(nil_recipient).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent_with_stable_stamp() {
        let svc = service();
        let user = Uuid::new_v4();
        let created = svc
            .create(new_notification(user, NotificationType::Mention))
            .await
            .unwrap();

        svc.mark_read(created.id, user).await.unwrap();
        let first = svc.get(created.id, user).await.unwrap();
        assert!(first.read);
        let stamp = first.read_at.unwrap();

        svc.mark_read(created.id, user).await.unwrap();
        let second = svc.get(created.id, user).await.unwrap();
        assert!(second.read);
        assert_eq!(second.read_at, Some(stamp));

        svc.mark_unread(created.id, user).await.unwrap();
        let third = svc.get(created.id, user).await.unwrap();
        assert!(!third.read);
        assert_eq!(third.read_at, None);
    }

    #[tokio::test]
    async fn test_mark_read_hides_other_users_records() {
        let svc = service();
        let owner = Uuid::new_v4();
        let created = svc
            .create(new_notification(owner, NotificationType::Mention))
            .await
            .unwrap();

        let err = svc.mark_read(created.id, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        // Untouched for the owner
        assert!(!svc.get(created.id, owner).await.unwrap().read);
    }

    #[tokio::test]
    async fn test_track_delivery_keeps_only_latest_attempt() {
        let svc = service();
        let user = Uuid::new_v4();
        let created = svc
            .create(new_notification(user, NotificationType::RiskAlert))
            .await
            .unwrap();

        svc.track_delivery(created.id, Channel::Email, true, None)
            .await
            .unwrap();
        let after_success = svc.get(created.id, user).await.unwrap();
        assert!(after_success.delivery.channel(Channel::Email).unwrap().sent);

        svc.track_delivery(created.id, Channel::Email, false, Some("smtp 550".into()))
            .await
            .unwrap();
        let after_failure = svc.get(created.id, user).await.unwrap();
        let email = after_failure.delivery.channel(Channel::Email).unwrap();
        assert!(!email.sent);
        assert_eq!(email.sent_at, None);
        assert_eq!(email.error.as_deref(), Some("smtp 550"));
        // Other channels untouched
        assert!(after_failure.delivery.channel(Channel::Slack).is_none());
    }

    #[tokio::test]
    async fn test_track_delivery_unknown_id_is_not_found() {
        let svc = service();
        let err = svc
            .track_delivery(Uuid::new_v4(), Channel::Email, true, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_mark_all_read_scoped_to_one_user() {
        let svc = service();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        for _ in 0..3 {
            svc.create(new_notification(alice, NotificationType::Mention))
                .await
                .unwrap();
        }
        svc.create(new_notification(bob, NotificationType::Mention))
            .await
            .unwrap();

        let updated = svc.mark_all_read(alice, None).await.unwrap();
        assert_eq!(updated, 3);
        assert_eq!(svc.unread_count(alice).await.unwrap(), 0);
        assert_eq!(svc.unread_count(bob).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mark_all_read_type_filter() {
        let svc = service();
        let user = Uuid::new_v4();
        svc.create(new_notification(user, NotificationType::Mention))
            .await
            .unwrap();
        svc.create(new_notification(user, NotificationType::TaskAssigned))
            .await
            .unwrap();

        let updated = svc
            .mark_all_read(user, Some(NotificationType::Mention))
            .await
            .unwrap();
        assert_eq!(updated, 1);
        assert_eq!(svc.unread_count(user).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_expired_is_strict_and_repeatable() {
        let svc = service();
        let user = Uuid::new_v4();
        let now = Utc::now();

        let mut expired = new_notification(user, NotificationType::SystemAlert);
        expired.expires_at = Some(now - Duration::minutes(5));
        svc.create(expired).await.unwrap();

        let mut on_boundary = new_notification(user, NotificationType::SystemAlert);
        on_boundary.expires_at = Some(now);
        let kept_boundary = svc.create(on_boundary).await.unwrap();

        let no_expiry = svc
            .create(new_notification(user, NotificationType::SystemAlert))
            .await
            .unwrap();

        assert_eq!(svc.cleanup_expired(now).await.unwrap(), 1);
        assert!(svc.get(kept_boundary.id, user).await.is_ok());
        assert!(svc.get(no_expiry.id, user).await.is_ok());
        // Repeat run removes nothing further
        assert_eq!(svc.cleanup_expired(now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_unread_only_filter() {
        let svc = service();
        let user = Uuid::new_v4();
        let first = svc
            .create(new_notification(user, NotificationType::Mention))
            .await
            .unwrap();
        svc.create(new_notification(user, NotificationType::Mention))
            .await
            .unwrap();
        svc.mark_read(first.id, user).await.unwrap();

        let page = PageRequest::default();
        let all = svc.list(user, &page, false).await.unwrap();
        assert_eq!(all.total_items, 2);
        let unread = svc.list(user, &page, true).await.unwrap();
        assert_eq!(unread.total_items, 1);
    }
}
