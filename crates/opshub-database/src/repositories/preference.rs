//! Notification preference repository implementation.
//!
//! The table carries a unique constraint on `user_id`; the INSERT path
//! surfaces a duplicate as [`ErrorKind::Conflict`] so callers can resolve
//! the bootstrap race by re-reading instead of failing.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use opshub_core::error::{AppError, ErrorKind};
use opshub_core::result::AppResult;
use opshub_entity::notification::NotificationPreference;

use crate::store::PreferenceStore;

/// PostgreSQL-backed [`PreferenceStore`].
#[derive(Debug, Clone)]
pub struct PreferenceRepository {
    pool: PgPool,
}

impl PreferenceRepository {
    /// Create a new preference repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PreferenceRepository {
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<NotificationPreference>> {
        sqlx::query_as::<_, NotificationPreference>(
            "SELECT * FROM notification_preferences WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to get preferences", e))
    }

    async fn insert(&self, prefs: &NotificationPreference) -> AppResult<NotificationPreference> {
        sqlx::query_as::<_, NotificationPreference>(
            "INSERT INTO notification_preferences (user_id, email, in_app, slack, dnd, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) RETURNING *",
        )
        .bind(prefs.user_id)
        .bind(&prefs.email)
        .bind(&prefs.in_app)
        .bind(&prefs.slack)
        .bind(&prefs.dnd)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let is_duplicate = matches!(
                &e,
                sqlx::Error::Database(db) if db.is_unique_violation()
            );
            if is_duplicate {
                AppError::with_source(
                    ErrorKind::Conflict,
                    "Preference record already exists",
                    e,
                )
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to insert preferences", e)
            }
        })
    }

    async fn update(&self, prefs: &NotificationPreference) -> AppResult<NotificationPreference> {
        sqlx::query_as::<_, NotificationPreference>(
            "UPDATE notification_preferences \
             SET email = $2, in_app = $3, slack = $4, dnd = $5, updated_at = NOW() \
             WHERE user_id = $1 RETURNING *",
        )
        .bind(prefs.user_id)
        .bind(&prefs.email)
        .bind(&prefs.in_app)
        .bind(&prefs.slack)
        .bind(&prefs.dnd)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update preferences", e))
    }
}
