use crate::domain::error::DomainError;
use crate::domain::notification::Notification;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

/// Read state is tracked per viewer: a broadcast one user has read still
/// shows unread to everyone else.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: Notification) -> Result<(), DomainError>;
    /// Notifications addressed to the user plus broadcasts, newest first,
    /// with `read` reflecting this user's own markers.
    async fn for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, DomainError>;
    /// Records the user's read marker. A no-op when the notification does
    /// not exist or is addressed to someone else.
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<(), DomainError>;
}

#[derive(Clone)]
pub struct PostgresNotificationRepository {
    pool: PgPool,
}

impl PostgresNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn create(&self, notification: Notification) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, kind, title, body, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(&notification.kind)
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create notification: {}", e);
            DomainError::from(e)
        })?;
        Ok(())
    }

    async fn for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, DomainError> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT n.id, n.user_id, n.kind, n.title, n.body, n.created_at,
                   EXISTS(
                       SELECT 1 FROM notification_reads r
                       WHERE r.notification_id = n.id AND r.user_id = $1
                   ) AS read
            FROM notifications n
            WHERE n.user_id = $1 OR n.user_id IS NULL
            ORDER BY n.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while loading notifications: {}", e);
            DomainError::from(e)
        })
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<(), DomainError> {
        // The SELECT guard keeps a user from marking notifications that are
        // not theirs to read.
        sqlx::query(
            r#"
            INSERT INTO notification_reads (notification_id, user_id, created_at)
            SELECT n.id, $2, $3
            FROM notifications n
            WHERE n.id = $1 AND (n.user_id = $2 OR n.user_id IS NULL)
            ON CONFLICT (notification_id, user_id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(DomainError::from)?;
        Ok(())
    }
}
