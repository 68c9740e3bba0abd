use crate::domain::error::DomainError;
use crate::domain::message::Message;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create(&self, message: Message) -> Result<Message, DomainError>;
    async fn inbox_for(&self, recipient_id: Uuid) -> Result<Vec<Message>, DomainError>;
    /// Tolerant of unknown ids: marking a message that does not exist (or is
    /// not addressed to the caller) is a no-op.
    async fn mark_read(&self, id: Uuid, recipient_id: Uuid) -> Result<(), DomainError>;
}

#[derive(Clone)]
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn create(&self, message: Message) -> Result<Message, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, sender_id, sender_email, recipient_id, recipient_email,
                                  subject, body, read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(message.id)
        .bind(message.sender_id)
        .bind(&message.sender_email)
        .bind(message.recipient_id)
        .bind(&message.recipient_email)
        .bind(&message.subject)
        .bind(&message.body)
        .bind(message.read)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to store message: {}", e);
            DomainError::from(e)
        })?;

        info!(message_id = %message.id, recipient = %message.recipient_email, "message sent");
        Ok(message)
    }

    async fn inbox_for(&self, recipient_id: Uuid) -> Result<Vec<Message>, DomainError> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, sender_id, sender_email, recipient_id, recipient_email,
                   subject, body, read, created_at
            FROM messages
            WHERE recipient_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while loading messages: {}", e);
            DomainError::from(e)
        })
    }

    async fn mark_read(&self, id: Uuid, recipient_id: Uuid) -> Result<(), DomainError> {
        sqlx::query("UPDATE messages SET read = TRUE WHERE id = $1 AND recipient_id = $2")
            .bind(id)
            .bind(recipient_id)
            .execute(&self.pool)
            .await
            .map_err(DomainError::from)?;
        Ok(())
    }
}
