use crate::domain::error::DomainError;
use crate::domain::feedback::Feedback;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};

#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn create(&self, feedback: Feedback) -> Result<Feedback, DomainError>;
}

#[derive(Clone)]
pub struct PostgresFeedbackRepository {
    pool: PgPool,
}

impl PostgresFeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackRepository for PostgresFeedbackRepository {
    async fn create(&self, feedback: Feedback) -> Result<Feedback, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO feedback (id, user_id, user_email, subject, body, rating, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(feedback.id)
        .bind(feedback.user_id)
        .bind(&feedback.user_email)
        .bind(&feedback.subject)
        .bind(&feedback.body)
        .bind(feedback.rating)
        .bind(&feedback.status)
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to store feedback: {}", e);
            DomainError::from(e)
        })?;

        info!(feedback_id = %feedback.id, rating = feedback.rating, "feedback submitted");
        Ok(feedback)
    }
}
