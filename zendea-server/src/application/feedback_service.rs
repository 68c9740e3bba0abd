use std::sync::Arc;

use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::data::analytics_repository::AnalyticsRepository;
use crate::data::feedback_repository::FeedbackRepository;
use crate::domain::error::DomainError;
use crate::domain::feedback::Feedback;

#[derive(Clone)]
pub struct FeedbackService<R: FeedbackRepository + 'static> {
    repo: Arc<R>,
    analytics: Arc<dyn AnalyticsRepository>,
}

impl<R> FeedbackService<R>
where
    R: FeedbackRepository + 'static,
{
    pub fn new(repo: Arc<R>, analytics: Arc<dyn AnalyticsRepository>) -> Self {
        Self { repo, analytics }
    }

    #[instrument(skip(self, subject, body))]
    pub async fn submit(
        &self,
        user_id: Uuid,
        user_email: String,
        subject: String,
        body: String,
        rating: i16,
    ) -> Result<Feedback, DomainError> {
        if !(1..=5).contains(&rating) {
            return Err(DomainError::Validation(
                "rating must be between 1 and 5".into(),
            ));
        }
        if body.trim().is_empty() {
            return Err(DomainError::Validation("feedback body is required".into()));
        }

        let feedback = Feedback::new(user_id, user_email, subject, body, rating);
        let feedback = self.repo.create(feedback).await?;

        self.analytics
            .record("feedback_submitted", json!({ "rating": rating }), Some(user_id))
            .await;

        Ok(feedback)
    }
}
