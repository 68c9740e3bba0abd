use crate::application::feedback_service::FeedbackService;
use crate::data::feedback_repository::PostgresFeedbackRepository;
use crate::domain::error::DomainError;
use crate::presentation::dto::FeedbackRequest;
use crate::presentation::utils::AuthenticatedUser;
use actix_web::{HttpResponse, post, web};
use tracing::info;

#[post("/feedback")]
pub async fn submit_feedback(
    user: AuthenticatedUser,
    service: web::Data<FeedbackService<PostgresFeedbackRepository>>,
    payload: web::Json<FeedbackRequest>,
) -> Result<HttpResponse, DomainError> {
    let payload = payload.into_inner();
    let feedback = service
        .submit(
            user.id,
            user.email.clone(),
            payload.subject.unwrap_or_default(),
            payload.body,
            payload.rating,
        )
        .await?;

    info!(user_id = %user.id, feedback_id = %feedback.id, "feedback submitted");

    Ok(HttpResponse::Created().json(feedback))
}
