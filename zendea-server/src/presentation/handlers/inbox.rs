use crate::application::inbox_service::InboxService;
use crate::data::message_repository::PostgresMessageRepository;
use crate::data::notification_repository::PostgresNotificationRepository;
use crate::domain::error::DomainError;
use crate::presentation::dto::SendMessageRequest;
use crate::presentation::utils::AuthenticatedUser;
use actix_web::{HttpResponse, get, post, web};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

type Inbox = web::Data<InboxService<PostgresMessageRepository, PostgresNotificationRepository>>;

#[post("/messages")]
pub async fn send_message(
    user: AuthenticatedUser,
    inbox: Inbox,
    payload: web::Json<SendMessageRequest>,
) -> Result<HttpResponse, DomainError> {
    let payload = payload.into_inner();
    let message = inbox
        .send_message(
            user.id,
            user.email.clone(),
            &payload.recipient_email,
            payload.subject,
            payload.body,
        )
        .await?;

    info!(user_id = %user.id, message_id = %message.id, "message sent");

    Ok(HttpResponse::Created().json(message))
}

#[get("/messages")]
pub async fn list_messages(user: AuthenticatedUser, inbox: Inbox) -> Result<HttpResponse, DomainError> {
    let messages = inbox.inbox(user.id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "messages": messages,
        "total": messages.len()
    })))
}

#[post("/messages/{id}/read")]
pub async fn mark_message_read(
    user: AuthenticatedUser,
    inbox: Inbox,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    inbox.mark_message_read(user.id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/notifications")]
pub async fn list_notifications(
    user: AuthenticatedUser,
    inbox: Inbox,
) -> Result<HttpResponse, DomainError> {
    let notifications = inbox.notifications(user.id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "notifications": notifications,
        "total": notifications.len()
    })))
}

#[post("/notifications/{id}/read")]
pub async fn mark_notification_read(
    user: AuthenticatedUser,
    inbox: Inbox,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    inbox
        .mark_notification_read(user.id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
