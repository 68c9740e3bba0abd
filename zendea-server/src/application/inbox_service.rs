use std::sync::Arc;

use serde_json::json;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::data::analytics_repository::AnalyticsRepository;
use crate::data::message_repository::MessageRepository;
use crate::data::notification_repository::NotificationRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::message::Message;
use crate::domain::notification::Notification;

/// Direct messages plus the notification feed, the two halves of the
/// signed-in inbox.
#[derive(Clone)]
pub struct InboxService<M, N>
where
    M: MessageRepository + 'static,
    N: NotificationRepository + 'static,
{
    messages: Arc<M>,
    notifications: Arc<N>,
    users: Arc<dyn UserRepository>,
    analytics: Arc<dyn AnalyticsRepository>,
}

impl<M, N> InboxService<M, N>
where
    M: MessageRepository + 'static,
    N: NotificationRepository + 'static,
{
    pub fn new(
        messages: Arc<M>,
        notifications: Arc<N>,
        users: Arc<dyn UserRepository>,
        analytics: Arc<dyn AnalyticsRepository>,
    ) -> Self {
        Self {
            messages,
            notifications,
            users,
            analytics,
        }
    }

    #[instrument(skip(self, subject, body))]
    pub async fn send_message(
        &self,
        sender_id: Uuid,
        sender_email: String,
        recipient_email: &str,
        subject: String,
        body: String,
    ) -> Result<Message, DomainError> {
        if subject.trim().is_empty() || body.trim().is_empty() {
            return Err(DomainError::Validation(
                "subject and body are required".into(),
            ));
        }

        let recipient_email = recipient_email.trim().to_lowercase();
        let recipient = self
            .users
            .find_by_email(&recipient_email)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(recipient_email.clone()))?;

        let message = Message::new(
            sender_id,
            sender_email.clone(),
            recipient.id,
            recipient_email,
            subject,
            body,
        );
        let message = self.messages.create(message).await?;

        let notice = Notification::for_user(
            recipient.id,
            "new_message",
            "New Message".to_string(),
            format!("You have a new message from {sender_email}"),
        );
        if let Err(e) = self.notifications.create(notice).await {
            error!(message_id = %message.id, "failed to notify recipient: {}", e);
        }

        self.analytics
            .record(
                "message_sent",
                json!({ "recipient_id": recipient.id }),
                Some(sender_id),
            )
            .await;

        Ok(message)
    }

    pub async fn inbox(&self, user_id: Uuid) -> Result<Vec<Message>, DomainError> {
        self.messages.inbox_for(user_id).await
    }

    pub async fn mark_message_read(&self, user_id: Uuid, id: Uuid) -> Result<(), DomainError> {
        self.messages.mark_read(id, user_id).await
    }

    pub async fn notifications(&self, user_id: Uuid) -> Result<Vec<Notification>, DomainError> {
        self.notifications.for_user(user_id).await
    }

    pub async fn mark_notification_read(&self, user_id: Uuid, id: Uuid) -> Result<(), DomainError> {
        self.notifications.mark_read(id, user_id).await
    }
}
