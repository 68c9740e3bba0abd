use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_email: String,
    pub recipient_id: Uuid,
    pub recipient_email: String,
    pub subject: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        sender_id: Uuid,
        sender_email: String,
        recipient_id: Uuid,
        recipient_email: String,
        subject: String,
        body: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            sender_email,
            recipient_id,
            recipient_email,
            subject,
            body,
            read: false,
            created_at: Utc::now(),
        }
    }
}
