use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Feedback {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub subject: String,
    pub body: String,
    pub rating: i16,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Feedback {
    pub fn new(user_id: Uuid, user_email: String, subject: String, body: String, rating: i16) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            user_email,
            subject,
            body,
            rating,
            status: "pending".to_string(),
            created_at: Utc::now(),
        }
    }
}
