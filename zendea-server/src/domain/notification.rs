use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A notification addressed to one user, or to everyone when `user_id` is
/// absent.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub kind: String,
    pub title: String,
    pub body: String,
    /// Whether the viewer the row was loaded for has read it.
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn broadcast(kind: &str, title: String, body: String) -> Self {
        Self::addressed(None, kind, title, body)
    }

    pub fn for_user(user_id: Uuid, kind: &str, title: String, body: String) -> Self {
        Self::addressed(Some(user_id), kind, title, body)
    }

    fn addressed(user_id: Option<Uuid>, kind: &str, title: String, body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind: kind.to_string(),
            title,
            body,
            read: false,
            created_at: Utc::now(),
        }
    }
}
