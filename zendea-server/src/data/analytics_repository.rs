use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, error};
use uuid::Uuid;

/// Best-effort event recording. A failed write must never fail the
/// operation that triggered it, so `record` reports nothing and logs
/// failures internally.
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn record(&self, event: &str, data: serde_json::Value, user_id: Option<Uuid>);
}

#[derive(Clone)]
pub struct PostgresAnalyticsRepository {
    pool: PgPool,
}

impl PostgresAnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsRepository for PostgresAnalyticsRepository {
    async fn record(&self, event: &str, data: serde_json::Value, user_id: Option<Uuid>) {
        let result = sqlx::query(
            r#"
            INSERT INTO analytics_events (id, event, data, user_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event)
        .bind(&data)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => debug!(event, "analytics event recorded"),
            Err(e) => error!(event, "failed to record analytics event: {}", e),
        }
    }
}
