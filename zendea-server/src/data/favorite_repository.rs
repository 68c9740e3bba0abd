use crate::domain::Post;
use crate::domain::error::DomainError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

/// Favorites use set-semantics rather than flip-semantics: writing the same
/// desired state twice is a no-op, so duplicate clicks cannot race each
/// other into an unintended end state.
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    async fn is_favorited(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, DomainError>;
    async fn set_favorited(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        desired: bool,
    ) -> Result<(), DomainError>;
    /// Active posts the user has favorited, most recently favorited first.
    async fn posts_favorited_by(&self, user_id: Uuid) -> Result<Vec<Post>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresFavoriteRepository {
    pool: PgPool,
}

impl PostgresFavoriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteRepository for PostgresFavoriteRepository {
    async fn is_favorited(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = $1 AND post_id = $2)",
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DomainError::from)
    }

    async fn set_favorited(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        desired: bool,
    ) -> Result<(), DomainError> {
        if desired {
            sqlx::query(
                r#"
                INSERT INTO favorites (id, user_id, post_id, created_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id, post_id) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(post_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to add favorite: {}", e);
                DomainError::from(e)
            })?;
        } else {
            sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND post_id = $2")
                .bind(user_id)
                .bind(post_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    error!("failed to remove favorite: {}", e);
                    DomainError::from(e)
                })?;
        }

        info!(user_id = %user_id, post_id = %post_id, favorited = desired, "favorite set");
        Ok(())
    }

    async fn posts_favorited_by(&self, user_id: Uuid) -> Result<Vec<Post>, DomainError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.post_type, p.title, p.description, p.location, p.price, p.price_unit,
                   p.posted_by, p.posted_by_name, p.status, p.created_at, p.updated_at
            FROM posts p
            JOIN favorites f ON f.post_id = p.id
            WHERE f.user_id = $1 AND p.status = 'active'
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while loading favorites: {}", e);
            DomainError::from(e)
        })
    }
}
