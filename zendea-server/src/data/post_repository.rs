use crate::domain::error::DomainError;
use crate::domain::Post;
use crate::presentation::dto::UpdatePostRequest;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: Post) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
    async fn update_post(
        &self,
        id: Uuid,
        owner_id: Uuid,
        update: UpdatePostRequest,
    ) -> Result<Option<Post>, DomainError>;
    /// Soft-deletes the post. Succeeds silently when the id is unknown or
    /// the post is already removed, so duplicate delete clicks racing a slow
    /// network never surface an error.
    async fn remove_post(&self, id: Uuid, owner_id: Uuid) -> Result<(), DomainError>;
    async fn load_active(&self, limit: usize) -> Result<Vec<Post>, DomainError>;
    /// The owner's active posts, newest first.
    async fn posts_by_owner(&self, owner_id: Uuid) -> Result<Vec<Post>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const POST_COLUMNS: &str = "id, post_type, title, description, location, price, price_unit, \
                            posted_by, posted_by_name, status, created_at, updated_at";

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO posts (id, post_type, title, description, location, price, price_unit,
                               posted_by, posted_by_name, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            "#,
        )
        .bind(post.id)
        .bind(post.post_type)
        .bind(&post.title)
        .bind(&post.description)
        .bind(&post.location)
        .bind(post.price)
        .bind(post.price_unit)
        .bind(post.posted_by)
        .bind(&post.posted_by_name)
        .bind(post.status)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create post: {}", e);
            DomainError::from(e)
        })?;

        info!(post_id = %post.id, posted_by = %post.posted_by, post_type = %post.post_type, "post created");
        Ok(Post {
            created_at: Some(now),
            updated_at: Some(now),
            ..post
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("db error find_by_id {}: {}", id, e);
                DomainError::from(e)
            })
    }

    async fn update_post(
        &self,
        id: Uuid,
        owner_id: Uuid,
        update: UpdatePostRequest,
    ) -> Result<Option<Post>, DomainError> {
        let now = Utc::now();
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                location = COALESCE($3, location),
                price = COALESCE($4, price),
                price_unit = COALESCE($5, price_unit),
                updated_at = $6
            WHERE id = $7 AND posted_by = $8 AND status = 'active'
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(update.title)
        .bind(update.description)
        .bind(update.location)
        .bind(update.price)
        .bind(update.price_unit)
        .bind(now)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to update post {}: {}", id, e);
            DomainError::from(e)
        })?;

        if post.is_some() {
            info!(post_id = %id, "post updated");
        }

        Ok(post)
    }

    async fn remove_post(&self, id: Uuid, owner_id: Uuid) -> Result<(), DomainError> {
        let removed = sqlx::query(
            r#"
            UPDATE posts SET status = 'removed', updated_at = $1
            WHERE id = $2 AND posted_by = $3 AND status = 'active'
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(DomainError::from)?;

        if removed.rows_affected() == 0 {
            let owner: Option<Uuid> = sqlx::query_scalar("SELECT posted_by FROM posts WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(DomainError::from)?;

            return match owner {
                Some(posted_by) if posted_by != owner_id => Err(DomainError::Forbidden),
                // Unknown id or already removed by this owner: idempotent.
                _ => Ok(()),
            };
        }

        info!(post_id = %id, "post removed");
        Ok(())
    }

    async fn load_active(&self, limit: usize) -> Result<Vec<Post>, DomainError> {
        let limit = limit.min(500) as i64;

        sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE status = 'active'
            ORDER BY created_at DESC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while loading posts: {}", e);
            DomainError::from(e)
        })
    }

    async fn posts_by_owner(&self, owner_id: Uuid) -> Result<Vec<Post>, DomainError> {
        sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE posted_by = $1 AND status = 'active'
            ORDER BY created_at DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while loading posts for owner {}: {}", owner_id, e);
            DomainError::from(e)
        })
    }
}
