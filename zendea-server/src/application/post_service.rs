use std::sync::Arc;

use serde_json::json;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::data::analytics_repository::AnalyticsRepository;
use crate::data::favorite_repository::FavoriteRepository;
use crate::data::notification_repository::NotificationRepository;
use crate::data::post_repository::PostRepository;
use crate::domain::notification::Notification;
use crate::domain::{FilterCriteria, Post, PostStatus, PostType, error::DomainError};
use crate::presentation::dto::{CreatePostRequest, UpdatePostRequest};
use zendea_types::filter;

pub const TITLE_MIN: usize = 5;
pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MIN: usize = 20;
pub const DESCRIPTION_MAX: usize = 1000;

#[derive(Clone)]
pub struct PostService<R: PostRepository + 'static> {
    repo: Arc<R>,
    favorites: Arc<dyn FavoriteRepository>,
    notifications: Arc<dyn NotificationRepository>,
    analytics: Arc<dyn AnalyticsRepository>,
    load_limit: usize,
}

impl<R> PostService<R>
where
    R: PostRepository + 'static,
{
    pub fn new(
        repo: Arc<R>,
        favorites: Arc<dyn FavoriteRepository>,
        notifications: Arc<dyn NotificationRepository>,
        analytics: Arc<dyn AnalyticsRepository>,
        load_limit: usize,
    ) -> Self {
        Self {
            repo,
            favorites,
            notifications,
            analytics,
            load_limit,
        }
    }

    /// Removed posts are indistinguishable from absent ones to callers.
    pub async fn get_post(&self, id: Uuid) -> Result<Post, DomainError> {
        match self.repo.find_by_id(id).await? {
            Some(post) if post.status == PostStatus::Active => Ok(post),
            _ => Err(DomainError::PostNotFound(id)),
        }
    }

    /// Loads the newest active posts and runs the filter/sort engine over
    /// that snapshot.
    pub async fn search_posts(&self, criteria: &FilterCriteria) -> Result<Vec<Post>, DomainError> {
        let posts = self.repo.load_active(self.load_limit).await?;
        Ok(filter::apply(&posts, criteria))
    }

    #[instrument(skip(self, request))]
    pub async fn create_post(
        &self,
        author_id: Uuid,
        author_name: String,
        request: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        validate_new_post(&request)?;

        let post = Post {
            id: Uuid::new_v4(),
            post_type: request.post_type,
            title: request.title.trim().to_string(),
            description: request.description.trim().to_string(),
            location: request.location.map(|l| l.trim().to_string()),
            price: request.price,
            price_unit: request.price_unit,
            posted_by: author_id,
            posted_by_name: author_name,
            status: PostStatus::Active,
            created_at: None,
            updated_at: None,
        };
        let post = self.repo.create(post).await?;

        let notice = Notification::broadcast(
            "new_post",
            "New Post Created".to_string(),
            format!("New {} posted: {}", post.post_type, post.title),
        );
        if let Err(e) = self.notifications.create(notice).await {
            error!(post_id = %post.id, "failed to announce new post: {}", e);
        }

        self.analytics
            .record(
                "post_created",
                json!({ "post_id": post.id, "post_type": post.post_type }),
                Some(author_id),
            )
            .await;

        Ok(post)
    }

    #[instrument(skip(self, update))]
    pub async fn update_post(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        update: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        validate_patch(&update)?;

        if let Some(post) = self.repo.update_post(post_id, author_id, update).await? {
            self.analytics
                .record("post_updated", json!({ "post_id": post_id }), Some(author_id))
                .await;
            return Ok(post);
        }

        // Nothing matched: distinguish a foreign owner from a missing post.
        match self.repo.find_by_id(post_id).await? {
            Some(post) if post.status == PostStatus::Active && post.posted_by != author_id => {
                Err(DomainError::Forbidden)
            }
            _ => Err(DomainError::PostNotFound(post_id)),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, author_id: Uuid, post_id: Uuid) -> Result<(), DomainError> {
        self.repo.remove_post(post_id, author_id).await?;
        self.analytics
            .record("post_deleted", json!({ "post_id": post_id }), Some(author_id))
            .await;
        Ok(())
    }

    /// Writes the exact desired end-state and reports it back, so repeated
    /// clicks with the same intent cannot race each other.
    #[instrument(skip(self))]
    pub async fn set_favorite(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        desired: bool,
    ) -> Result<bool, DomainError> {
        self.get_post(post_id).await?;
        self.favorites
            .set_favorited(user_id, post_id, desired)
            .await?;
        Ok(desired)
    }

    /// Read-then-set on top of `set_favorite`. Returns true when the post
    /// is now favorited.
    #[instrument(skip(self))]
    pub async fn toggle_favorite(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, DomainError> {
        self.get_post(post_id).await?;
        let desired = !self.favorites.is_favorited(user_id, post_id).await?;
        self.favorites
            .set_favorited(user_id, post_id, desired)
            .await?;
        Ok(desired)
    }

    pub async fn list_favorites(&self, user_id: Uuid) -> Result<Vec<Post>, DomainError> {
        self.favorites.posts_favorited_by(user_id).await
    }

    /// The caller's own active posts, for the profile view.
    pub async fn list_own(&self, user_id: Uuid) -> Result<Vec<Post>, DomainError> {
        self.repo.posts_by_owner(user_id).await
    }
}

fn validate_new_post(request: &CreatePostRequest) -> Result<(), DomainError> {
    let title = request.title.trim();
    if title.len() < TITLE_MIN {
        return Err(DomainError::Validation(format!(
            "title must be at least {TITLE_MIN} characters long"
        )));
    }
    if title.len() > TITLE_MAX {
        return Err(DomainError::Validation(format!(
            "title must be at most {TITLE_MAX} characters long"
        )));
    }

    let description = request.description.trim();
    if description.len() < DESCRIPTION_MIN {
        return Err(DomainError::Validation(format!(
            "description must be at least {DESCRIPTION_MIN} characters long"
        )));
    }
    if description.len() > DESCRIPTION_MAX {
        return Err(DomainError::Validation(format!(
            "description must be at most {DESCRIPTION_MAX} characters long"
        )));
    }

    // Deals may be location-free (online offers); job listings may not.
    if request.post_type == PostType::Job
        && request
            .location
            .as_deref()
            .map(str::trim)
            .is_none_or(str::is_empty)
    {
        return Err(DomainError::Validation(
            "location is required for job posts".into(),
        ));
    }

    validate_price(request.price)
}

fn validate_patch(update: &UpdatePostRequest) -> Result<(), DomainError> {
    if let Some(title) = update.title.as_deref() {
        let title = title.trim();
        if title.len() < TITLE_MIN || title.len() > TITLE_MAX {
            return Err(DomainError::Validation(format!(
                "title must be between {TITLE_MIN} and {TITLE_MAX} characters long"
            )));
        }
    }
    if let Some(description) = update.description.as_deref() {
        let description = description.trim();
        if description.len() < DESCRIPTION_MIN || description.len() > DESCRIPTION_MAX {
            return Err(DomainError::Validation(format!(
                "description must be between {DESCRIPTION_MIN} and {DESCRIPTION_MAX} characters long"
            )));
        }
    }
    validate_price(update.price)
}

fn validate_price(price: Option<f64>) -> Result<(), DomainError> {
    if let Some(price) = price {
        if !price.is_finite() || price < 0.0 {
            return Err(DomainError::Validation(
                "price must be a non-negative number".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use zendea_types::SortKey;

    #[derive(Default)]
    struct InMemoryPostRepository {
        posts: Mutex<Vec<Post>>,
    }

    #[async_trait]
    impl PostRepository for InMemoryPostRepository {
        async fn create(&self, post: Post) -> Result<Post, DomainError> {
            let post = Post {
                created_at: Some(Utc::now()),
                updated_at: Some(Utc::now()),
                ..post
            };
            self.posts.lock().unwrap().push(post.clone());
            Ok(post)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
            Ok(self
                .posts
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == id)
                .cloned())
        }

        async fn update_post(
            &self,
            id: Uuid,
            owner_id: Uuid,
            update: UpdatePostRequest,
        ) -> Result<Option<Post>, DomainError> {
            let mut posts = self.posts.lock().unwrap();
            let Some(post) = posts.iter_mut().find(|p| {
                p.id == id && p.posted_by == owner_id && p.status == PostStatus::Active
            }) else {
                return Ok(None);
            };
            if let Some(title) = update.title {
                post.title = title;
            }
            if let Some(description) = update.description {
                post.description = description;
            }
            if let Some(location) = update.location {
                post.location = Some(location);
            }
            if let Some(price) = update.price {
                post.price = Some(price);
            }
            post.updated_at = Some(Utc::now());
            Ok(Some(post.clone()))
        }

        async fn remove_post(&self, id: Uuid, owner_id: Uuid) -> Result<(), DomainError> {
            let mut posts = self.posts.lock().unwrap();
            match posts.iter_mut().find(|p| p.id == id) {
                Some(post) if post.posted_by != owner_id => Err(DomainError::Forbidden),
                Some(post) => {
                    post.status = PostStatus::Removed;
                    Ok(())
                }
                None => Ok(()),
            }
        }

        async fn load_active(&self, limit: usize) -> Result<Vec<Post>, DomainError> {
            let posts = self.posts.lock().unwrap();
            Ok(posts
                .iter()
                .filter(|p| p.status == PostStatus::Active)
                .take(limit)
                .cloned()
                .collect())
        }

        async fn posts_by_owner(&self, owner_id: Uuid) -> Result<Vec<Post>, DomainError> {
            let posts = self.posts.lock().unwrap();
            Ok(posts
                .iter()
                .filter(|p| p.posted_by == owner_id && p.status == PostStatus::Active)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct InMemoryFavoriteRepository {
        entries: Mutex<HashSet<(Uuid, Uuid)>>,
    }

    #[async_trait]
    impl FavoriteRepository for InMemoryFavoriteRepository {
        async fn is_favorited(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, DomainError> {
            Ok(self.entries.lock().unwrap().contains(&(user_id, post_id)))
        }

        async fn set_favorited(
            &self,
            user_id: Uuid,
            post_id: Uuid,
            desired: bool,
        ) -> Result<(), DomainError> {
            let mut entries = self.entries.lock().unwrap();
            if desired {
                entries.insert((user_id, post_id));
            } else {
                entries.remove(&(user_id, post_id));
            }
            Ok(())
        }

        async fn posts_favorited_by(&self, _user_id: Uuid) -> Result<Vec<Post>, DomainError> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct RecordingNotifications {
        sent: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl NotificationRepository for RecordingNotifications {
        async fn create(&self, notification: Notification) -> Result<(), DomainError> {
            self.sent.lock().unwrap().push(notification);
            Ok(())
        }

        async fn for_user(&self, _user_id: Uuid) -> Result<Vec<Notification>, DomainError> {
            Ok(self.sent.lock().unwrap().clone())
        }

        async fn mark_read(&self, _id: Uuid, _user_id: Uuid) -> Result<(), DomainError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingAnalytics {
        events: AtomicUsize,
    }

    #[async_trait]
    impl AnalyticsRepository for CountingAnalytics {
        async fn record(&self, _event: &str, _data: serde_json::Value, _user_id: Option<Uuid>) {
            self.events.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fixture {
        service: PostService<InMemoryPostRepository>,
        notifications: Arc<RecordingNotifications>,
        analytics: Arc<CountingAnalytics>,
    }

    fn fixture() -> Fixture {
        let notifications = Arc::new(RecordingNotifications::default());
        let analytics = Arc::new(CountingAnalytics::default());
        let service = PostService::new(
            Arc::new(InMemoryPostRepository::default()),
            Arc::new(InMemoryFavoriteRepository::default()),
            Arc::clone(&notifications) as Arc<dyn NotificationRepository>,
            Arc::clone(&analytics) as Arc<dyn AnalyticsRepository>,
            200,
        );
        Fixture {
            service,
            notifications,
            analytics,
        }
    }

    fn job_request(title: &str) -> CreatePostRequest {
        CreatePostRequest {
            post_type: PostType::Job,
            title: title.into(),
            description: "A description long enough to pass validation".into(),
            location: Some("Springfield".into()),
            price: Some(100.0),
            price_unit: None,
        }
    }

    #[tokio::test]
    async fn create_post_rejects_short_title() {
        let fx = fixture();
        let err = fx
            .service
            .create_post(Uuid::new_v4(), "ada".into(), job_request("dev"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn create_post_rejects_short_description() {
        let fx = fixture();
        let mut request = job_request("Senior backend engineer");
        request.description = "too short".into();
        let err = fx
            .service
            .create_post(Uuid::new_v4(), "ada".into(), request)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn jobs_require_a_location_but_deals_do_not() {
        let fx = fixture();

        let mut job = job_request("Senior backend engineer");
        job.location = None;
        let err = fx
            .service
            .create_post(Uuid::new_v4(), "ada".into(), job)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let mut deal = job_request("Half price keyboards");
        deal.post_type = PostType::Deal;
        deal.location = None;
        fx.service
            .create_post(Uuid::new_v4(), "ada".into(), deal)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_post_broadcasts_and_records_analytics() {
        let fx = fixture();
        let post = fx
            .service
            .create_post(Uuid::new_v4(), "ada".into(), job_request("Senior engineer"))
            .await
            .unwrap();

        assert_eq!(post.status, PostStatus::Active);
        assert!(post.created_at.is_some());

        let sent = fx.notifications.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, "new_post");
        assert!(sent[0].user_id.is_none());
        assert!(sent[0].body.contains("Senior engineer"));
        drop(sent);

        assert_eq!(fx.analytics.events.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn created_post_round_trips_through_search() {
        let fx = fixture();
        let author = Uuid::new_v4();
        let created = fx
            .service
            .create_post(author, "ada".into(), job_request("Senior engineer"))
            .await
            .unwrap();

        let found = fx
            .service
            .search_posts(&FilterCriteria::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, created.id);
        assert_eq!(found[0].title, "Senior engineer");
        assert_eq!(found[0].posted_by, author);
    }

    #[tokio::test]
    async fn deleting_an_unknown_id_is_idempotent() {
        let fx = fixture();
        fx.service
            .delete_post(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn deleting_twice_succeeds_and_hides_the_post() {
        let fx = fixture();
        let author = Uuid::new_v4();
        let post = fx
            .service
            .create_post(author, "ada".into(), job_request("Senior engineer"))
            .await
            .unwrap();

        fx.service.delete_post(author, post.id).await.unwrap();
        fx.service.delete_post(author, post.id).await.unwrap();

        let err = fx.service.get_post(post.id).await.unwrap_err();
        assert!(matches!(err, DomainError::PostNotFound(_)));
        assert!(
            fx.service
                .search_posts(&FilterCriteria::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn only_the_owner_may_delete() {
        let fx = fixture();
        let author = Uuid::new_v4();
        let post = fx
            .service
            .create_post(author, "ada".into(), job_request("Senior engineer"))
            .await
            .unwrap();

        let err = fx
            .service
            .delete_post(Uuid::new_v4(), post.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));
    }

    #[tokio::test]
    async fn only_the_owner_may_update() {
        let fx = fixture();
        let author = Uuid::new_v4();
        let post = fx
            .service
            .create_post(author, "ada".into(), job_request("Senior engineer"))
            .await
            .unwrap();

        let update = UpdatePostRequest {
            title: Some("A different long title".into()),
            ..UpdatePostRequest::default()
        };
        let err = fx
            .service
            .update_post(Uuid::new_v4(), post.id, update)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));
    }

    #[tokio::test]
    async fn toggle_favorite_reports_the_new_state() {
        let fx = fixture();
        let author = Uuid::new_v4();
        let viewer = Uuid::new_v4();
        let post = fx
            .service
            .create_post(author, "ada".into(), job_request("Senior engineer"))
            .await
            .unwrap();

        assert!(fx.service.toggle_favorite(viewer, post.id).await.unwrap());
        assert!(!fx.service.toggle_favorite(viewer, post.id).await.unwrap());
    }

    #[tokio::test]
    async fn set_favorite_is_idempotent() {
        let fx = fixture();
        let author = Uuid::new_v4();
        let viewer = Uuid::new_v4();
        let post = fx
            .service
            .create_post(author, "ada".into(), job_request("Senior engineer"))
            .await
            .unwrap();

        assert!(fx.service.set_favorite(viewer, post.id, true).await.unwrap());
        assert!(fx.service.set_favorite(viewer, post.id, true).await.unwrap());
        // One more toggle proves exactly one entry was behind both writes.
        assert!(!fx.service.toggle_favorite(viewer, post.id).await.unwrap());
    }

    #[tokio::test]
    async fn favoriting_a_missing_post_is_not_found() {
        let fx = fixture();
        let err = fx
            .service
            .set_favorite(Uuid::new_v4(), Uuid::new_v4(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PostNotFound(_)));
    }

    #[tokio::test]
    async fn list_own_returns_only_the_callers_active_posts() {
        let fx = fixture();
        let ada = Uuid::new_v4();
        let bob = Uuid::new_v4();

        fx.service
            .create_post(ada, "ada".into(), job_request("Ada's first listing"))
            .await
            .unwrap();
        let removed = fx
            .service
            .create_post(ada, "ada".into(), job_request("Ada's second listing"))
            .await
            .unwrap();
        fx.service
            .create_post(bob, "bob".into(), job_request("Bob's only listing"))
            .await
            .unwrap();

        fx.service.delete_post(ada, removed.id).await.unwrap();

        let mine = fx.service.list_own(ada).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "Ada's first listing");
        assert!(mine.iter().all(|p| p.posted_by == ada));
    }

    #[tokio::test]
    async fn search_applies_criteria_over_the_load() {
        let fx = fixture();
        let author = Uuid::new_v4();
        fx.service
            .create_post(author, "ada".into(), job_request("Rust developer wanted"))
            .await
            .unwrap();
        let mut deal = job_request("Discounted standing desk");
        deal.post_type = PostType::Deal;
        deal.price = Some(50.0);
        fx.service
            .create_post(author, "ada".into(), deal)
            .await
            .unwrap();

        let jobs = fx
            .service
            .search_posts(&FilterCriteria::for_category(PostType::Job))
            .await
            .unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Rust developer wanted");

        let cheap_first = fx
            .service
            .search_posts(&FilterCriteria {
                sort: SortKey::PriceLow,
                ..FilterCriteria::default()
            })
            .await
            .unwrap();
        assert_eq!(cheap_first[0].title, "Discounted standing desk");
    }
}
