use std::path::PathBuf;

use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;
use zendea_types::{FilterCriteria, Post, PostType, PriceUnit, SortKey};

use crate::error::ZendeaClientError;
use crate::session::{SessionGate, UserIdentity};

const TOKEN_FILE: &str = ".zendea_token";

/// HTTP client for the Zendea API. Holds the bearer token, persists it
/// across runs, and keeps the [`SessionGate`] in step with every
/// authentication change.
#[derive(Debug, Clone)]
pub struct ZendeaClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    token_path: PathBuf,
    session: SessionGate,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: String,
    user: UserPayload,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: Uuid,
    email: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct PostsResponse {
    posts: Vec<Post>,
}

#[derive(Debug, Deserialize)]
pub struct CardsResponse {
    pub cards: Vec<String>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
struct FavoriteResponse {
    favorited: bool,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    messages: Vec<MessageSummary>,
}

#[derive(Debug, Deserialize)]
struct NotificationsResponse {
    notifications: Vec<NotificationSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageSummary {
    pub id: Uuid,
    pub sender_email: String,
    pub subject: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSummary {
    pub id: Uuid,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub post_type: PostType,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_unit: Option<PriceUnit>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_unit: Option<PriceUnit>,
}

impl ZendeaClient {
    pub fn connect(endpoint: &str) -> Result<Self, ZendeaClientError> {
        let base_url = endpoint.trim_end_matches('/').to_string();
        let token_path = PathBuf::from(TOKEN_FILE);
        let token = std::fs::read_to_string(&token_path)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(Self {
            client: Client::builder().build()?,
            base_url,
            token,
            token_path,
            session: SessionGate::new(),
        })
    }

    pub fn session(&self) -> &SessionGate {
        &self.session
    }

    /// If a token survived from a previous run, asks the server who it
    /// belongs to. An expired token is dropped silently.
    pub async fn restore_session(&mut self) -> Result<(), ZendeaClientError> {
        if self.token.is_none() {
            return Ok(());
        }
        match self.me().await {
            Ok(user) => {
                self.session.sign_in(user);
                Ok(())
            }
            Err(ZendeaClientError::Unauthorized) => {
                debug!("stored token no longer valid");
                self.clear_token()?;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    pub async fn register(
        &mut self,
        email: &str,
        name: Option<&str>,
        password: &str,
    ) -> Result<UserIdentity, ZendeaClientError> {
        let resp = self
            .client
            .post(format!("{}/api/auth/register", self.base_url))
            .json(&serde_json::json!({
                "email": email,
                "name": name,
                "password": password,
            }))
            .send()
            .await?;
        self.accept_auth(resp).await
    }

    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<UserIdentity, ZendeaClientError> {
        let resp = self
            .client
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await?;
        self.accept_auth(resp).await
    }

    pub fn logout(&mut self) -> Result<(), ZendeaClientError> {
        self.clear_token()?;
        Ok(())
    }

    pub async fn me(&self) -> Result<UserIdentity, ZendeaClientError> {
        let resp = self
            .authorized(self.client.get(format!("{}/api/me", self.base_url)))?
            .send()
            .await?;
        let user: UserPayload = expect_success(resp).await?.json().await?;
        Ok(UserIdentity {
            id: user.id,
            email: user.email,
            name: user.name,
        })
    }

    pub async fn search_posts(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<Post>, ZendeaClientError> {
        let resp = self
            .client
            .get(format!("{}/api/posts", self.base_url))
            .query(&criteria_params(criteria))
            .send()
            .await?;
        let posts: PostsResponse = expect_success(resp).await?.json().await?;
        Ok(posts.posts)
    }

    /// Server-rendered card markup for the same search. Sends the token
    /// when one is held so the cards include the viewer's actions.
    pub async fn fetch_cards(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<CardsResponse, ZendeaClientError> {
        let mut req = self
            .client
            .get(format!("{}/api/posts/cards", self.base_url))
            .query(&criteria_params(criteria));
        if self.token.is_some() {
            req = self.authorized(req)?;
        }
        let resp = req.send().await?;
        Ok(expect_success(resp).await?.json().await?)
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, ZendeaClientError> {
        let resp = self
            .client
            .get(format!("{}/api/posts/{id}", self.base_url))
            .send()
            .await?;
        Ok(expect_success(resp).await?.json().await?)
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<Post, ZendeaClientError> {
        let resp = self
            .authorized(self.client.post(format!("{}/api/posts", self.base_url)))?
            .json(post)
            .send()
            .await?;
        Ok(expect_success(resp).await?.json().await?)
    }

    pub async fn update_post(
        &self,
        id: Uuid,
        patch: &PostPatch,
    ) -> Result<Post, ZendeaClientError> {
        let resp = self
            .authorized(self.client.put(format!("{}/api/posts/{id}", self.base_url)))?
            .json(patch)
            .send()
            .await?;
        Ok(expect_success(resp).await?.json().await?)
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<(), ZendeaClientError> {
        let resp = self
            .authorized(
                self.client
                    .delete(format!("{}/api/posts/{id}", self.base_url)),
            )?
            .send()
            .await?;
        expect_success(resp).await?;
        Ok(())
    }

    /// States the desired end-state instead of flipping whatever is
    /// currently stored, so repeated clicks cannot race each other.
    pub async fn set_favorite(&self, id: Uuid, favorited: bool) -> Result<bool, ZendeaClientError> {
        let resp = self
            .authorized(
                self.client
                    .put(format!("{}/api/posts/{id}/favorite", self.base_url)),
            )?
            .json(&serde_json::json!({ "favorited": favorited }))
            .send()
            .await?;
        let fav: FavoriteResponse = expect_success(resp).await?.json().await?;
        Ok(fav.favorited)
    }

    pub async fn toggle_favorite(&self, id: Uuid) -> Result<bool, ZendeaClientError> {
        let resp = self
            .authorized(
                self.client
                    .post(format!("{}/api/posts/{id}/favorite/toggle", self.base_url)),
            )?
            .send()
            .await?;
        let fav: FavoriteResponse = expect_success(resp).await?.json().await?;
        Ok(fav.favorited)
    }

    /// The caller's own listings, as shown on the profile page.
    pub async fn my_posts(&self) -> Result<Vec<Post>, ZendeaClientError> {
        let resp = self
            .authorized(self.client.get(format!("{}/api/me/posts", self.base_url)))?
            .send()
            .await?;
        let posts: PostsResponse = expect_success(resp).await?.json().await?;
        Ok(posts.posts)
    }

    pub async fn favorites(&self) -> Result<Vec<Post>, ZendeaClientError> {
        let resp = self
            .authorized(self.client.get(format!("{}/api/favorites", self.base_url)))?
            .send()
            .await?;
        let posts: PostsResponse = expect_success(resp).await?.json().await?;
        Ok(posts.posts)
    }

    pub async fn send_message(
        &self,
        recipient_email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), ZendeaClientError> {
        let resp = self
            .authorized(self.client.post(format!("{}/api/messages", self.base_url)))?
            .json(&serde_json::json!({
                "recipient_email": recipient_email,
                "subject": subject,
                "body": body,
            }))
            .send()
            .await?;
        expect_success(resp).await?;
        Ok(())
    }

    pub async fn messages(&self) -> Result<Vec<MessageSummary>, ZendeaClientError> {
        let resp = self
            .authorized(self.client.get(format!("{}/api/messages", self.base_url)))?
            .send()
            .await?;
        let inbox: MessagesResponse = expect_success(resp).await?.json().await?;
        Ok(inbox.messages)
    }

    pub async fn mark_message_read(&self, id: Uuid) -> Result<(), ZendeaClientError> {
        let resp = self
            .authorized(
                self.client
                    .post(format!("{}/api/messages/{id}/read", self.base_url)),
            )?
            .send()
            .await?;
        expect_success(resp).await?;
        Ok(())
    }

    pub async fn notifications(&self) -> Result<Vec<NotificationSummary>, ZendeaClientError> {
        let resp = self
            .authorized(
                self.client
                    .get(format!("{}/api/notifications", self.base_url)),
            )?
            .send()
            .await?;
        let feed: NotificationsResponse = expect_success(resp).await?.json().await?;
        Ok(feed.notifications)
    }

    pub async fn mark_notification_read(&self, id: Uuid) -> Result<(), ZendeaClientError> {
        let resp = self
            .authorized(
                self.client
                    .post(format!("{}/api/notifications/{id}/read", self.base_url)),
            )?
            .send()
            .await?;
        expect_success(resp).await?;
        Ok(())
    }

    pub async fn send_feedback(
        &self,
        subject: Option<&str>,
        body: &str,
        rating: i16,
    ) -> Result<(), ZendeaClientError> {
        let resp = self
            .authorized(self.client.post(format!("{}/api/feedback", self.base_url)))?
            .json(&serde_json::json!({
                "subject": subject,
                "body": body,
                "rating": rating,
            }))
            .send()
            .await?;
        expect_success(resp).await?;
        Ok(())
    }

    async fn accept_auth(
        &mut self,
        resp: Response,
    ) -> Result<UserIdentity, ZendeaClientError> {
        let auth: AuthResponse = expect_success(resp).await?.json().await?;
        self.store_token(&auth.access_token)?;
        let user = UserIdentity {
            id: auth.user.id,
            email: auth.user.email,
            name: auth.user.name,
        };
        self.session.sign_in(user.clone());
        Ok(user)
    }

    fn store_token(&mut self, token: &str) -> Result<(), ZendeaClientError> {
        std::fs::write(&self.token_path, token)?;
        self.token = Some(token.to_string());
        Ok(())
    }

    fn clear_token(&mut self) -> Result<(), ZendeaClientError> {
        self.token = None;
        self.session.sign_out();
        match std::fs::remove_file(&self.token_path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn authorized(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ZendeaClientError> {
        let token = self.token.as_deref().ok_or(ZendeaClientError::Unauthorized)?;
        Ok(req.bearer_auth(token))
    }
}

/// Passes successful responses through untouched; anything else is folded
/// into the error taxonomy, consuming the body for the server's message.
async fn expect_success(resp: Response) -> Result<Response, ZendeaClientError> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        Err(ZendeaClientError::from_http_response(resp).await)
    }
}

fn criteria_params(criteria: &FilterCriteria) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if !criteria.query.is_empty() {
        params.push(("query", criteria.query.clone()));
    }
    if let Some(category) = criteria.category {
        params.push(("category", category.to_string()));
    }
    if !criteria.location.is_empty() {
        params.push(("location", criteria.location.clone()));
    }
    if let Some(max_price) = criteria.max_price {
        params.push(("max_price", max_price.to_string()));
    }
    params.push(("sort", sort_value(criteria.sort).to_string()));
    params
}

fn sort_value(sort: SortKey) -> &'static str {
    match sort {
        SortKey::Newest => "newest",
        SortKey::Oldest => "oldest",
        SortKey::PriceLow => "price-low",
        SortKey::PriceHigh => "price-high",
    }
}
