use crate::application::auth_service::AuthService;
use crate::application::post_service::PostService;
use crate::data::post_repository::PostgresPostRepository;
use crate::data::user_repository::PostgresUserRepository;
use crate::domain::FilterCriteria;
use crate::domain::error::DomainError;
use crate::presentation::dto::{
    CreatePostRequest, FavoriteResponse, ListPostsQuery, PostsResponse, SetFavoriteRequest,
    UpdatePostRequest,
};
use crate::presentation::utils::{AuthenticatedUser, optional_user_from_request};
use crate::presentation::views::render_post_cards;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, delete, get, post, put, web};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

type Posts = web::Data<PostService<PostgresPostRepository>>;

#[get("/posts")]
pub async fn list_posts(
    posts: Posts,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse, DomainError> {
    let criteria = FilterCriteria::try_from(query.into_inner())?;
    let posts = posts.search_posts(&criteria).await?;
    let total = posts.len();

    Ok(HttpResponse::Ok().json(PostsResponse { posts, total }))
}

/// Same search as `list_posts`, but returns rendered HTML fragments for
/// clients that swap card markup straight into the page. Guests get cards
/// without action buttons.
#[get("/posts/cards")]
pub async fn list_post_cards(
    req: HttpRequest,
    posts: Posts,
    auth: web::Data<AuthService<PostgresUserRepository>>,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse, DomainError> {
    let criteria = FilterCriteria::try_from(query.into_inner())?;
    let viewer = optional_user_from_request(&req, auth.get_ref()).await;
    let found = posts.search_posts(&criteria).await?;
    let cards = render_post_cards(&found, viewer.as_ref())?;

    Ok(HttpResponse::Ok().json(json!({
        "cards": cards,
        "total": found.len()
    })))
}

#[get("/posts/{id}")]
pub async fn get_post(posts: Posts, path: web::Path<Uuid>) -> Result<HttpResponse, DomainError> {
    let post = posts.get_post(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

#[post("/posts")]
pub async fn create_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: Posts,
    payload: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, DomainError> {
    let post = posts
        .create_post(user.id, user.name.clone(), payload.into_inner())
        .await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        post_id = %post.id,
        "post created"
    );

    Ok(HttpResponse::Created().json(post))
}

#[put("/posts/{id}")]
pub async fn update_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: Posts,
    payload: web::Json<UpdatePostRequest>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let post = posts
        .update_post(user.id, post_id, payload.into_inner())
        .await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        post_id = %post_id,
        "post updated"
    );

    Ok(HttpResponse::Ok().json(post))
}

#[delete("/posts/{id}")]
pub async fn delete_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: Posts,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    posts.delete_post(user.id, post_id).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        post_id = %post_id,
        "post deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}

#[put("/posts/{id}/favorite")]
pub async fn set_favorite(
    user: AuthenticatedUser,
    posts: Posts,
    payload: web::Json<SetFavoriteRequest>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let favorited = posts
        .set_favorite(user.id, post_id, payload.favorited)
        .await?;

    Ok(HttpResponse::Ok().json(FavoriteResponse { post_id, favorited }))
}

#[post("/posts/{id}/favorite/toggle")]
pub async fn toggle_favorite(
    user: AuthenticatedUser,
    posts: Posts,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let favorited = posts.toggle_favorite(user.id, post_id).await?;

    Ok(HttpResponse::Ok().json(FavoriteResponse { post_id, favorited }))
}

#[get("/favorites")]
pub async fn list_favorites(user: AuthenticatedUser, posts: Posts) -> Result<HttpResponse, DomainError> {
    let posts = posts.list_favorites(user.id).await?;
    let total = posts.len();
    Ok(HttpResponse::Ok().json(PostsResponse { posts, total }))
}

/// The signed-in user's own listings, for the profile view.
#[get("/me/posts")]
pub async fn list_my_posts(user: AuthenticatedUser, posts: Posts) -> Result<HttpResponse, DomainError> {
    let posts = posts.list_own(user.id).await?;
    let total = posts.len();
    Ok(HttpResponse::Ok().json(PostsResponse { posts, total }))
}

fn request_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<crate::presentation::middleware::RequestId>()
        .map(|rid| rid.0.clone())
        .unwrap_or_else(|| "unknown".into())
}
