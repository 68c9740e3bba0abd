use crate::application::auth_service::AuthService;
use crate::data::user_repository::PostgresUserRepository;
use crate::domain::error::DomainError;
use crate::infrastructure::security::TOKEN_TTL_HOURS;
use crate::presentation::dto::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::presentation::utils::AuthenticatedUser;
use actix_web::{HttpResponse, Responder, Scope, get, post, web};
use tracing::info;

pub fn scope() -> Scope {
    web::scope("/auth").service(register).service(login)
}

#[post("/register")]
async fn register(
    service: web::Data<AuthService<PostgresUserRepository>>,
    payload: web::Json<RegisterRequest>,
) -> Result<impl Responder, DomainError> {
    let payload = payload.into_inner();
    let user = service
        .register(payload.email, payload.name, payload.password.clone())
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");

    // A fresh registration signs the user straight in.
    let (user, token) = service.login(&user.email, &payload.password).await?;

    Ok(HttpResponse::Created().json(AuthResponse {
        access_token: token,
        expires_in: TOKEN_TTL_HOURS * 3600,
        token_type: "Bearer".to_string(),
        user: UserResponse::from(&user),
    }))
}

#[post("/login")]
async fn login(
    service: web::Data<AuthService<PostgresUserRepository>>,
    payload: web::Json<LoginRequest>,
) -> Result<impl Responder, DomainError> {
    let (user, token) = service.login(&payload.email, &payload.password).await?;

    info!(user_id = %user.id, "user logged in");

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        expires_in: TOKEN_TTL_HOURS * 3600,
        token_type: "Bearer".to_string(),
        user: UserResponse::from(&user),
    }))
}

/// Echoes the identity behind the bearer token. Registered inside the
/// authenticated scope, unlike the rest of this module.
#[get("/me")]
pub async fn me(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(UserResponse {
        id: user.id,
        email: user.email,
        name: user.name,
    })
}
