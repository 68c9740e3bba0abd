mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{App, HttpResponse, HttpServer, get, web};
use serde_json::json;

use application::auth_service::AuthService;
use application::feedback_service::FeedbackService;
use application::inbox_service::InboxService;
use application::post_service::PostService;
use data::analytics_repository::{AnalyticsRepository, PostgresAnalyticsRepository};
use data::favorite_repository::{FavoriteRepository, PostgresFavoriteRepository};
use data::feedback_repository::PostgresFeedbackRepository;
use data::message_repository::PostgresMessageRepository;
use data::notification_repository::{NotificationRepository, PostgresNotificationRepository};
use data::post_repository::PostgresPostRepository;
use data::user_repository::{PostgresUserRepository, UserRepository};
use infrastructure::config::AppConfig;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::logging::init_logging;
use infrastructure::security::JwtKeys;
use presentation::handlers;
use presentation::middleware::{JwtAuthMiddleware, RequestIdMiddleware, TimingMiddleware};

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logging();

    let config = AppConfig::from_env().expect("invalid configuration");
    let pool = create_pool(&config.database_url)
        .await
        .expect("failed to connect to database");
    run_migrations(&pool)
        .await
        .expect("failed to run migrations");

    let user_repo = Arc::new(PostgresUserRepository::new(pool.clone()));
    let post_repo = Arc::new(PostgresPostRepository::new(pool.clone()));
    let favorite_repo = Arc::new(PostgresFavoriteRepository::new(pool.clone()));
    let message_repo = Arc::new(PostgresMessageRepository::new(pool.clone()));
    let notification_repo = Arc::new(PostgresNotificationRepository::new(pool.clone()));
    let feedback_repo = Arc::new(PostgresFeedbackRepository::new(pool.clone()));
    let analytics_repo: Arc<dyn AnalyticsRepository> =
        Arc::new(PostgresAnalyticsRepository::new(pool.clone()));

    let auth_service = AuthService::new(
        Arc::clone(&user_repo),
        JwtKeys::new(config.jwt_secret.clone()),
    );
    let post_service = PostService::new(
        Arc::clone(&post_repo),
        Arc::clone(&favorite_repo) as Arc<dyn FavoriteRepository>,
        Arc::clone(&notification_repo) as Arc<dyn NotificationRepository>,
        Arc::clone(&analytics_repo),
        config.posts_load_limit,
    );
    let inbox_service = InboxService::new(
        Arc::clone(&message_repo),
        Arc::clone(&notification_repo),
        Arc::clone(&user_repo) as Arc<dyn UserRepository>,
        Arc::clone(&analytics_repo),
    );
    let feedback_service = FeedbackService::new(
        Arc::clone(&feedback_repo),
        Arc::clone(&analytics_repo),
    );

    let config_data = config.clone();

    HttpServer::new(move || {
        let cors = build_cors(&config_data);
        App::new()
            .wrap(Logger::default())
            .wrap(TimingMiddleware)
            // registered last so it runs first and the timing log sees the id
            .wrap(RequestIdMiddleware)
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "no-referrer"))
                    .add(("Permissions-Policy", "geolocation=()"))
                    .add(("Cross-Origin-Opener-Policy", "same-origin")),
            )
            .wrap(cors)
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(post_service.clone()))
            .app_data(web::Data::new(inbox_service.clone()))
            .app_data(web::Data::new(feedback_service.clone()))
            .service(health)
            .service(
                web::scope("/api")
                    .service(handlers::auth::scope())
                    // cards must register before the {id} route
                    .service(handlers::post::list_post_cards)
                    .service(handlers::post::list_posts)
                    .service(handlers::post::get_post)
                    .service(
                        web::scope("")
                            .wrap(JwtAuthMiddleware::new(auth_service.keys().clone()))
                            .service(handlers::auth::me)
                            .service(handlers::post::list_my_posts)
                            .service(handlers::post::create_post)
                            .service(handlers::post::update_post)
                            .service(handlers::post::delete_post)
                            .service(handlers::post::set_favorite)
                            .service(handlers::post::toggle_favorite)
                            .service(handlers::post::list_favorites)
                            .service(handlers::inbox::send_message)
                            .service(handlers::inbox::list_messages)
                            .service(handlers::inbox::mark_message_read)
                            .service(handlers::inbox::list_notifications)
                            .service(handlers::inbox::mark_notification_read)
                            .service(handlers::feedback::submit_feedback),
                    ),
            )
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .supports_credentials()
        .max_age(3600);

    for origin in &config.cors_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}
