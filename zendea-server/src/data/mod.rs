pub mod analytics_repository;
pub mod favorite_repository;
pub mod feedback_repository;
pub mod message_repository;
pub mod notification_repository;
pub mod post_repository;
pub mod user_repository;
