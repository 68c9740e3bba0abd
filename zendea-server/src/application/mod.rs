pub mod auth_service;
pub mod feedback_service;
pub mod inbox_service;
pub mod post_service;
