pub mod auth;
pub mod feedback;
pub mod inbox;
pub mod post;
