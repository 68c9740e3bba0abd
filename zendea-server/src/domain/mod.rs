pub mod error;
pub mod feedback;
pub mod message;
pub mod notification;
pub mod user;

pub use zendea_types::{FilterCriteria, Post, PostStatus, PostType, PriceUnit, SortKey};
