//! Shared domain types for the Zendea classifieds board, used by both the
//! server and the client crates. The `sqlx` feature adds the derives needed
//! to read these types straight out of Postgres rows.

pub mod filter;
pub mod post;

pub use filter::{FilterCriteria, SortKey, apply};
pub use post::{Post, PostStatus, PostType, PriceUnit};
