//! Client-side building blocks for Zendea: the HTTP API client, the
//! session state machine, and the last-request-wins post feed.

pub mod error;
pub mod feed;
pub mod http_client;
pub mod session;

pub use error::ZendeaClientError;
pub use feed::{LoadTicket, PostFeed};
pub use http_client::{CardsResponse, MessageSummary, NewPost, NotificationSummary, PostPatch, ZendeaClient};
pub use session::{Session, SessionGate, UserIdentity};
pub use zendea_types::{FilterCriteria, Post, PostStatus, PostType, PriceUnit, SortKey};
