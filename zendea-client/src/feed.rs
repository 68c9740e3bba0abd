use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;
use zendea_types::Post;

/// Proof of which load attempt a result belongs to. Tickets are compared
/// on commit, so a slow early response can never clobber a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// The post list a UI renders from. Every reload takes a ticket before it
/// starts; only the most recently issued ticket is allowed to publish its
/// result. Everything older is dropped on arrival.
#[derive(Debug)]
pub struct PostFeed {
    issued: AtomicU64,
    tx: watch::Sender<Vec<Post>>,
}

impl Default for PostFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl PostFeed {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self {
            issued: AtomicU64::new(0),
            tx,
        }
    }

    /// Registers a new load attempt and invalidates all earlier tickets.
    pub fn begin(&self) -> LoadTicket {
        LoadTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Publishes a completed load. Returns false when a newer load has
    /// been started in the meantime and this result was discarded.
    pub fn commit(&self, ticket: LoadTicket, posts: Vec<Post>) -> bool {
        if ticket.0 != self.issued.load(Ordering::SeqCst) {
            debug!(ticket = ticket.0, "discarding stale feed load");
            return false;
        }
        self.tx.send_replace(posts);
        true
    }

    pub fn snapshot(&self) -> Vec<Post> {
        self.tx.borrow().clone()
    }

    /// Wakes on every published feed change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Post>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use zendea_types::{PostStatus, PostType};

    fn post(title: &str) -> Post {
        Post {
            id: Uuid::new_v4(),
            post_type: PostType::Deal,
            title: title.to_string(),
            description: String::new(),
            location: None,
            price: None,
            price_unit: None,
            posted_by: Uuid::new_v4(),
            posted_by_name: "Ada".to_string(),
            status: PostStatus::Active,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn single_load_publishes() {
        let feed = PostFeed::new();
        let ticket = feed.begin();
        assert!(feed.commit(ticket, vec![post("first")]));
        assert_eq!(feed.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn slow_early_load_is_discarded() {
        let feed = PostFeed::new();
        let first = feed.begin();
        let second = feed.begin();

        // The newer load finishes first.
        assert!(feed.commit(second, vec![post("newer")]));
        // The older one limps in afterwards and must not win.
        assert!(!feed.commit(first, vec![post("older")]));

        let titles: Vec<_> = feed.snapshot().iter().map(|p| p.title.clone()).collect();
        assert_eq!(titles, vec!["newer"]);
    }

    #[tokio::test]
    async fn stale_load_is_discarded_even_before_the_newer_one_lands() {
        let feed = PostFeed::new();
        let first = feed.begin();
        let second = feed.begin();

        assert!(!feed.commit(first, vec![post("older")]));
        assert!(feed.snapshot().is_empty());

        assert!(feed.commit(second, vec![post("newer")]));
        assert_eq!(feed.snapshot()[0].title, "newer");
    }

    #[tokio::test]
    async fn subscribers_see_committed_loads() {
        let feed = PostFeed::new();
        let mut rx = feed.subscribe();

        let ticket = feed.begin();
        feed.commit(ticket, vec![post("fresh")]);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update()[0].title, "fresh");
    }
}
