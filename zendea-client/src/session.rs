use tokio::sync::watch;
use uuid::Uuid;

use crate::error::ZendeaClientError;

/// Identity carried by an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// There are exactly two session states; no half-signed-in limbo.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Guest,
    Authenticated(UserIdentity),
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            Session::Authenticated(user) => Some(user),
            Session::Guest => None,
        }
    }
}

/// Single source of truth for the session state. Observers subscribe once
/// and see every transition; nothing else in the client caches identity.
#[derive(Debug, Clone)]
pub struct SessionGate {
    tx: watch::Sender<Session>,
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionGate {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Session::Guest);
        Self { tx }
    }

    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// A receiver that wakes on every state transition. Identical
    /// back-to-back states are not re-announced.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    pub fn sign_in(&self, user: UserIdentity) {
        self.tx.send_if_modified(|state| {
            let next = Session::Authenticated(user.clone());
            if *state == next {
                return false;
            }
            *state = next;
            true
        });
    }

    pub fn sign_out(&self) {
        self.tx.send_if_modified(|state| {
            if *state == Session::Guest {
                return false;
            }
            *state = Session::Guest;
            true
        });
    }

    /// Gate for operations that require a signed-in user.
    pub fn require_user(&self) -> Result<UserIdentity, ZendeaClientError> {
        self.current()
            .user()
            .cloned()
            .ok_or(ZendeaClientError::Unauthorized)
    }
}
