//! Session state shared across screens, fed exclusively by identity
//! provider notifications. Screens read snapshots; nothing else mutates.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::identity::{AuthChange, AuthUser};

/// Snapshot of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl From<AuthUser> for Session {
    fn from(user: AuthUser) -> Self {
        Self {
            user_id: user.uid,
            email: user.email,
            display_name: user.display_name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// The provider has not reported yet.
    #[default]
    Uninitialized,
    Anonymous,
    Authenticated(Session),
}

impl SessionState {
    /// True only before the first provider notification.
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Uninitialized)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

/// Watch-channel store over the provider's auth subscription.
///
/// `Uninitialized` holds until the provider's first notification, then the
/// state only moves between `Anonymous` and `Authenticated`. Dropping the
/// store aborts the forwarder task, releasing the subscription.
pub struct SessionStore {
    receiver: watch::Receiver<SessionState>,
    forwarder: JoinHandle<()>,
}

impl SessionStore {
    pub fn new(mut events: watch::Receiver<AuthChange>) -> Self {
        let (sender, receiver) = watch::channel(SessionState::Uninitialized);
        let forwarder = tokio::spawn(async move {
            loop {
                let change = events.borrow_and_update().clone();
                match change {
                    AuthChange::Unknown => {}
                    AuthChange::SignedOut => {
                        let _ = sender.send(SessionState::Anonymous);
                    }
                    AuthChange::SignedIn(user) => {
                        let _ = sender.send(SessionState::Authenticated(Session::from(user)));
                    }
                }
                if events.changed().await.is_err() {
                    break;
                }
            }
        });
        Self {
            receiver,
            forwarder,
        }
    }

    pub fn state(&self) -> SessionState {
        self.receiver.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.receiver.borrow().is_loading()
    }

    pub fn is_authenticated(&self) -> bool {
        self.receiver.borrow().is_authenticated()
    }

    pub fn session(&self) -> Option<Session> {
        self.receiver.borrow().session().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.receiver.clone()
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}
