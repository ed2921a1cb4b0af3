//! Signed-in user as reported by the external auth provider.
//! Only `id` and `email` are ever read; credentials are never handled here.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
}

impl User {
    pub fn new(id: Uuid, email: Option<String>) -> Self {
        Self { id, email }
    }

    /// Author name used to prefill a new document.
    pub fn default_author(&self) -> Option<String> {
        self.email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

/// Whoever is looking at a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    User(User),
}

impl Viewer {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(user) => Some(user.id),
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(user) => Some(user),
        }
    }
}

impl From<Option<User>> for Viewer {
    fn from(user: Option<User>) -> Self {
        user.map(Viewer::User).unwrap_or(Viewer::Anonymous)
    }
}

/// Current-session handle, passed explicitly to whatever needs the user.
#[derive(Debug, Clone)]
pub struct AuthSession {
    sender: Arc<watch::Sender<Option<User>>>,
}

impl AuthSession {
    pub fn new(user: Option<User>) -> Self {
        let (sender, _) = watch::channel(user);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.sender.borrow().clone()
    }

    pub fn viewer(&self) -> Viewer {
        self.current_user().into()
    }

    /// Replace the signed-in user. Listeners are only woken on an actual change.
    pub fn set_user(&self, user: Option<User>) {
        self.sender.send_if_modified(|current| {
            if *current == user {
                false
            } else {
                *current = user;
                true
            }
        });
    }

    /// Receiver that observes every sign-in and sign-out.
    pub fn on_auth_state_change(&self) -> watch::Receiver<Option<User>> {
        self.sender.subscribe()
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_author_from_email() {
        let user = User::new(Uuid::new_v4(), Some("ada@example.com".into()));
        assert_eq!(user.default_author().as_deref(), Some("ada"));
        assert_eq!(User::new(Uuid::new_v4(), None).default_author(), None);
    }

    #[tokio::test]
    async fn listeners_see_sign_in_and_out() {
        let session = AuthSession::default();
        let mut rx = session.on_auth_state_change();
        assert_eq!(session.viewer(), Viewer::Anonymous);

        let user = User::new(Uuid::new_v4(), None);
        session.set_user(Some(user.clone()));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().clone(), Some(user.clone()));
        assert_eq!(session.viewer().user_id(), Some(user.id));

        session.set_user(Some(user));
        assert!(!rx.has_changed().unwrap());

        session.set_user(None);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), None);
    }
}
