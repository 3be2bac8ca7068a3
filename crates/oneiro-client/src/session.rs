use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<SessionUser>,
}

impl AuthState {
    pub fn token(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.token.as_str())
    }
}

/// Shared authentication context. Clones observe the same state; only
/// `sign_in` and `sign_out` change it.
#[derive(Debug, Clone)]
pub struct Session {
    tx: Arc<watch::Sender<AuthState>>,
}

impl Session {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> AuthState {
        self.tx.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().token().map(str::to_string)
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.tx.subscribe()
    }

    pub fn sign_in(&self, user: SessionUser) {
        info!(user_id = %user.id, username = %user.username, "Signed in");
        self.tx.send_replace(AuthState { user: Some(user) });
    }

    pub fn sign_out(&self) {
        if self.tx.send_replace(AuthState::default()).user.is_some() {
            info!("Signed out");
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            username: "luz".into(),
            token: "jwt".into(),
        }
    }

    #[test]
    fn clones_share_state() {
        let session = Session::new();
        let other = session.clone();
        assert!(other.current().user.is_none());

        session.sign_in(user());
        assert_eq!(other.token().as_deref(), Some("jwt"));

        other.sign_out();
        assert_eq!(session.current(), AuthState::default());
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let session = Session::new();
        let mut rx = session.subscribe();

        session.sign_in(user());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().token(), Some("jwt"));
    }
}
