use std::sync::Arc;

use models::session::{Session, User};
use tracing::{debug, warn};

use crate::errors::ServiceError;
use crate::storage::{keys, write_json, LocalStore};

/// Token and user kept in local storage under two independent keys.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn LocalStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    pub async fn persist(&self, session: &Session) -> Result<(), ServiceError> {
        self.store.set_item(keys::TOKEN, session.token.clone()).await?;
        write_json(&*self.store, keys::USER, &session.user).await?;
        debug!(event = "session_persisted", user_id = %session.user.id);
        Ok(())
    }

    /// Bearer token, when one is stored and non-empty.
    pub async fn token(&self) -> Option<String> {
        self.store.get_item(keys::TOKEN).await.filter(|t| !t.is_empty())
    }

    /// Stored user. A corrupt blob reads as absent.
    pub async fn user(&self) -> Option<User> {
        let raw = self.store.get_item(keys::USER).await?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(key = keys::USER, error = %e, "ignoring unreadable stored user");
                None
            }
        }
    }

    pub async fn current(&self) -> Option<Session> {
        let token = self.token().await?;
        let user = self.user().await?;
        Some(Session { token, user })
    }

    pub async fn clear(&self) -> Result<(), ServiceError> {
        self.store.remove_item(keys::TOKEN).await?;
        self.store.remove_item(keys::USER).await?;
        debug!(event = "session_cleared");
        Ok(())
    }
}
