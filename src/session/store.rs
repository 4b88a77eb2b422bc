use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

use super::types::SessionResponse;

/// Lightweight record of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}

/// Client-side holder of the session token and user record
///
/// Only channel authorization reads from it. How the token got here is the
/// business of whatever login flow the client runs.
pub trait CredentialStore: Send + Sync {
    fn session_token(&self) -> Option<String>;

    fn user(&self) -> Option<UserRecord>;
}

#[derive(Default)]
struct Credentials {
    token: Option<String>,
    user: Option<UserRecord>,
}

/// Process-local [`CredentialStore`]
#[derive(Default)]
pub struct InMemoryCredentialStore {
    credentials: RwLock<Credentials>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store built from a relay session response
    pub fn from_session(session: &SessionResponse) -> Self {
        let store = Self::new();
        store.set(
            session.session_id.clone(),
            UserRecord {
                id: session.player_id.clone(),
                name: session.username.clone(),
                email: None,
            },
        );
        store
    }

    pub fn set(&self, token: String, user: UserRecord) {
        let mut credentials = self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        credentials.token = Some(token);
        credentials.user = Some(user);
    }

    pub fn clear(&self) {
        let mut credentials = self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *credentials = Credentials::default();
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn session_token(&self) -> Option<String> {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    fn user(&self) -> Option<UserRecord> {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }
}
