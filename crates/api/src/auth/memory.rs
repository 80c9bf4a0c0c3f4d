//! In-memory credential and session store.
//!
//! Enforces the same uniqueness and compare-and-swap rules as the Postgres
//! tables, so the session core and the HTTP layer can be exercised without a
//! database.

use async_trait::async_trait;
use chrono::Utc;
use snapfeed_core::auth::{EMAIL_TAKEN, USERNAME_TAKEN};
use snapfeed_core::error::CoreError;
use snapfeed_core::types::{DbId, Timestamp};
use snapfeed_db::models::session::UserSession;
use snapfeed_db::models::user::{CreateUser, User};
use tokio::sync::Mutex;

use super::store::{CredentialStore, SessionStore, DUPLICATE_SESSION};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    /// Sessions paired with the plaintext token they currently hold.
    sessions: Vec<(String, UserSession)>,
    next_user_id: DbId,
    next_session_id: DbId,
}

/// Implements both [`CredentialStore`] and [`SessionStore`].
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live session rows.
    pub async fn session_count(&self) -> usize {
        self.tables.lock().await.sessions.len()
    }

    /// Move the expiry of the session holding `token`. Returns whether one did.
    pub async fn set_expiry(&self, token: &str, expires_at: Timestamp) -> bool {
        let mut tables = self.tables.lock().await;
        match tables.sessions.iter_mut().find(|(t, _)| t == token) {
            Some((_, session)) => {
                session.expires_at = expires_at;
                true
            }
            None => false,
        }
    }

    /// Drop a user and, as the foreign key cascade would, their sessions.
    pub async fn remove_user(&self, id: DbId) {
        let mut tables = self.tables.lock().await;
        tables.users.retain(|u| u.id != id);
        tables.sessions.retain(|(_, s)| s.user_id != id);
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_user(&self, input: CreateUser) -> Result<User, CoreError> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.email == input.email) {
            return Err(CoreError::Conflict(EMAIL_TAKEN.into()));
        }
        if tables.users.iter().any(|u| u.username == input.username) {
            return Err(CoreError::Conflict(USERNAME_TAKEN.into()));
        }

        tables.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: tables.next_user_id,
            email: input.email,
            username: input.username,
            display_name: input.display_name,
            password_hash: input.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, CoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, CoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create(
        &self,
        user_id: DbId,
        refresh_token: &str,
        expires_at: Timestamp,
    ) -> Result<UserSession, CoreError> {
        let mut tables = self.tables.lock().await;
        if tables.sessions.iter().any(|(t, _)| t == refresh_token) {
            return Err(CoreError::Conflict(DUPLICATE_SESSION.into()));
        }

        tables.next_session_id += 1;
        let now = Utc::now();
        let session = UserSession {
            id: tables.next_session_id,
            user_id,
            refresh_token_hash: refresh_token.to_string(),
            expires_at,
            created_at: now,
            updated_at: now,
        };
        tables
            .sessions
            .push((refresh_token.to_string(), session.clone()));
        Ok(session)
    }

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<UserSession>, CoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .sessions
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, s)| s.clone()))
    }

    async fn rotate(
        &self,
        id: DbId,
        current_token: &str,
        new_token: &str,
        new_expires_at: Timestamp,
    ) -> Result<Option<UserSession>, CoreError> {
        let mut tables = self.tables.lock().await;
        if tables.sessions.iter().any(|(t, _)| t == new_token) {
            return Err(CoreError::Conflict(DUPLICATE_SESSION.into()));
        }
        let Some((token, session)) = tables
            .sessions
            .iter_mut()
            .find(|(t, s)| s.id == id && t == current_token)
        else {
            return Ok(None);
        };

        *token = new_token.to_string();
        session.refresh_token_hash = new_token.to_string();
        session.expires_at = new_expires_at;
        session.updated_at = Utc::now();
        Ok(Some(session.clone()))
    }

    async fn revoke_by_token(&self, token: &str) -> Result<u64, CoreError> {
        let mut tables = self.tables.lock().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|(t, _)| t != token);
        Ok((before - tables.sessions.len()) as u64)
    }
}
