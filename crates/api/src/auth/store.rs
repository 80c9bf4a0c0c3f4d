//! Persistence seams for the session core.
//!
//! [`SessionManager`](super::session::SessionManager) only talks to these
//! traits. The Postgres implementations wrap the repositories in
//! `snapfeed_db`; [`MemoryStore`](super::memory::MemoryStore) backs tests.
//! Stores receive refresh tokens in plaintext and decide themselves how to
//! key them; the Postgres store keeps only their SHA-256 hash.

use async_trait::async_trait;
use snapfeed_core::auth::{EMAIL_TAKEN, USERNAME_TAKEN};
use snapfeed_core::error::CoreError;
use snapfeed_core::types::{DbId, Timestamp};
use snapfeed_db::models::session::{CreateSession, UserSession};
use snapfeed_db::models::user::{CreateUser, User};
use snapfeed_db::repositories::session_repo::UQ_USER_SESSIONS_REFRESH_TOKEN_HASH;
use snapfeed_db::repositories::user_repo::{UQ_USERS_EMAIL, UQ_USERS_USERNAME};
use snapfeed_db::repositories::{SessionRepo, UserRepo};
use snapfeed_db::{is_unique_violation, DbPool};

use super::jwt::hash_refresh_token;

/// Message for a refresh token that collides with a live session.
pub const DUPLICATE_SESSION: &str = "Session already exists for this token";

/// User records, keyed by id, email, and username.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a user. A taken email or username is a `Conflict`.
    async fn create_user(&self, input: CreateUser) -> Result<User, CoreError>;
    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, CoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CoreError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, CoreError>;
}

/// Refresh-token sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Record a new session. Never overwrites: a duplicate token is a
    /// `Conflict`.
    async fn create(
        &self,
        user_id: DbId,
        refresh_token: &str,
        expires_at: Timestamp,
    ) -> Result<UserSession, CoreError>;

    /// Look a session up by token. Expired rows are returned as-is.
    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<UserSession>, CoreError>;

    /// Swap `current_token` for `new_token` on session `id`, keeping its id and
    /// owner. `None` when the session no longer holds `current_token`.
    async fn rotate(
        &self,
        id: DbId,
        current_token: &str,
        new_token: &str,
        new_expires_at: Timestamp,
    ) -> Result<Option<UserSession>, CoreError>;

    /// Delete every session holding `token`, returning how many went.
    async fn revoke_by_token(&self, token: &str) -> Result<u64, CoreError>;
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

/// [`CredentialStore`] over the `users` table.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: DbPool,
}

impl PgCredentialStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn create_user(&self, input: CreateUser) -> Result<User, CoreError> {
        UserRepo::create(&self.pool, &input).await.map_err(|e| {
            if is_unique_violation(&e, UQ_USERS_EMAIL) {
                CoreError::Conflict(EMAIL_TAKEN.into())
            } else if is_unique_violation(&e, UQ_USERS_USERNAME) {
                CoreError::Conflict(USERNAME_TAKEN.into())
            } else {
                storage_error(e)
            }
        })
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, CoreError> {
        UserRepo::find_by_id(&self.pool, id).await.map_err(storage_error)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CoreError> {
        UserRepo::find_by_email(&self.pool, email)
            .await
            .map_err(storage_error)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, CoreError> {
        UserRepo::find_by_username(&self.pool, username)
            .await
            .map_err(storage_error)
    }
}

/// [`SessionStore`] over the `user_sessions` table, keyed by token hash.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(
        &self,
        user_id: DbId,
        refresh_token: &str,
        expires_at: Timestamp,
    ) -> Result<UserSession, CoreError> {
        let input = CreateSession {
            user_id,
            refresh_token_hash: hash_refresh_token(refresh_token),
            expires_at,
        };
        SessionRepo::create(&self.pool, &input)
            .await
            .map_err(session_write_error)
    }

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<UserSession>, CoreError> {
        SessionRepo::find_by_refresh_token_hash(&self.pool, &hash_refresh_token(token))
            .await
            .map_err(storage_error)
    }

    async fn rotate(
        &self,
        id: DbId,
        current_token: &str,
        new_token: &str,
        new_expires_at: Timestamp,
    ) -> Result<Option<UserSession>, CoreError> {
        SessionRepo::rotate(
            &self.pool,
            id,
            &hash_refresh_token(current_token),
            &hash_refresh_token(new_token),
            new_expires_at,
        )
        .await
        .map_err(session_write_error)
    }

    async fn revoke_by_token(&self, token: &str) -> Result<u64, CoreError> {
        SessionRepo::delete_by_refresh_token_hash(&self.pool, &hash_refresh_token(token))
            .await
            .map_err(storage_error)
    }
}

/// A write that lands on a token hash another session already holds.
fn session_write_error(err: sqlx::Error) -> CoreError {
    if is_unique_violation(&err, UQ_USER_SESSIONS_REFRESH_TOKEN_HASH) {
        CoreError::Conflict(DUPLICATE_SESSION.into())
    } else {
        storage_error(err)
    }
}

fn storage_error(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Credential/session store failure");
    CoreError::Storage(err.to_string())
}
