//! Session lifecycle: register, login, refresh, logout, and access checks.
//!
//! [`SessionManager`] composes the [`TokenIssuer`] with the credential and
//! session stores. Login and refresh failures are collapsed into one fixed
//! message each; the actual reason is only logged at debug level.

use std::sync::Arc;

use chrono::Utc;
use snapfeed_core::auth::{
    EMAIL_TAKEN, INVALID_CREDENTIALS, INVALID_REFRESH_TOKEN, UNAUTHORIZED, USERNAME_TAKEN,
};
use snapfeed_core::error::CoreError;
use snapfeed_core::types::DbId;
use snapfeed_db::models::user::{CreateUser, User};

use super::jwt::{TokenIssuer, TokenKind, TokenPair, TokenPayload};
use super::password::{hash_password, verify_password};
use super::store::{CredentialStore, SessionStore};
use crate::middleware::auth::AuthUser;

/// Input for [`SessionManager::register`]. Already shape-validated.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub password: String,
}

pub struct SessionManager {
    issuer: TokenIssuer,
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
}

impl SessionManager {
    pub fn new(
        issuer: TokenIssuer,
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            issuer,
            credentials,
            sessions,
        }
    }

    /// Create an account and open its first session.
    ///
    /// The user insert and the session insert are separate writes. If the
    /// second fails the account still exists and the client can log in.
    pub async fn register(&self, account: NewAccount) -> Result<TokenPair, CoreError> {
        if self
            .credentials
            .find_by_email(&account.email)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(EMAIL_TAKEN.into()));
        }
        if self
            .credentials
            .find_by_username(&account.username)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(USERNAME_TAKEN.into()));
        }

        let password_hash = hash_password(&account.password)?;
        let user = self
            .credentials
            .create_user(CreateUser {
                email: account.email,
                username: account.username,
                display_name: account.display_name,
                password_hash,
            })
            .await?;
        tracing::info!(user_id = user.id, username = %user.username, "User registered");

        self.open_session(&user).await
    }

    /// Exchange email and password for a new session.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, CoreError> {
        let Some(user) = self.credentials.find_by_email(email).await? else {
            tracing::debug!("Login rejected: unknown email");
            return Err(CoreError::unauthorized(INVALID_CREDENTIALS));
        };
        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "Login rejected: wrong password");
            return Err(CoreError::unauthorized(INVALID_CREDENTIALS));
        }

        let pair = self.open_session(&user).await?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok(pair)
    }

    /// Trade a refresh token for a new pair, rotating its session in place.
    ///
    /// The rotation only lands if the session still holds the presented
    /// token, so of two concurrent refreshes with one token exactly one
    /// succeeds.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, CoreError> {
        let claims = match self.issuer.verify(refresh_token, TokenKind::Refresh) {
            Ok(claims) => claims,
            Err(e) => return Err(refresh_rejected(&e.to_string())),
        };

        let Some(session) = self.sessions.find_by_refresh_token(refresh_token).await? else {
            return Err(refresh_rejected("no session holds this token"));
        };
        let now = Utc::now();
        if session.is_expired_at(now) {
            return Err(refresh_rejected("session expired"));
        }
        if session.user_id != claims.sub {
            return Err(refresh_rejected("session belongs to another user"));
        }
        let Some(user) = self.credentials.find_by_id(session.user_id).await? else {
            return Err(refresh_rejected("user no longer exists"));
        };

        let pair = self.issuer.issue_at(&payload_for(&user), now)?;
        let rotated = self
            .sessions
            .rotate(
                session.id,
                refresh_token,
                &pair.refresh_token,
                now + self.issuer.refresh_ttl(),
            )
            .await?;
        if rotated.is_none() {
            return Err(refresh_rejected("session rotated or revoked concurrently"));
        }

        tracing::debug!(user_id = user.id, session_id = session.id, "Session rotated");
        Ok(pair)
    }

    /// Revoke the session holding `refresh_token`.
    ///
    /// The token is not verified and an unknown token is not an error, so
    /// logging out twice succeeds twice.
    pub async fn logout(&self, refresh_token: &str) -> Result<u64, CoreError> {
        let removed = self.sessions.revoke_by_token(refresh_token).await?;
        tracing::debug!(removed, "Logout");
        Ok(removed)
    }

    /// Resolve an access token to the identity it carries.
    ///
    /// Signature and expiry only; no store is consulted.
    pub fn authenticate(&self, access_token: &str) -> Result<AuthUser, CoreError> {
        let claims = self
            .issuer
            .verify(access_token, TokenKind::Access)
            .map_err(|e| {
                tracing::debug!(reason = %e, "Access token rejected");
                CoreError::unauthorized(UNAUTHORIZED)
            })?;
        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            username: claims.username,
        })
    }

    /// Current record of an authenticated user.
    pub async fn profile(&self, user_id: DbId) -> Result<User, CoreError> {
        self.credentials
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| CoreError::unauthorized(UNAUTHORIZED))
    }

    async fn open_session(&self, user: &User) -> Result<TokenPair, CoreError> {
        let now = Utc::now();
        let pair = self.issuer.issue_at(&payload_for(user), now)?;
        self.sessions
            .create(user.id, &pair.refresh_token, now + self.issuer.refresh_ttl())
            .await?;
        Ok(pair)
    }
}

fn payload_for(user: &User) -> TokenPayload {
    TokenPayload {
        id: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
    }
}

fn refresh_rejected(reason: &str) -> CoreError {
    tracing::debug!(reason, "Refresh rejected");
    CoreError::unauthorized(INVALID_REFRESH_TOKEN)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Duration;

    use super::*;
    use crate::auth::jwt::tests::test_config;
    use crate::auth::memory::MemoryStore;

    fn manager() -> (SessionManager, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let issuer = TokenIssuer::new(&test_config()).unwrap();
        let manager = SessionManager::new(issuer, store.clone(), store.clone());
        (manager, store)
    }

    fn alice() -> NewAccount {
        NewAccount {
            email: "a@x.io".into(),
            username: "alice".into(),
            display_name: "Alice".into(),
            password: "secret1".into(),
        }
    }

    fn assert_unauthorized(result: Result<TokenPair, CoreError>, expected: &str) {
        assert_matches!(result, Err(CoreError::Unauthorized(msg)) if msg == expected);
    }

    #[tokio::test]
    async fn register_opens_a_session_and_stores_a_hash() {
        let (manager, store) = manager();
        let pair = manager.register(alice()).await.unwrap();

        let who = manager.authenticate(&pair.access_token).unwrap();
        assert_eq!(who.username, "alice");
        assert_eq!(who.email, "a@x.io");
        assert_eq!(store.session_count().await, 1);

        let user = manager.profile(who.user_id).await.unwrap();
        assert!(user.password_hash.starts_with("$argon2id$"));
        assert_eq!(user.display_name, "Alice");
    }

    #[tokio::test]
    async fn duplicate_email_then_username_conflict() {
        let (manager, _) = manager();
        manager.register(alice()).await.unwrap();

        let mut same_email = alice();
        same_email.username = "alice2".into();
        assert_matches!(
            manager.register(same_email).await,
            Err(CoreError::Conflict(msg)) if msg == EMAIL_TAKEN
        );

        let mut same_name = alice();
        same_name.email = "other@x.io".into();
        assert_matches!(
            manager.register(same_name).await,
            Err(CoreError::Conflict(msg)) if msg == USERNAME_TAKEN
        );
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_identical() {
        let (manager, _) = manager();
        manager.register(alice()).await.unwrap();

        assert_unauthorized(manager.login("a@x.io", "wrong1").await, INVALID_CREDENTIALS);
        assert_unauthorized(manager.login("nobody@x.io", "secret1").await, INVALID_CREDENTIALS);
        assert!(manager.login("a@x.io", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn refresh_rotates_and_retires_the_old_token() {
        let (manager, store) = manager();
        let first = manager.register(alice()).await.unwrap();

        let second = manager.refresh(&first.refresh_token).await.unwrap();
        assert_ne!(second.refresh_token, first.refresh_token);
        assert_eq!(store.session_count().await, 1);

        assert_unauthorized(manager.refresh(&first.refresh_token).await, INVALID_REFRESH_TOKEN);
        assert!(manager.refresh(&second.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn concurrent_refreshes_of_one_token_have_one_winner() {
        let (manager, store) = manager();
        let pair = manager.register(alice()).await.unwrap();

        let (a, b) = tokio::join!(
            manager.refresh(&pair.refresh_token),
            manager.refresh(&pair.refresh_token)
        );
        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn logout_is_idempotent_and_ends_refresh() {
        let (manager, _) = manager();
        let pair = manager.register(alice()).await.unwrap();

        assert_eq!(manager.logout(&pair.refresh_token).await.unwrap(), 1);
        assert_eq!(manager.logout(&pair.refresh_token).await.unwrap(), 0);
        assert_eq!(manager.logout("never-issued").await.unwrap(), 0);
        assert_unauthorized(manager.refresh(&pair.refresh_token).await, INVALID_REFRESH_TOKEN);
    }

    #[tokio::test]
    async fn expired_session_is_rejected_even_with_a_valid_token() {
        let (manager, store) = manager();
        let pair = manager.register(alice()).await.unwrap();
        assert!(
            store
                .set_expiry(&pair.refresh_token, Utc::now() - Duration::seconds(1))
                .await
        );

        assert_unauthorized(manager.refresh(&pair.refresh_token).await, INVALID_REFRESH_TOKEN);
    }

    #[tokio::test]
    async fn refresh_for_a_deleted_user_is_rejected() {
        let (manager, store) = manager();
        let pair = manager.register(alice()).await.unwrap();
        let who = manager.authenticate(&pair.access_token).unwrap();
        store.remove_user(who.user_id).await;

        assert_unauthorized(manager.refresh(&pair.refresh_token).await, INVALID_REFRESH_TOKEN);
    }

    #[tokio::test]
    async fn access_token_is_not_a_refresh_token() {
        let (manager, _) = manager();
        let pair = manager.register(alice()).await.unwrap();

        assert_unauthorized(manager.refresh(&pair.access_token).await, INVALID_REFRESH_TOKEN);
        assert_matches!(
            manager.authenticate(&pair.refresh_token),
            Err(CoreError::Unauthorized(msg)) if msg == UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn alice_end_to_end() {
        let (manager, _) = manager();
        let registered = manager.register(alice()).await.unwrap();
        let logged_in = manager.login("a@x.io", "secret1").await.unwrap();
        assert_ne!(registered.refresh_token, logged_in.refresh_token);

        let refreshed = manager.refresh(&logged_in.refresh_token).await.unwrap();
        let who = manager.authenticate(&refreshed.access_token).unwrap();
        assert_eq!(who.username, "alice");

        manager.logout(&refreshed.refresh_token).await.unwrap();
        assert!(manager.refresh(&refreshed.refresh_token).await.is_err());
        // The session opened at registration is independent and still live.
        assert!(manager.refresh(&registered.refresh_token).await.is_ok());
    }
}
