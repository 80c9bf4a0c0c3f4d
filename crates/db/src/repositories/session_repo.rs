//! Repository for the `user_sessions` table.

use snapfeed_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::session::{CreateSession, UserSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, refresh_token_hash, expires_at, created_at, updated_at";

/// Unique constraint on `user_sessions.refresh_token_hash`.
pub const UQ_USER_SESSIONS_REFRESH_TOKEN_HASH: &str = "uq_user_sessions_refresh_token_hash";

/// Provides create / lookup / rotate / revoke for refresh-token sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    ///
    /// Never overwrites: a duplicate hash fails with a unique violation on
    /// [`UQ_USER_SESSIONS_REFRESH_TOKEN_HASH`].
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a session by its refresh token hash.
    ///
    /// Expired rows are returned too; the caller checks `expires_at`.
    pub async fn find_by_refresh_token_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_sessions WHERE refresh_token_hash = $1");
        sqlx::query_as::<_, UserSession>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Replace a session's token hash and expiry in place.
    ///
    /// The update only applies while the row still holds `current_hash`, so of
    /// two concurrent rotations exactly one matches. Returns `None` when the
    /// row was already rotated, revoked, or never existed.
    pub async fn rotate(
        pool: &PgPool,
        id: DbId,
        current_hash: &str,
        new_hash: &str,
        new_expires_at: Timestamp,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "UPDATE user_sessions SET
                refresh_token_hash = $3,
                expires_at = $4,
                updated_at = NOW()
             WHERE id = $1 AND refresh_token_hash = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(id)
            .bind(current_hash)
            .bind(new_hash)
            .bind(new_expires_at)
            .fetch_optional(pool)
            .await
    }

    /// Delete every session holding `hash`. Returns the number of rows removed.
    pub async fn delete_by_refresh_token_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE refresh_token_hash = $1")
            .bind(hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
