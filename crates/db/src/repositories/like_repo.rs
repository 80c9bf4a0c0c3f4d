//! Repository for the `likes` table and the `posts.like_count` counter.

use snapfeed_core::types::DbId;
use sqlx::PgPool;

use crate::models::like::LikeToggle;

/// Provides like toggling and lookup.
pub struct LikeRepo;

impl LikeRepo {
    /// Whether `user_id` currently likes `post_id`.
    pub async fn exists(pool: &PgPool, user_id: DbId, post_id: DbId) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE user_id = $1 AND post_id = $2)",
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Add the like if absent, remove it if present, and adjust the counter.
    ///
    /// Runs in one transaction holding the post row lock, so the like row and
    /// `like_count` never diverge. Returns `None` if the post does not exist.
    pub async fn toggle(
        pool: &PgPool,
        user_id: DbId,
        post_id: DbId,
    ) -> Result<Option<LikeToggle>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let removed = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        let delta = if removed {
            -1
        } else {
            sqlx::query("INSERT INTO likes (user_id, post_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(post_id)
                .execute(&mut *tx)
                .await?;
            1
        };

        let (like_count,): (i32,) = sqlx::query_as(
            "UPDATE posts SET like_count = like_count + $2 WHERE id = $1 RETURNING like_count",
        )
        .bind(post_id)
        .bind(delta)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(LikeToggle {
            liked: !removed,
            like_count,
        }))
    }
}
