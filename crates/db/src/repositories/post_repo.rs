//! Repository for the `posts` table.
//!
//! Every read returns [`PostWithAuthor`], so each query joins `users`.
//! Writes use data-modifying CTEs to return the joined row in one round trip.

use snapfeed_core::types::DbId;
use sqlx::PgPool;

use crate::models::post::{CreatePost, PostWithAuthor};

/// Projection of a post aliased `p` joined with its author aliased `u`.
const JOINED_COLUMNS: &str = "p.id, p.author_id, p.content, p.image_url, p.like_count, \
                              p.created_at, p.updated_at, \
                              u.username AS author_username, u.display_name AS author_display_name";

/// Provides CRUD and listing for posts.
pub struct PostRepo;

impl PostRepo {
    /// Insert a new post, returning it with its author.
    pub async fn create(pool: &PgPool, input: &CreatePost) -> Result<PostWithAuthor, sqlx::Error> {
        let query = format!(
            "WITH p AS (
                INSERT INTO posts (author_id, content, image_url)
                VALUES ($1, $2, $3)
                RETURNING *
             )
             SELECT {JOINED_COLUMNS} FROM p JOIN users u ON u.id = p.author_id"
        );
        sqlx::query_as::<_, PostWithAuthor>(&query)
            .bind(input.author_id)
            .bind(&input.content)
            .bind(&input.image_url)
            .fetch_one(pool)
            .await
    }

    /// Find any post by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PostWithAuthor>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM posts p JOIN users u ON u.id = p.author_id
             WHERE p.id = $1"
        );
        sqlx::query_as::<_, PostWithAuthor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a post by ID only if `author_id` wrote it.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        author_id: DbId,
    ) -> Result<Option<PostWithAuthor>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM posts p JOIN users u ON u.id = p.author_id
             WHERE p.id = $1 AND p.author_id = $2"
        );
        sqlx::query_as::<_, PostWithAuthor>(&query)
            .bind(id)
            .bind(author_id)
            .fetch_optional(pool)
            .await
    }

    /// List one author's posts, newest first.
    pub async fn list_by_author(
        pool: &PgPool,
        author_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostWithAuthor>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM posts p JOIN users u ON u.id = p.author_id
             WHERE p.author_id = $1
             ORDER BY p.created_at DESC, p.id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, PostWithAuthor>(&query)
            .bind(author_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List all posts, newest first.
    pub async fn list_feed(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostWithAuthor>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM posts p JOIN users u ON u.id = p.author_id
             ORDER BY p.created_at DESC, p.id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, PostWithAuthor>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of posts.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Number of posts written by `author_id`.
    pub async fn count_by_author(pool: &PgPool, author_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Replace the content of a post owned by `author_id`.
    ///
    /// Returns `None` if the post does not exist or belongs to someone else.
    pub async fn update_content(
        pool: &PgPool,
        id: DbId,
        author_id: DbId,
        content: &str,
    ) -> Result<Option<PostWithAuthor>, sqlx::Error> {
        let query = format!(
            "WITH p AS (
                UPDATE posts SET content = $3, updated_at = NOW()
                WHERE id = $1 AND author_id = $2
                RETURNING *
             )
             SELECT {JOINED_COLUMNS} FROM p JOIN users u ON u.id = p.author_id"
        );
        sqlx::query_as::<_, PostWithAuthor>(&query)
            .bind(id)
            .bind(author_id)
            .bind(content)
            .fetch_optional(pool)
            .await
    }

    /// Delete a post owned by `author_id`, returning the removed row.
    pub async fn delete_owned(
        pool: &PgPool,
        id: DbId,
        author_id: DbId,
    ) -> Result<Option<PostWithAuthor>, sqlx::Error> {
        let query = format!(
            "WITH p AS (
                DELETE FROM posts
                WHERE id = $1 AND author_id = $2
                RETURNING *
             )
             SELECT {JOINED_COLUMNS} FROM p JOIN users u ON u.id = p.author_id"
        );
        sqlx::query_as::<_, PostWithAuthor>(&query)
            .bind(id)
            .bind(author_id)
            .fetch_optional(pool)
            .await
    }
}
