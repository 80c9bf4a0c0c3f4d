//! Post entity model, the joined author view, and DTOs.

use serde::Serialize;
use snapfeed_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A post row joined with its author's public fields.
#[derive(Debug, Clone, FromRow)]
pub struct PostWithAuthor {
    pub id: DbId,
    pub author_id: DbId,
    pub content: String,
    pub image_url: String,
    pub like_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub author_username: String,
    pub author_display_name: String,
}

/// Public author summary embedded in every post response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: DbId,
    pub username: String,
    pub display_name: String,
}

/// Post as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: DbId,
    pub author_id: DbId,
    pub content: String,
    pub image_url: String,
    pub like_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub author: AuthorSummary,
}

impl From<PostWithAuthor> for PostResponse {
    fn from(row: PostWithAuthor) -> Self {
        Self {
            id: row.id,
            author_id: row.author_id,
            content: row.content,
            image_url: row.image_url,
            like_count: row.like_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
            author: AuthorSummary {
                id: row.author_id,
                username: row.author_username,
                display_name: row.author_display_name,
            },
        }
    }
}

/// DTO for creating a new post. The image has already been uploaded.
#[derive(Debug, Clone)]
pub struct CreatePost {
    pub author_id: DbId,
    pub content: String,
    pub image_url: String,
}
