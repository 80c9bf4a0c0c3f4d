//! Handlers for the `/posts` resource. Every route is scoped to the caller.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use snapfeed_core::error::CoreError;
use snapfeed_core::pagination::{self, Pagination, DEFAULT_POSTS_LIMIT, MAX_LIMIT};
use snapfeed_core::posts::{sniff_image, validate_content};
use snapfeed_core::types::DbId;
use snapfeed_db::models::post::{CreatePost, PostResponse, PostWithAuthor};
use snapfeed_db::repositories::PostRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::validated_json::ValidatedJson;
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `PUT /posts/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(
        max = 2000,
        message = "Content must be at most 2000 characters long"
    ))]
    pub content: String,
}

/// One page of posts with its position in the whole list.
#[derive(Debug, Serialize)]
pub struct PostPage {
    pub posts: Vec<PostResponse>,
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /posts
///
/// Multipart form with a `content` text field and an `image` file field.
/// The image is sniffed, pushed to the image host under `Posts/{user_id}`,
/// and the post stored with the returned URL.
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<PostResponse>>)> {
    let mut content = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("content") => {
                content = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?,
                );
            }
            Some("image") => {
                image = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?,
                );
            }
            _ => {}
        }
    }

    let content = content.unwrap_or_default();
    validate_content(&content)?;
    let image = image.unwrap_or_default();
    let mime = sniff_image(&image)?;

    let host = state
        .image_host
        .as_ref()
        .ok_or_else(|| AppError::InternalError("Image hosting is not configured".into()))?;
    let folder = format!("Posts/{}", user.user_id);
    let image_url = host
        .upload(&folder, image.to_vec(), mime)
        .await
        .map_err(|e| AppError::InternalError(format!("Image upload failed: {e}")))?;

    let post = PostRepo::create(
        &state.pool,
        &CreatePost {
            author_id: user.user_id,
            content,
            image_url,
        },
    )
    .await?;
    tracing::info!(post_id = post.id, user_id = user.user_id, "Post created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: post.into() }),
    ))
}

/// GET /posts?page=&limit=
///
/// The caller's posts, newest first.
pub async fn list_posts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PageParams>,
) -> AppResult<Json<DataResponse<PostPage>>> {
    let page = pagination::clamp_page(params.page);
    let limit = pagination::clamp_limit(params.limit, DEFAULT_POSTS_LIMIT, MAX_LIMIT);
    let offset = pagination::offset_for(page, limit);

    let rows = PostRepo::list_by_author(&state.pool, user.user_id, limit, offset).await?;
    let total = PostRepo::count_by_author(&state.pool, user.user_id).await?;

    Ok(Json(DataResponse {
        data: PostPage {
            posts: rows.into_iter().map(PostResponse::from).collect(),
            pagination: Pagination::new(page, limit, total),
        },
    }))
}

/// GET /posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PostResponse>>> {
    let post = PostRepo::find_owned(&state.pool, id, user.user_id).await?;
    Ok(Json(DataResponse {
        data: found(post, id)?,
    }))
}

/// PUT /posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdatePostRequest>,
) -> AppResult<Json<DataResponse<PostResponse>>> {
    validate_content(&input.content)?;
    let post = PostRepo::update_content(&state.pool, id, user.user_id, &input.content).await?;
    Ok(Json(DataResponse {
        data: found(post, id)?,
    }))
}

/// DELETE /posts/{id}
///
/// Returns the deleted post.
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PostResponse>>> {
    let post = found(PostRepo::delete_owned(&state.pool, id, user.user_id).await?, id)?;
    tracing::info!(post_id = id, user_id = user.user_id, "Post deleted");
    Ok(Json(DataResponse { data: post }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A post the caller cannot see is reported the same as a missing one.
pub(crate) fn found(row: Option<PostWithAuthor>, id: DbId) -> AppResult<PostResponse> {
    row.map(PostResponse::from)
        .ok_or_else(|| CoreError::NotFound { entity: "Post", id }.into())
}
