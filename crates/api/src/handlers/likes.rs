//! Handlers for `/likes/{post_id}`.

use axum::extract::{Path, State};
use axum::Json;
use snapfeed_core::error::CoreError;
use snapfeed_core::types::DbId;
use snapfeed_db::models::like::{LikeStatus, LikeToggle};
use snapfeed_db::repositories::LikeRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /likes/{post_id}
///
/// Like the post if the caller has not, unlike it if they have.
pub async fn toggle_like(
    State(state): State<AppState>,
    user: AuthUser,
    Path(post_id): Path<DbId>,
) -> AppResult<Json<DataResponse<LikeToggle>>> {
    let toggled = LikeRepo::toggle(&state.pool, user.user_id, post_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Post",
            id: post_id,
        })?;
    tracing::debug!(post_id, user_id = user.user_id, liked = toggled.liked, "Like toggled");
    Ok(Json(DataResponse { data: toggled }))
}

/// GET /likes/{post_id}
pub async fn like_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(post_id): Path<DbId>,
) -> AppResult<Json<DataResponse<LikeStatus>>> {
    let liked = LikeRepo::exists(&state.pool, user.user_id, post_id).await?;
    Ok(Json(DataResponse {
        data: LikeStatus { liked },
    }))
}
