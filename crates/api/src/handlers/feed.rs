//! Handlers for the public `/feed`.

use axum::extract::{Path, Query, State};
use axum::Json;
use snapfeed_core::pagination::{self, Pagination, DEFAULT_FEED_LIMIT, MAX_LIMIT};
use snapfeed_core::types::DbId;
use snapfeed_db::models::post::PostResponse;
use snapfeed_db::repositories::PostRepo;

use crate::error::AppResult;
use crate::handlers::posts::{found, PostPage};
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /feed?page=&limit=
///
/// Everyone's posts, newest first, with page totals.
pub async fn list_feed(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<DataResponse<PostPage>>> {
    let page = pagination::clamp_page(params.page);
    let limit = pagination::clamp_limit(params.limit, DEFAULT_FEED_LIMIT, MAX_LIMIT);
    let offset = pagination::offset_for(page, limit);

    let rows = PostRepo::list_feed(&state.pool, limit, offset).await?;
    let total = PostRepo::count(&state.pool).await?;

    Ok(Json(DataResponse {
        data: PostPage {
            posts: rows.into_iter().map(PostResponse::from).collect(),
            pagination: Pagination::new(page, limit, total),
        },
    }))
}

/// GET /feed/{id}
pub async fn get_feed_post(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PostResponse>>> {
    let post = PostRepo::find_by_id(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: found(post, id)?,
    }))
}
