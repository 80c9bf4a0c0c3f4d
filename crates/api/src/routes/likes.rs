//! Route definitions for `/likes`.

use axum::routing::get;
use axum::Router;

use crate::handlers::likes;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{post_id}",
        get(likes::like_status).post(likes::toggle_like),
    )
}
