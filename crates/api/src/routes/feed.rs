//! Route definitions for the public `/feed`.

use axum::routing::get;
use axum::Router;

use crate::handlers::feed;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(feed::list_feed))
        .route("/{id}", get(feed::get_feed_post))
}
