pub mod auth;
pub mod feed;
pub mod health;
pub mod likes;
pub mod posts;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree (health is merged separately).
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                 register (public)
/// /auth/login                    login (public)
/// /auth/refresh                  refresh (public)
/// /auth/logout                   logout (public, by refresh token)
/// /auth/me                       current user (auth required)
///
/// /posts                         list own, create (auth required)
/// /posts/{id}                    get, update, delete own (auth required)
///
/// /feed                          list all (public)
/// /feed/{id}                     get any (public)
///
/// /likes/{post_id}               toggle, status (auth required)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/posts", posts::router())
        .nest("/feed", feed::router())
        .nest("/likes", likes::router())
}
