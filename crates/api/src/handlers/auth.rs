//! Handlers for the `/auth` resource (register, login, refresh, logout, me).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use snapfeed_db::models::user::UserResponse;
use validator::Validate;

use crate::auth::jwt::TokenPair;
use crate::auth::session::NewAccount;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::validated_json::ValidatedJson;
use crate::response::MessageResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(
        min = 3,
        max = 20,
        message = "Username must be between 3 and 20 characters long"
    ))]
    pub username: String,
    #[validate(length(
        min = 3,
        max = 50,
        message = "Display name must be between 3 and 50 characters long"
    ))]
    pub display_name: String,
    #[validate(length(
        min = 6,
        max = 20,
        message = "Password must be between 6 and 20 characters long"
    ))]
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 20,
        message = "Password must be between 6 and 20 characters long"
    ))]
    pub password: String,
}

/// Request body for `POST /auth/refresh` and `POST /auth/logout`.
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/register
///
/// Create an account and return its first token pair (201).
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<TokenPair>)> {
    let pair = state
        .sessions
        .register(NewAccount {
            email: input.email,
            username: input.username,
            display_name: input.display_name,
            password: input.password,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(pair)))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenPair>> {
    let pair = state.sessions.login(&input.email, &input.password).await?;
    Ok(Json(pair))
}

/// POST /auth/refresh
///
/// Exchange a refresh token for a new pair. The presented token is retired.
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RefreshRequest>,
) -> AppResult<Json<TokenPair>> {
    let pair = state.sessions.refresh(&input.refresh_token).await?;
    Ok(Json(pair))
}

/// POST /auth/logout
///
/// Revoke the session behind a refresh token. Succeeds for unknown tokens.
pub async fn logout(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RefreshRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.sessions.logout(&input.refresh_token).await?;
    Ok(Json(MessageResponse {
        message: "Logged out successfully",
    }))
}

/// GET /auth/me
pub async fn me(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<UserResponse>> {
    let profile = state.sessions.profile(user.user_id).await?;
    Ok(Json(profile.into()))
}
