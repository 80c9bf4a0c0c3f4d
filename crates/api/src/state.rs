use std::sync::Arc;

use crate::auth::session::SessionManager;
use crate::config::ServerConfig;
use crate::media::ImageHost;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind an `Arc` or is already a handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (posts, feed, likes, health).
    pub pool: snapfeed_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Session lifecycle and the access guard.
    pub sessions: Arc<SessionManager>,
    /// Where post images go; `None` when no host is configured.
    pub image_host: Option<Arc<dyn ImageHost>>,
}
