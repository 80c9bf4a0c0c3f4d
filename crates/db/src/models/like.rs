//! Like toggle results.

use serde::Serialize;

/// Outcome of toggling a like: whether the caller now likes the post, and
/// the post's counter after the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggle {
    pub liked: bool,
    pub like_count: i32,
}

/// Whether the caller currently likes a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeStatus {
    pub liked: bool,
}
