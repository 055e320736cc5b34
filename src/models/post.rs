use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A community feed post joined with the viewer's interaction flags.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct FeedPost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,

    pub likes_count: i32,
    pub bookmarks_count: i32,

    /// Viewer flags. Always false for anonymous viewers.
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub is_bookmarked: bool,
    #[serde(default)]
    pub follows_author: bool,
}

/// Query parameters for listing posts.
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct PostListParams {
    /// Cursor for pagination: the created_at timestamp of the last post in the previous page.
    pub cursor: Option<chrono::DateTime<chrono::Utc>>,

    /// Number of items to return (default: 20, max: 100).
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

/// Which per-post toggle a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Like,
    Bookmark,
}

/// Authoritative state of a reaction after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionState {
    pub post_id: Uuid,
    pub kind: ReactionKind,
    pub active: bool,
    pub count: i32,
}

/// Authoritative follow state after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowState {
    pub user_id: Uuid,
    pub following: bool,
}
