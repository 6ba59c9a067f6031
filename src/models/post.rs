use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::discussion::vote::{Scorable, VoteMap};

/// Represents the 'posts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub content: String,
    /// Free-form topic label, e.g. "interview" or "salary".
    pub tag: String,
    pub created_at: chrono::DateTime<chrono::Utc>,

    pub score: i64,
    #[sqlx(json)]
    pub votes: VoteMap,
    pub comment_count: i64,
}

impl Scorable for Post {
    fn score(&self) -> i64 {
        self.score
    }

    fn votes(&self) -> &VoteMap {
        &self.votes
    }
}

/// Limits on post text, in characters, checked again after sanitizing.
pub const POST_CONTENT_MAX: usize = 10000;
pub const POST_TAG_MAX: usize = 50;

/// DTO for creating a new post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(
        min = 1,
        max = 10000,
        message = "Content length must be between 1 and 10000 chars"
    ))]
    pub content: String,

    #[validate(length(min = 1, max = 50, message = "Tag length must be between 1 and 50 chars"))]
    pub tag: String,
}

/// Post ordering for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    /// Newest first.
    #[default]
    New,
    /// Highest score first.
    Top,
}

/// Query parameters for listing posts.
#[derive(Debug, Deserialize)]
pub struct PostListParams {
    /// Sort order: 'new' (default) or 'top'.
    pub sort: Option<SortOption>,
}
