use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::discussion::vote::{Scorable, VoteMap};

/// Represents the 'comments' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    /// The comment being replied to; `None` for a top-level comment.
    pub parent_id: Option<i64>,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,

    pub score: i64,
    #[sqlx(json)]
    pub votes: VoteMap,
}

impl Scorable for Comment {
    fn score(&self) -> i64 {
        self.score
    }

    fn votes(&self) -> &VoteMap {
        &self.votes
    }
}

/// Limit on comment text, in characters, checked again after sanitizing.
pub const COMMENT_CONTENT_MAX: usize = 1000;

/// DTO for creating a new comment.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Comment must be between 1 and 1000 characters"
    ))]
    pub content: String,

    /// Optional: the ID of the comment being replied to.
    pub parent_id: Option<i64>,
}
