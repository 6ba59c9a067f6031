// src/store/mod.rs

use std::fmt;

use async_trait::async_trait;

use crate::{
    discussion::vote::{Tally, VoteAction},
    models::{
        comment::Comment,
        post::{Post, SortOption},
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// The item a vote is cast on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTarget {
    Post(i64),
    Comment(i64),
}

impl fmt::Display for VoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteTarget::Post(id) => write!(f, "Post {}", id),
            VoteTarget::Comment(id) => write!(f, "Comment {}", id),
        }
    }
}

/// Errors raised at the store boundary.
#[derive(Debug)]
pub enum StoreError {
    /// The referenced post or comment does not exist.
    ItemNotFound(String),

    /// The parent comment is nested too deeply to accept replies.
    ReplyTooDeep(i64),

    Database(sqlx::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::ItemNotFound(what) => write!(f, "{} not found", what),
            StoreError::ReplyTooDeep(id) => {
                write!(f, "Comment {} is nested too deeply to reply to", id)
            }
            StoreError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

/// Persistence for posts, comments and their votes.
///
/// Ids and timestamps are assigned by the store. Every method is a single unit
/// of work; `apply_vote` in particular must read, tally and write atomically so
/// concurrent voters on one item cannot lose each other's votes.
#[async_trait]
pub trait DiscussionStore: Send + Sync {
    async fn create_post(&self, content: String, tag: String) -> Result<i64, StoreError>;

    async fn list_posts(&self, sort: SortOption) -> Result<Vec<Post>, StoreError>;

    async fn get_post(&self, id: i64) -> Result<Post, StoreError>;

    /// Adds a comment (or a reply when `parent_id` is set) and bumps the post's
    /// comment count. The parent must belong to the same post and sit above
    /// `max_reply_depth` (roots are depth 0).
    async fn create_comment(
        &self,
        post_id: i64,
        parent_id: Option<i64>,
        content: String,
        max_reply_depth: usize,
    ) -> Result<i64, StoreError>;

    /// All comments of a post, newest first.
    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, StoreError>;

    async fn apply_vote(
        &self,
        target: VoteTarget,
        user_id: &str,
        action: VoteAction,
    ) -> Result<Tally, StoreError>;
}
