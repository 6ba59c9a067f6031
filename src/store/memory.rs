// src/store/memory.rs

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DiscussionStore, StoreError, VoteTarget};
use crate::{
    discussion::vote::{Scorable, Tally, VoteAction, VoteMap, tally_vote},
    models::{
        comment::Comment,
        post::{Post, SortOption},
    },
};

#[derive(Default)]
struct Inner {
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    /// Nesting depth of each comment, 0 for roots.
    depths: HashMap<i64, usize>,
    last_post_id: i64,
    last_comment_id: i64,
}

/// Process-local `DiscussionStore`. Used when no database is configured, and in tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Resolves `action` against the user's current vote on `item` and tallies it.
fn record_vote<S: Scorable>(item: &S, user_id: &str, action: VoteAction) -> Tally {
    let vote = action.resolve(item.vote_of(user_id));
    tally_vote(item, user_id, vote)
}

#[async_trait]
impl DiscussionStore for MemoryStore {
    async fn create_post(&self, content: String, tag: String) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().await;
        inner.last_post_id += 1;
        let id = inner.last_post_id;

        inner.posts.insert(
            id,
            Post {
                id,
                content,
                tag,
                created_at: chrono::Utc::now(),
                score: 0,
                votes: VoteMap::new(),
                comment_count: 0,
            },
        );

        Ok(id)
    }

    async fn list_posts(&self, sort: SortOption) -> Result<Vec<Post>, StoreError> {
        let inner = self.inner.read().await;
        let mut posts: Vec<Post> = inner.posts.values().cloned().collect();

        let newest_first = |a: &Post, b: &Post| {
            b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
        };
        match sort {
            SortOption::New => posts.sort_by(newest_first),
            SortOption::Top => {
                posts.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| newest_first(a, b)))
            }
        }

        Ok(posts)
    }

    async fn get_post(&self, id: i64) -> Result<Post, StoreError> {
        self.inner
            .read()
            .await
            .posts
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::ItemNotFound(format!("Post {}", id)))
    }

    async fn create_comment(
        &self,
        post_id: i64,
        parent_id: Option<i64>,
        content: String,
        max_reply_depth: usize,
    ) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().await;

        if !inner.posts.contains_key(&post_id) {
            return Err(StoreError::ItemNotFound(format!("Post {}", post_id)));
        }
        let depth = match parent_id {
            None => 0,
            Some(pid) => {
                let same_post = inner
                    .comments
                    .get(&pid)
                    .is_some_and(|parent| parent.post_id == post_id);
                if !same_post {
                    return Err(StoreError::ItemNotFound(format!("Parent comment {}", pid)));
                }
                let parent_depth = inner.depths.get(&pid).copied().unwrap_or_default();
                if parent_depth >= max_reply_depth {
                    return Err(StoreError::ReplyTooDeep(pid));
                }
                parent_depth + 1
            }
        };

        inner.last_comment_id += 1;
        let id = inner.last_comment_id;
        inner.comments.insert(
            id,
            Comment {
                id,
                post_id,
                parent_id,
                content,
                created_at: chrono::Utc::now(),
                score: 0,
                votes: VoteMap::new(),
            },
        );
        inner.depths.insert(id, depth);
        if let Some(post) = inner.posts.get_mut(&post_id) {
            post.comment_count += 1;
        }

        Ok(id)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, StoreError> {
        let inner = self.inner.read().await;
        let mut comments: Vec<Comment> = inner
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(comments)
    }

    async fn apply_vote(
        &self,
        target: VoteTarget,
        user_id: &str,
        action: VoteAction,
    ) -> Result<Tally, StoreError> {
        let mut inner = self.inner.write().await;

        let tally = match target {
            VoteTarget::Post(id) => {
                let post = inner
                    .posts
                    .get_mut(&id)
                    .ok_or_else(|| StoreError::ItemNotFound(target.to_string()))?;
                let tally = record_vote(&*post, user_id, action);
                post.score = tally.score;
                post.votes = tally.votes.clone();
                tally
            }
            VoteTarget::Comment(id) => {
                let comment = inner
                    .comments
                    .get_mut(&id)
                    .ok_or_else(|| StoreError::ItemNotFound(target.to_string()))?;
                let tally = record_vote(&*comment, user_id, action);
                comment.score = tally.score;
                comment.votes = tally.votes.clone();
                tally
            }
        };

        Ok(tally)
    }
}
