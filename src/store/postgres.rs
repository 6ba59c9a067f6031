// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};

use super::{DiscussionStore, StoreError, VoteTarget};
use crate::{
    discussion::vote::{Scorable, Tally, VoteAction, VoteMap, tally_vote},
    models::{
        comment::Comment,
        post::{Post, SortOption},
    },
};

/// `DiscussionStore` backed by Postgres (see `migrations/`).
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DiscussionStore for PgStore {
    async fn create_post(&self, content: String, tag: String) -> Result<i64, StoreError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO posts (content, tag)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(content)
        .bind(tag)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list_posts(&self, sort: SortOption) -> Result<Vec<Post>, StoreError> {
        let sql = match sort {
            SortOption::New => {
                r#"
                SELECT id, content, tag, created_at, score, votes, comment_count
                FROM posts
                ORDER BY created_at DESC, id DESC
                "#
            }
            SortOption::Top => {
                r#"
                SELECT id, content, tag, created_at, score, votes, comment_count
                FROM posts
                ORDER BY score DESC, created_at DESC, id DESC
                "#
            }
        };

        let posts = sqlx::query_as::<_, Post>(sql).fetch_all(&self.pool).await?;
        Ok(posts)
    }

    async fn get_post(&self, id: i64) -> Result<Post, StoreError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, content, tag, created_at, score, votes, comment_count
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::ItemNotFound(format!("Post {}", id)))
    }

    async fn create_comment(
        &self,
        post_id: i64,
        parent_id: Option<i64>,
        content: String,
        max_reply_depth: usize,
    ) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Lock the post row so the comment count update serializes with other writers.
        sqlx::query("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
            .bind(post_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::ItemNotFound(format!("Post {}", post_id)))?;

        let depth: i32 = match parent_id {
            None => 0,
            Some(pid) => {
                let (parent_depth,): (i32,) =
                    sqlx::query_as("SELECT depth FROM comments WHERE id = $1 AND post_id = $2")
                        .bind(pid)
                        .bind(post_id)
                        .fetch_optional(&mut *tx)
                        .await?
                        .ok_or_else(|| {
                            StoreError::ItemNotFound(format!("Parent comment {}", pid))
                        })?;
                if parent_depth as usize >= max_reply_depth {
                    return Err(StoreError::ReplyTooDeep(pid));
                }
                parent_depth + 1
            }
        };

        let (new_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO comments (post_id, parent_id, content, depth)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(post_id)
        .bind(parent_id)
        .bind(content)
        .bind(depth)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE posts SET comment_count = comment_count + 1 WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(new_id)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, StoreError> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, parent_id, content, created_at, score, votes
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn apply_vote(
        &self,
        target: VoteTarget,
        user_id: &str,
        action: VoteAction,
    ) -> Result<Tally, StoreError> {
        let (select, update, id) = match target {
            VoteTarget::Post(id) => (
                "SELECT score, votes FROM posts WHERE id = $1 FOR UPDATE",
                "UPDATE posts SET score = $1, votes = $2 WHERE id = $3",
                id,
            ),
            VoteTarget::Comment(id) => (
                "SELECT score, votes FROM comments WHERE id = $1 FOR UPDATE",
                "UPDATE comments SET score = $1, votes = $2 WHERE id = $3",
                id,
            ),
        };

        let mut tx = self.pool.begin().await?;

        let (score, Json(votes)): (i64, Json<VoteMap>) = sqlx::query_as(select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::ItemNotFound(target.to_string()))?;

        let current = Tally { score, votes };
        let vote = action.resolve(current.vote_of(user_id));
        let tally = tally_vote(&current, user_id, vote);

        sqlx::query(update)
            .bind(tally.score)
            .bind(Json(&tally.votes))
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!("{} now scores {}", target, tally.score);
        Ok(tally)
    }
}
