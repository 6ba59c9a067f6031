use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    config::Config,
    discussion::tree::build_comment_forest,
    error::AppError,
    models::{
        comment::{COMMENT_CONTENT_MAX, CreateCommentRequest},
        vote::VoteRequest,
    },
    store::{DiscussionStore, VoteTarget},
    utils::{html::clean_text, jwt::Claims},
};

/// Create a new comment, or a reply when `parent_id` is given.
/// Replies to comments at `max_reply_depth` or deeper are rejected.
pub async fn create_comment(
    State(store): State<Arc<dyn DiscussionStore>>,
    State(config): State<Config>,
    Path(post_id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let content = clean_text(&payload.content, "content", COMMENT_CONTENT_MAX)?;

    let new_id = store
        .create_comment(post_id, payload.parent_id, content, config.max_reply_depth)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": new_id })),
    ))
}

/// List the comments of a post as a reply forest, newest first at every level.
pub async fn list_comments(
    State(store): State<Arc<dyn DiscussionStore>>,
    State(config): State<Config>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let comments = store.list_comments(post_id).await?;
    let forest = build_comment_forest(comments, config.max_reply_depth);

    Ok(Json(forest))
}

/// Cast, change or clear the caller's vote on a comment.
pub async fn vote_comment(
    State(store): State<Arc<dyn DiscussionStore>>,
    Extension(claims): Extension<Claims>,
    Path(comment_id): Path<i64>,
    Json(payload): Json<VoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tally = store
        .apply_vote(VoteTarget::Comment(comment_id), &claims.sub, payload.action()?)
        .await?;

    Ok(Json(tally))
}
