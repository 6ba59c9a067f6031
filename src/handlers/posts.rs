use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        post::{CreatePostRequest, POST_CONTENT_MAX, POST_TAG_MAX, PostListParams},
        vote::VoteRequest,
    },
    store::{DiscussionStore, VoteTarget},
    utils::{html::clean_text, jwt::Claims},
};

/// Create a new post.
/// Posts are anonymous: the author is not recorded.
pub async fn create_post(
    State(store): State<Arc<dyn DiscussionStore>>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    payload.validate()?;

    let content = clean_text(&payload.content, "content", POST_CONTENT_MAX)?;
    let tag = clean_text(&payload.tag, "tag", POST_TAG_MAX)?;

    // 2. Insert Post
    let post_id = store.create_post(content, tag).await.map_err(|e| {
        tracing::error!("Failed to create post: {}", e);
        e
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"id": post_id})),
    ))
}

/// List posts, newest first or highest score first.
pub async fn list_posts(
    State(store): State<Arc<dyn DiscussionStore>>,
    Query(params): Query<PostListParams>,
) -> Result<impl IntoResponse, AppError> {
    let posts = store.list_posts(params.sort.unwrap_or_default()).await?;

    Ok(Json(posts))
}

/// Get a single post by ID.
pub async fn get_post(
    State(store): State<Arc<dyn DiscussionStore>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let post = store.get_post(id).await?;

    Ok(Json(post))
}

/// Cast, change or clear the caller's vote on a post.
pub async fn vote_post(
    State(store): State<Arc<dyn DiscussionStore>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<VoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tally = store
        .apply_vote(VoteTarget::Post(id), &claims.sub, payload.action()?)
        .await?;

    Ok(Json(tally))
}
