use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::post::{FollowState, PostListParams, ReactionKind, ReactionState},
    store::QuizStore,
    utils::jwt::Viewer,
};

/// Requires a signed-in viewer; the route layer guarantees one.
fn signed_in(viewer: Viewer) -> Result<Uuid, AppError> {
    viewer
        .0
        .ok_or(AppError::AuthError("Sign in required".to_string()))
}

/// List posts (Recent first).
/// Filter out soft-deleted posts.
/// Supports cursor-based pagination.
pub async fn list_posts(
    State(store): State<Arc<dyn QuizStore>>,
    Extension(viewer): Extension<Viewer>,
    Query(params): Query<PostListParams>,
) -> Result<impl IntoResponse, AppError> {
    params
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let limit = params.limit.unwrap_or(20);

    let posts = store.list_posts(viewer.0, params.cursor, limit).await?;
    Ok(Json(posts))
}

async fn set_reaction(
    store: &dyn QuizStore,
    viewer: Viewer,
    post_id: Uuid,
    kind: ReactionKind,
    active: bool,
) -> Result<Json<ReactionState>, AppError> {
    let user_id = signed_in(viewer)?;
    let state = store.set_reaction(user_id, post_id, kind, active).await?;
    tracing::debug!(%user_id, %post_id, ?kind, active, "Reaction updated");
    Ok(Json(state))
}

pub async fn like_post(
    State(store): State<Arc<dyn QuizStore>>,
    Extension(viewer): Extension<Viewer>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    set_reaction(store.as_ref(), viewer, post_id, ReactionKind::Like, true).await
}

pub async fn unlike_post(
    State(store): State<Arc<dyn QuizStore>>,
    Extension(viewer): Extension<Viewer>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    set_reaction(store.as_ref(), viewer, post_id, ReactionKind::Like, false).await
}

pub async fn bookmark_post(
    State(store): State<Arc<dyn QuizStore>>,
    Extension(viewer): Extension<Viewer>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    set_reaction(store.as_ref(), viewer, post_id, ReactionKind::Bookmark, true).await
}

pub async fn unbookmark_post(
    State(store): State<Arc<dyn QuizStore>>,
    Extension(viewer): Extension<Viewer>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    set_reaction(store.as_ref(), viewer, post_id, ReactionKind::Bookmark, false).await
}

async fn set_follow(
    store: &dyn QuizStore,
    viewer: Viewer,
    followee_id: Uuid,
    following: bool,
) -> Result<Json<FollowState>, AppError> {
    let user_id = signed_in(viewer)?;
    if user_id == followee_id {
        return Err(AppError::BadRequest("You cannot follow yourself".to_string()));
    }
    let state = store.set_follow(user_id, followee_id, following).await?;
    Ok(Json(state))
}

pub async fn follow_user(
    State(store): State<Arc<dyn QuizStore>>,
    Extension(viewer): Extension<Viewer>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    set_follow(store.as_ref(), viewer, user_id, true).await
}

pub async fn unfollow_user(
    State(store): State<Arc<dyn QuizStore>>,
    Extension(viewer): Extension<Viewer>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    set_follow(store.as_ref(), viewer, user_id, false).await
}
