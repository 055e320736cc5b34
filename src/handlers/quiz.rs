// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::quiz::QuizView,
    quiz::{loader::load_quiz, registry::AttemptRegistry},
    state::AppState,
    utils::jwt::Viewer,
};

/// DTO for selecting an option on the visible question.
#[derive(Debug, Deserialize, Validate)]
pub struct SelectOptionRequest {
    #[validate(range(max = 64))]
    pub option_index: usize,
}

/// Loads the quiz for a course, seeding the sample quiz on first access.
///
/// Answers are not included; they are only revealed after an attempt completes.
pub async fn get_course_quiz(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (course, quiz) = load_quiz(state.store.as_ref(), course_id, state.seed_policy()).await?;
    Ok(Json(QuizView::new(course, &quiz)))
}

/// Loads the course quiz and starts a new attempt on it.
///
/// Signing in is optional; anonymous attempts are scored but not saved.
pub async fn start_attempt(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (_, quiz) = load_quiz(state.store.as_ref(), course_id, state.seed_policy()).await?;
    let snapshot = state.attempts.start(Arc::new(quiz), viewer.0).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Attempt routes carry the caller's `Viewer`; an attempt started by a signed-in
/// user only answers to that user.
pub async fn get_attempt(
    State(attempts): State<AttemptRegistry>,
    Extension(viewer): Extension<Viewer>,
    Path(attempt_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(attempts.snapshot(attempt_id, viewer.0).await?))
}

pub async fn select_option(
    State(attempts): State<AttemptRegistry>,
    Extension(viewer): Extension<Viewer>,
    Path(attempt_id): Path<Uuid>,
    Json(payload): Json<SelectOptionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(Json(
        attempts
            .select_option(attempt_id, viewer.0, payload.option_index)
            .await?,
    ))
}

pub async fn next_question(
    State(attempts): State<AttemptRegistry>,
    Extension(viewer): Extension<Viewer>,
    Path(attempt_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(attempts.next(attempt_id, viewer.0).await?))
}

pub async fn previous_question(
    State(attempts): State<AttemptRegistry>,
    Extension(viewer): Extension<Viewer>,
    Path(attempt_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(attempts.previous(attempt_id, viewer.0).await?))
}

/// Scores the attempt and records it.
///
/// The result is returned even when saving fails; `notice` then explains it.
pub async fn submit_attempt(
    State(attempts): State<AttemptRegistry>,
    Extension(viewer): Extension<Viewer>,
    Path(attempt_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(attempts.submit(attempt_id, viewer.0).await?))
}

/// Restarts a completed attempt on the same quiz.
pub async fn retake_attempt(
    State(attempts): State<AttemptRegistry>,
    Extension(viewer): Extension<Viewer>,
    Path(attempt_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(attempts.retake(attempt_id, viewer.0).await?))
}

pub async fn delete_attempt(
    State(attempts): State<AttemptRegistry>,
    Extension(viewer): Extension<Viewer>,
    Path(attempt_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    attempts.remove(attempt_id, viewer.0).await?;
    Ok(StatusCode::NO_CONTENT)
}
