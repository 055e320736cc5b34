// src/store/mod.rs

//! Data-access layer.
//!
//! `QuizStore` is the only way handlers and the quiz engine reach persisted
//! rows. One instance is built in `main` and shared through `AppState`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        course::{Course, Enrollment},
        post::{FeedPost, FollowState, ReactionKind, ReactionState},
        quiz::{NewQuiz, Quiz},
        submission::{NewSubmission, SubmissionRecord},
    },
};

pub use memory::MemoryStore;
pub use postgres::PgQuizStore;

#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn fetch_course(&self, course_id: Uuid) -> Result<Option<Course>, AppError>;

    async fn fetch_quiz_for_course(&self, course_id: Uuid) -> Result<Option<Quiz>, AppError>;

    /// Inserts a quiz for `quiz.course_id`. If one already exists for that
    /// course the existing row is returned unchanged.
    async fn insert_quiz(&self, quiz: NewQuiz) -> Result<Quiz, AppError>;

    async fn insert_submission(&self, submission: NewSubmission)
    -> Result<SubmissionRecord, AppError>;

    async fn find_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>, AppError>;

    async fn mark_enrollment_completed(
        &self,
        enrollment_id: Uuid,
        completed_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), AppError>;

    /// Newest first, strictly older than `cursor` when given.
    async fn list_posts(
        &self,
        viewer: Option<Uuid>,
        cursor: Option<chrono::DateTime<chrono::Utc>>,
        limit: i64,
    ) -> Result<Vec<FeedPost>, AppError>;

    /// Sets a like/bookmark to `active`. Setting the current state again is a no-op.
    async fn set_reaction(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        kind: ReactionKind,
        active: bool,
    ) -> Result<ReactionState, AppError>;

    async fn set_follow(
        &self,
        follower_id: Uuid,
        followee_id: Uuid,
        following: bool,
    ) -> Result<FollowState, AppError>;
}
